use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, Response,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// The slice of the YouTube Data API the rotation needs.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn list_activities(&self, max_results: u32) -> Result<Vec<Activity>>;
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemPage>;
    async fn delete_playlist_item(&self, item_id: &str) -> Result<()>;
    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Activity {
    #[serde(rename = "contentDetails", default)]
    pub details: ActivityDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    pub watch: Option<VideoRef>,
    pub playlist_item: Option<PlaylistItemRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRef {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemRef {
    #[serde(default)]
    pub resource_id: VideoRef,
}

impl Activity {
    pub fn watched(video_id: &str) -> Self {
        Activity {
            details: ActivityDetails {
                watch: Some(VideoRef {
                    video_id: Some(video_id.to_string()),
                }),
                playlist_item: None,
            },
        }
    }

    /// `watch` wins when present, even if it carries no id.
    pub fn video_id(&self) -> Option<&str> {
        match (&self.details.watch, &self.details.playlist_item) {
            (Some(watch), _) => watch.video_id.as_deref(),
            (None, Some(item)) => item.resource_id.video_id.as_deref(),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(rename = "contentDetails")]
    pub details: ItemDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub video_id: String,
}

impl PlaylistItem {
    pub fn new(id: &str, video_id: &str, title: &str) -> Self {
        PlaylistItem {
            id: id.to_string(),
            snippet: Snippet {
                title: title.to_string(),
            },
            details: ItemDetails {
                video_id: video_id.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
struct ActivityList {
    #[serde(default)]
    items: Vec<Activity>,
}

#[derive(Serialize)]
struct InsertItem<'a> {
    snippet: InsertSnippet<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertSnippet<'a> {
    playlist_id: &'a str,
    resource_id: ResourceId<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId<'a> {
    kind: &'static str,
    video_id: &'a str,
}

impl<'a> InsertItem<'a> {
    fn new(playlist_id: &'a str, video_id: &'a str) -> Self {
        InsertItem {
            snippet: InsertSnippet {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id,
                },
            },
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct YouTube {
    client: Client,
    base_url: String,
}

impl YouTube {
    pub fn new(access_token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| Error::Auth("access token is not a valid header value".into()))?;
        headers.append(AUTHORIZATION, bearer);

        Ok(YouTube {
            client: Client::builder().default_headers(headers).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url)
    }

    /// Turns a non-2xx response into `Error::Status`, preferring the
    /// message from Google's error envelope.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|body| body.error.message)
            .unwrap_or(body);

        Err(Error::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PlaylistApi for YouTube {
    async fn list_activities(&self, max_results: u32) -> Result<Vec<Activity>> {
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(self.url("activities"))
            .query(&[
                ("part", "snippet,contentDetails"),
                ("mine", "true"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;
        let list: ActivityList = Self::check(response).await?.json().await?;
        debug!("fetched {} activities", list.items.len());
        Ok(list.items)
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemPage> {
        let max_results = max_results.to_string();
        let mut request = self.client.get(self.url("playlistItems")).query(&[
            ("part", "id,snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let page: PlaylistItemPage = Self::check(request.send().await?).await?.json().await?;
        debug!(
            "fetched {} playlist items, more: {}",
            page.items.len(),
            page.next_page_token.is_some()
        );
        Ok(page)
    }

    async fn delete_playlist_item(&self, item_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url("playlistItems"))
            .query(&[("id", item_id)])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("playlistItems"))
            .query(&[("part", "snippet")])
            .json(&InsertItem::new(playlist_id, video_id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
