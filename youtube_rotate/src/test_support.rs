//! In-memory stand-ins for the remote API and the prompt.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{Activity, PlaylistApi, PlaylistItem, PlaylistItemPage};
use crate::error::{Error, Result};
use crate::prompt::Confirm;

#[derive(Default)]
struct Calls {
    page_tokens: Vec<Option<String>>,
    listed: Vec<String>,
    deleted: Vec<String>,
    inserted: Vec<(String, String)>,
}

#[derive(Default)]
pub struct FakeApi {
    activities: Vec<Activity>,
    activities_fail: bool,
    pages: Vec<Option<Vec<PlaylistItem>>>,
    delete_errors: HashMap<String, u16>,
    insert_errors: HashMap<String, u16>,
    calls: Mutex<Calls>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activities(mut self, video_ids: &[&str]) -> Self {
        self.activities = video_ids.iter().map(|id| Activity::watched(id)).collect();
        self
    }

    pub fn activities_fail(mut self) -> Self {
        self.activities_fail = true;
        self
    }

    /// Appends a page of `(item_id, video_id)` pairs.
    pub fn page(mut self, items: &[(&str, &str)]) -> Self {
        let items = items
            .iter()
            .map(|(id, video)| PlaylistItem::new(id, video, &format!("title {video}")))
            .collect();
        self.pages.push(Some(items));
        self
    }

    pub fn failing_page(mut self) -> Self {
        self.pages.push(None);
        self
    }

    pub fn quota_on_delete(mut self, item_id: &str) -> Self {
        self.delete_errors.insert(item_id.to_string(), 403);
        self
    }

    pub fn fail_insert(mut self, video_id: &str, status: u16) -> Self {
        self.insert_errors.insert(video_id.to_string(), status);
        self
    }

    pub fn page_tokens(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().page_tokens.clone()
    }

    pub fn listed_playlists(&self) -> Vec<String> {
        self.calls.lock().unwrap().listed.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls.lock().unwrap().deleted.clone()
    }

    pub fn inserted(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().inserted.clone()
    }
}

fn status(status: u16) -> Error {
    Error::Status {
        status,
        message: format!("fake {status}"),
    }
}

#[async_trait]
impl PlaylistApi for FakeApi {
    async fn list_activities(&self, _max_results: u32) -> Result<Vec<Activity>> {
        if self.activities_fail {
            return Err(status(401));
        }
        Ok(self.activities.clone())
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        _max_results: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemPage> {
        let mut calls = self.calls.lock().unwrap();
        calls.page_tokens.push(page_token.map(str::to_string));
        if !calls.listed.iter().any(|p| p == playlist_id) {
            calls.listed.push(playlist_id.to_string());
        }

        let index = page_token
            .and_then(|t| t.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);

        let items = match self.pages.get(index) {
            Some(Some(items)) => items.clone(),
            Some(None) => return Err(status(500)),
            None => Vec::new(),
        };
        let next_page_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(PlaylistItemPage {
            items,
            next_page_token,
        })
    }

    async fn delete_playlist_item(&self, item_id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .deleted
            .push(item_id.to_string());
        match self.delete_errors.get(item_id) {
            Some(&code) => Err(status(code)),
            None => Ok(()),
        }
    }

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        if let Some(&code) = self.insert_errors.get(video_id) {
            return Err(status(code));
        }
        self.calls
            .lock()
            .unwrap()
            .inserted
            .push((playlist_id.to_string(), video_id.to_string()));
        Ok(())
    }
}

/// Gives the same answer every time and counts how often it was asked.
pub struct Scripted {
    answer: bool,
    pub asked: usize,
}

impl Scripted {
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: 0,
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            asked: 0,
        }
    }
}

impl Confirm for Scripted {
    fn confirm(&mut self, _pending: usize) -> io::Result<bool> {
        self.asked += 1;
        Ok(self.answer)
    }
}
