use std::collections::HashSet;
use std::io::{self, Write};

use tracing::{error, info, warn};

use crate::api::PlaylistApi;
use crate::config::Config;
use crate::error::Result;
use crate::prompt::Confirm;

/// Recently watched video ids, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedVideos {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl WatchedVideos {
    pub fn insert(&mut self, video_id: &str) -> bool {
        if !self.seen.insert(video_id.to_string()) {
            return false;
        }
        self.order.push(video_id.to_string());
        true
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.seen.contains(video_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for WatchedVideos {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut watched = WatchedVideos::default();
        for id in iter {
            watched.insert(id);
        }
        watched
    }
}

/// A playlist entry that was watched recently and should move to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub item_id: String,
    pub video_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationReport {
    pub moved: usize,
    pub failed: usize,
    pub quota_exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No watched videos, or none of them are in the playlist.
    NothingToDo,
    Completed(RotationReport),
    /// The user turned the rotation down.
    Declined,
}

/// Browser urls often carry `&index=..` and friends after the list id.
pub fn sanitize_playlist_id(playlist_id: &str) -> &str {
    playlist_id.split('&').next().unwrap_or_default().trim()
}

/// Never fails: a broken or empty activity feed just means nothing to rotate.
pub async fn watched_videos<A>(api: &A, page_size: u32) -> WatchedVideos
where
    A: PlaylistApi + ?Sized,
{
    println!("--- Fetching watch history ---");

    let activities = match api.list_activities(page_size).await {
        Ok(activities) => activities,
        Err(err) => {
            error!("cannot read watch history: {}", err);
            return WatchedVideos::default();
        }
    };

    if activities.is_empty() {
        warn!("activity feed is empty, is watch history turned off?");
        return WatchedVideos::default();
    }

    let watched: WatchedVideos = activities.iter().filter_map(|a| a.video_id()).collect();
    println!("Found {} videos in history", watched.len());
    watched
}

/// Walks every page of the playlist and keeps items whose video was watched.
/// A failed page ends the scan with whatever was gathered before it.
pub async fn scan_playlist<A>(
    api: &A,
    playlist_id: &str,
    watched: &WatchedVideos,
    page_size: u32,
) -> Vec<PendingItem>
where
    A: PlaylistApi + ?Sized,
{
    println!("--- Scanning playlist {playlist_id} ---");

    let mut pending = Vec::new();
    let mut page_token: Option<String> = None;
    let mut scanned = 0;

    loop {
        let page = match api
            .list_playlist_items(playlist_id, page_size, page_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(err) => {
                println!();
                error!("cannot read playlist page: {}", err);
                break;
            }
        };

        scanned += page.items.len();
        pending.extend(
            page.items
                .into_iter()
                .filter(|item| watched.contains(&item.details.video_id))
                .map(|item| PendingItem {
                    item_id: item.id,
                    video_id: item.details.video_id,
                    title: item.snippet.title,
                }),
        );

        print!("Scanned {scanned} videos...\r");
        let _ = io::stdout().flush();

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    println!();
    println!("Scan finished, {} videos to rotate", pending.len());
    pending
}

/// Deletes each item and appends it again. Stops at the first quota error;
/// other failures are logged and skipped.
pub async fn rotate_items<A>(api: &A, playlist_id: &str, pending: &[PendingItem]) -> RotationReport
where
    A: PlaylistApi + ?Sized,
{
    println!("--- Moving to the end ---");

    let mut report = RotationReport::default();
    for (n, item) in pending.iter().enumerate() {
        println!("[{}/{}] Rotating: {}", n + 1, pending.len(), item.title);

        let result = match api.delete_playlist_item(&item.item_id).await {
            Ok(()) => api.insert_playlist_item(playlist_id, &item.video_id).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => report.moved += 1,
            Err(err) if err.is_quota_exceeded() => {
                warn!("quota exhausted after {} videos, try again tomorrow", report.moved);
                report.quota_exhausted = true;
                return report;
            }
            Err(err) => {
                error!("cannot rotate {:?}: {}", item.title, err);
                report.failed += 1;
            }
        }
    }

    println!("Done! Moved {} videos", report.moved);
    report
}

/// One full pass: history, scan, confirm, rotate.
pub async fn run_cycle<A, C>(api: &A, confirm: &mut C, config: &Config) -> Result<CycleOutcome>
where
    A: PlaylistApi + ?Sized,
    C: Confirm + ?Sized,
{
    let playlist_id = sanitize_playlist_id(&config.playlist_id);

    let watched = watched_videos(api, config.activity_page_size).await;
    if watched.is_empty() {
        info!("no watched videos found");
        return Ok(CycleOutcome::NothingToDo);
    }

    let pending = scan_playlist(api, playlist_id, &watched, config.playlist_page_size).await;
    if pending.is_empty() {
        info!("none of the recently watched videos are in the playlist");
        return Ok(CycleOutcome::NothingToDo);
    }

    if !confirm.confirm(pending.len())? {
        return Ok(CycleOutcome::Declined);
    }

    let report = rotate_items(api, playlist_id, &pending).await;
    Ok(CycleOutcome::Completed(report))
}
