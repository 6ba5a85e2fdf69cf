use std::collections::HashSet;

use clap::ValueEnum;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::{Error, Result};
use crate::matcher::VideoMatcher;
use crate::model::{Playlist, Track};
use crate::pacing::Jitter;

/// How the set of videos already in a destination playlist evolves while
/// its tracks are processed.
#[derive(Serialize, Deserialize, ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembershipPolicy {
    /// Captured once per playlist. Two tracks resolving to the same video
    /// within one run are both inserted.
    #[default]
    Snapshot,
    /// Every successful insert is added to the set, so later tracks that
    /// resolve to the same video are skipped.
    Tracked,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub appended: usize,
    pub already_present: usize,
    pub unmatched: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub playlists: usize,
    pub created: usize,
    pub tracks: SyncReport,
}

impl RunSummary {
    fn absorb(&mut self, report: SyncReport) {
        self.playlists += 1;
        self.tracks.appended += report.appended;
        self.tracks.already_present += report.already_present;
        self.tracks.unmatched += report.unmatched;
        self.tracks.failed += report.failed;
    }
}

/// Finds the single destination playlist carrying the source playlist's name.
///
/// Zero or several matches is an error; ties are never broken.
pub fn match_destination_playlist<'a>(
    source: &Playlist,
    destinations: &'a [Playlist],
) -> Result<&'a Playlist> {
    let mut matches = destinations.iter().filter(|d| d.name == source.name);

    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(Error::PlaylistMatch {
            name: source.name.clone(),
            found: 0,
        }),
        (Some(_), Some(_)) => Err(Error::PlaylistMatch {
            name: source.name.clone(),
            found: 2 + matches.count(),
        }),
    }
}

/// Brings destination playlists up to date with their source playlists.
pub struct Reconciler<D> {
    destination: D,
    matcher: Box<dyn VideoMatcher>,
    jitter: Jitter,
    membership: MembershipPolicy,
    search_results: u32,
}

impl<D: DestinationCatalog> Reconciler<D> {
    pub fn new(
        destination: D,
        matcher: Box<dyn VideoMatcher>,
        jitter: Jitter,
        membership: MembershipPolicy,
        search_results: u32,
    ) -> Self {
        Reconciler {
            destination,
            matcher,
            jitter,
            membership,
            search_results,
        }
    }

    /// Creates the playlist unless one with this exact name already exists.
    /// Returns whether a playlist was created.
    pub async fn ensure_playlist_exists(&self, name: &str) -> Result<bool> {
        let existing = self.destination.list_playlists().await?;
        if existing.iter().any(|p| p.name == name) {
            return Ok(false);
        }

        let id = self.destination.create_playlist(name).await?;
        info!("Created YouTube playlist '{name}' with id {id}");
        Ok(true)
    }

    /// Searches for each track and inserts the chosen video unless the
    /// playlist already holds it.
    ///
    /// Only a failure to read the playlist's current videos is returned as an
    /// error; search, match and insert problems are logged and counted per track.
    pub async fn sync_tracks(
        &self,
        tracks: &[Track],
        destination_playlist_id: &str,
    ) -> Result<SyncReport> {
        let mut present: HashSet<String> = self
            .destination
            .list_video_ids(destination_playlist_id)
            .await?
            .into_iter()
            .collect();
        let mut report = SyncReport::default();

        for track in tracks {
            let query = track.search_query();
            let candidates = match self.destination.search(&query, self.search_results).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    error!("Search for '{query}' failed: {e}");
                    report.failed += 1;
                    continue;
                }
            };

            let Some(video_id) = self.matcher.select(track, &candidates) else {
                warn!(
                    "No video found for '{query}' (album '{}', Spotify id {}), skipping",
                    track.album_name, track.id
                );
                report.unmatched += 1;
                continue;
            };

            if present.contains(&video_id) {
                info!("Video {video_id} already in playlist {destination_playlist_id}, skipping");
                report.already_present += 1;
                continue;
            }

            self.jitter.wait().await;
            info!("Adding video {video_id} to YouTube playlist {destination_playlist_id}");
            match self
                .destination
                .append_video(destination_playlist_id, &video_id)
                .await
            {
                Ok(()) => {
                    info!("Added video {video_id} to YouTube playlist {destination_playlist_id}");
                    report.appended += 1;
                    if self.membership == MembershipPolicy::Tracked {
                        present.insert(video_id);
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to add video {video_id} to YouTube playlist {destination_playlist_id}: {e}"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Mirrors every source playlist in listing order.
    ///
    /// All playlists are paired with their destination before any track is
    /// touched, so a missing or ambiguous name aborts the run without writes.
    pub async fn run<S: SourceCatalog>(
        &self,
        source: &S,
        create_missing: bool,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let source_playlists = source.list_playlists().await?;
        info!("Found {} Spotify playlists", source_playlists.len());

        if create_missing {
            for playlist in &source_playlists {
                if self.ensure_playlist_exists(&playlist.name).await? {
                    summary.created += 1;
                }
            }
        }

        let destination_playlists = self.destination.list_playlists().await?;
        let pairs = source_playlists
            .iter()
            .map(|src| {
                match_destination_playlist(src, &destination_playlists)
                    .map(|dst| (src, dst))
                    .inspect_err(|e| error!("{e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        for (src, dst) in pairs {
            info!(
                "Syncing '{}' ({} tracks) into YouTube playlist {}",
                src.name, src.total_tracks, dst.id
            );
            let tracks = source.list_tracks(&src.id).await?;
            let report = self.sync_tracks(&tracks, &dst.id).await?;
            info!(
                "Finished '{}': {} added, {} already present, {} unmatched, {} failed",
                src.name, report.appended, report.already_present, report.unmatched, report.failed
            );
            summary.absorb(report);
        }

        Ok(summary)
    }
}
