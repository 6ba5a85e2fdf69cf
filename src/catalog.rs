use crate::error::Result;
use crate::model::{Playlist, SearchCandidate, Track};

/// Read access to the music service the playlists come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;
    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;
}

/// Capabilities of the video service the playlists are mirrored into.
///
/// Implemented by `youtube::YouTubeClient` in production and by mocks in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DestinationCatalog: Send + Sync {
    /// Playlists owned by the authenticated user.
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// Creates a private playlist and returns its id.
    async fn create_playlist(&self, name: &str) -> Result<String>;

    async fn list_video_ids(&self, playlist_id: &str) -> Result<Vec<String>>;

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchCandidate>>;

    /// Inserts the video at the head of the playlist.
    async fn append_video(&self, playlist_id: &str, video_id: &str) -> Result<()>;
}
