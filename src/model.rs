/// Resource kind the video service assigns to playable videos in search results.
pub const VIDEO_KIND: &str = "youtube#video";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub total_tracks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub album_name: String,
    pub artists: Vec<String>,
}

impl Track {
    /// Text sent to the video search: the track name followed by each artist,
    /// all separated by `", "`.
    pub fn search_query(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.artists.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A single raw hit returned by the video search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub kind: String,
    pub video_id: Option<String>,
    pub title: String,
}

impl SearchCandidate {
    pub fn is_video(&self) -> bool {
        self.kind == VIDEO_KIND && self.video_id.is_some()
    }
}
