use crate::model::{SearchCandidate, Track};

/// Picks the video that stands in for a track among the search hits.
pub trait VideoMatcher: Send + Sync {
    fn select(&self, track: &Track, candidates: &[SearchCandidate]) -> Option<String>;
}

/// Takes the first hit of video kind, in the order the search returned them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstVideoMatcher;

impl VideoMatcher for FirstVideoMatcher {
    fn select(&self, _track: &Track, candidates: &[SearchCandidate]) -> Option<String> {
        candidates
            .iter()
            .find(|c| c.is_video())
            .and_then(|c| c.video_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VIDEO_KIND;

    fn candidate(kind: &str, video_id: Option<&str>) -> SearchCandidate {
        SearchCandidate {
            kind: kind.into(),
            video_id: video_id.map(Into::into),
            title: String::new(),
        }
    }

    fn track() -> Track {
        Track {
            id: "t1".into(),
            name: "Yellow".into(),
            album_name: "Parachutes".into(),
            artists: vec!["Coldplay".into()],
        }
    }

    #[test]
    fn skips_channels_and_playlists() {
        let candidates = vec![
            candidate("youtube#channel", None),
            candidate("youtube#playlist", None),
            candidate(VIDEO_KIND, Some("v1")),
        ];
        assert_eq!(
            FirstVideoMatcher.select(&track(), &candidates),
            Some("v1".to_string())
        );
    }

    #[test]
    fn first_video_wins() {
        let candidates = vec![
            candidate(VIDEO_KIND, Some("v1")),
            candidate(VIDEO_KIND, Some("v2")),
        ];
        assert_eq!(
            FirstVideoMatcher.select(&track(), &candidates),
            Some("v1".to_string())
        );
    }

    #[test]
    fn no_video_kind_is_no_match() {
        let candidates = vec![candidate("youtube#channel", None)];
        assert_eq!(FirstVideoMatcher.select(&track(), &candidates), None);
        assert_eq!(FirstVideoMatcher.select(&track(), &[]), None);
    }
}
