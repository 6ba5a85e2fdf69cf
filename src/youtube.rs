use google_youtube3::{
    YouTube,
    api::{
        Playlist as ApiPlaylist, PlaylistItem, PlaylistItemSnippet, PlaylistSnippet,
        PlaylistStatus, ResourceId, SearchResult,
    },
    hyper_rustls, hyper_util, yup_oauth2,
};
use log::{debug, info};

use crate::catalog::DestinationCatalog;
use crate::config::APP_NAME;
use crate::error::{Error, Result};
use crate::model::{Playlist, SearchCandidate, VIDEO_KIND};

const PAGE_SIZE: u32 = 50;

pub struct YouTubeClient {
    hub: YouTube<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>,
}

impl YouTubeClient {
    pub async fn new(oauth_json_path: &str) -> Result<Self> {
        // Read OAuth2 credentials from the provided JSON file
        let secret = yup_oauth2::read_application_secret(oauth_json_path).await?;

        // Token cache lives next to the configuration file
        let cache_dir = confy::get_configuration_file_path(APP_NAME, None)?
            .parent()
            .ok_or_else(|| Error::Config("Failed to get config directory".into()))?
            .to_path_buf();

        std::fs::create_dir_all(&cache_dir)?;
        let token_cache_path = cache_dir.join("token_cache.json");

        let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
            secret,
            yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(token_cache_path)
        .build()
        .await?;

        // Force authentication with all required scopes upfront
        let scopes = &[
            "https://www.googleapis.com/auth/youtube.readonly",
            "https://www.googleapis.com/auth/youtube",
        ];
        auth.token(scopes)
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();

        let hub = YouTube::new(
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(connector),
            auth,
        );

        Ok(Self { hub })
    }
}

#[async_trait::async_trait]
impl DestinationCatalog for YouTubeClient {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        info!("Getting details of all YouTube playlists of the user");
        let mut playlists = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .hub
                .playlists()
                .list(&vec!["snippet".to_string(), "contentDetails".to_string()])
                .mine(true)
                .max_results(PAGE_SIZE);

            if let Some(token) = &page_token {
                request = request.page_token(token);
            }

            let (_, response) = request.doit().await?;

            playlists.extend(
                response
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(playlist_from_api),
            );

            page_token = response.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(playlists)
    }

    async fn create_playlist(&self, name: &str) -> Result<String> {
        info!("Creating playlist '{name}' in YouTube");
        let (_, created) = self
            .hub
            .playlists()
            .insert(new_private_playlist(name))
            .add_part("snippet")
            .add_part("status")
            .doit()
            .await?;

        created_playlist_id(created, name)
    }

    async fn list_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        info!("Getting all videos in YouTube playlist {playlist_id}");
        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .hub
                .playlist_items()
                .list(&vec!["contentDetails".to_string()])
                .playlist_id(playlist_id)
                .max_results(PAGE_SIZE);

            if let Some(token) = &page_token {
                request = request.page_token(token);
            }

            let (_, response) = request.doit().await?;

            video_ids.extend(
                response
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|item| item.content_details.and_then(|d| d.video_id)),
            );

            page_token = response.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(video_ids)
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchCandidate>> {
        info!("Searching YouTube for: {query}");
        let (_, response) = self
            .hub
            .search()
            .list(&vec!["snippet".to_string()])
            .q(query)
            .max_results(max_results)
            .doit()
            .await?;

        let candidates: Vec<SearchCandidate> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(candidate_from_api)
            .collect();
        debug!(
            "Search returned: {:?}",
            candidates.iter().map(|c| c.title.as_str()).collect::<Vec<_>>()
        );

        Ok(candidates)
    }

    async fn append_video(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        self.hub
            .playlist_items()
            .insert(head_insert(playlist_id, video_id))
            .add_part("snippet")
            .doit()
            .await?;

        Ok(())
    }
}

fn playlist_from_api(playlist: ApiPlaylist) -> Option<Playlist> {
    Some(Playlist {
        id: playlist.id?,
        name: playlist.snippet.and_then(|s| s.title).unwrap_or_default(),
        total_tracks: playlist
            .content_details
            .and_then(|d| d.item_count)
            .unwrap_or_default(),
    })
}

fn created_playlist_id(created: ApiPlaylist, name: &str) -> Result<String> {
    created.id.filter(|id| !id.is_empty()).ok_or_else(|| {
        Error::UnexpectedResponse(format!("playlist '{name}' was created without an id"))
    })
}

fn candidate_from_api(result: SearchResult) -> SearchCandidate {
    let (kind, video_id) = match result.id {
        Some(id) => (id.kind.unwrap_or_default(), id.video_id),
        None => (String::new(), None),
    };

    SearchCandidate {
        kind,
        video_id,
        title: result.snippet.and_then(|s| s.title).unwrap_or_default(),
    }
}

fn new_private_playlist(name: &str) -> ApiPlaylist {
    ApiPlaylist {
        snippet: Some(PlaylistSnippet {
            title: Some(name.to_string()),
            default_language: Some("en".to_string()),
            ..Default::default()
        }),
        status: Some(PlaylistStatus {
            privacy_status: Some("private".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn head_insert(playlist_id: &str, video_id: &str) -> PlaylistItem {
    PlaylistItem {
        snippet: Some(PlaylistItemSnippet {
            playlist_id: Some(playlist_id.to_string()),
            position: Some(0),
            resource_id: Some(ResourceId {
                kind: Some(VIDEO_KIND.to_string()),
                video_id: Some(video_id.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
