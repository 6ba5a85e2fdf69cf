use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::catalog::SourceCatalog;
use crate::config::SpotifyConfig;
use crate::error::{Error, Result};
use crate::model::{Playlist, Track};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

/// Spotify paging object; `next` is the absolute URL of the following page.
#[derive(Deserialize, Debug)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiPlaylist {
    id: String,
    name: String,
    tracks: ApiTrackCount,
}

#[derive(Deserialize, Debug)]
struct ApiTrackCount {
    total: u32,
}

#[derive(Deserialize, Debug)]
struct ApiPlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Deserialize, Debug)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    album: Option<ApiNamed>,
    #[serde(default)]
    artists: Vec<ApiNamed>,
}

#[derive(Deserialize, Debug)]
struct ApiNamed {
    name: String,
}

impl From<ApiPlaylist> for Playlist {
    fn from(p: ApiPlaylist) -> Playlist {
        Playlist {
            id: p.id,
            name: p.name,
            total_tracks: p.tracks.total,
        }
    }
}

impl From<ApiTrack> for Track {
    fn from(t: ApiTrack) -> Track {
        Track {
            id: t.id.unwrap_or_default(),
            name: t.name,
            album_name: t.album.map(|a| a.name).unwrap_or_default(),
            artists: t.artists.into_iter().map(|a| a.name).collect(),
        }
    }
}

/// Reads playlists of a single Spotify user with an app-only
/// (client credentials) token.
pub struct SpotifyReader {
    http: Client,
    cfg: SpotifyConfig,
    token: String,
}

impl SpotifyReader {
    /// Builds the HTTP client and exchanges the client credentials for a bearer token.
    pub async fn connect(cfg: &SpotifyConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let token = Self::request_token(&http, cfg).await?;

        Ok(Self {
            http,
            cfg: cfg.clone(),
            token,
        })
    }

    async fn request_token(http: &Client, cfg: &SpotifyConfig) -> Result<String> {
        debug!("Requesting Spotify access token from {}", cfg.auth_url);
        let response = http
            .post(&cfg.auth_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", cfg.client_id.as_str()),
                ("client_secret", cfg.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Auth(format!(
                "Spotify token request failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.api_base.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body)
    }

    /// Walks a paged collection, following `next` links until exhausted.
    async fn collect_pages<T: DeserializeOwned>(&self, first: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);

        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }
}

#[async_trait::async_trait]
impl SourceCatalog for SpotifyReader {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        info!("Getting playlists of Spotify user {}", self.cfg.user_id);
        let url = self.endpoint(&format!("users/{}/playlists?limit=50", self.cfg.user_id));
        let playlists: Vec<ApiPlaylist> = self.collect_pages(url).await?;

        Ok(playlists.into_iter().map(Playlist::from).collect())
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        info!("Getting tracks of Spotify playlist {playlist_id}");
        let url = self.endpoint(&format!("playlists/{playlist_id}/tracks?limit=100"));
        let items: Vec<ApiPlaylistItem> = self.collect_pages(url).await?;

        Ok(tracks_from_items(items))
    }
}

/// Entries whose track is gone (removed from the catalog) come back as `null`.
fn tracks_from_items(items: Vec<ApiPlaylistItem>) -> Vec<Track> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .map(Track::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn stub_config(server: &ServerGuard) -> SpotifyConfig {
        SpotifyConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            user_id: "someone".into(),
            auth_url: format!("{}/api/token", server.url()),
            api_base: format!("{}/v1/", server.url()),
        }
    }

    async fn accept_token(server: &mut ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/api/token")
            .match_body(Matcher::UrlEncoded(
                "grant_type".into(),
                "client_credentials".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok", "token_type": "Bearer", "expires_in": 3600}"#)
            .create_async()
            .await
    }

    fn track_page(names: &[&str], next: Option<String>) -> String {
        let items: Vec<serde_json::Value> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "track": {
                        "id": name,
                        "name": name,
                        "album": {"name": "Album"},
                        "artists": [{"name": "Artist"}]
                    }
                })
            })
            .collect();
        serde_json::json!({ "items": items, "next": next }).to_string()
    }

    #[tokio::test]
    async fn follows_next_links_until_exhausted() {
        let mut server = Server::new_async().await;
        let token = accept_token(&mut server).await;
        let next = format!("{}/page2", server.url());
        let first = server
            .mock("GET", Matcher::Regex("^/v1/playlists/pl1/tracks".into()))
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(track_page(&["a"], Some(next)))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/page2")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(track_page(&["b"], None))
            .create_async()
            .await;

        let reader = SpotifyReader::connect(&stub_config(&server)).await.unwrap();
        let tracks = reader.list_tracks("pl1").await.unwrap();

        let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        token.assert_async().await;
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_page_is_an_http_error() {
        let mut server = Server::new_async().await;
        let _token = accept_token(&mut server).await;
        let _playlists = server
            .mock("GET", Matcher::Regex("^/v1/users/someone/playlists".into()))
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": {"status": 401, "message": "Invalid access token"}}"#)
            .create_async()
            .await;

        let reader = SpotifyReader::connect(&stub_config(&server)).await.unwrap();
        assert!(matches!(
            reader.list_playlists().await,
            Err(Error::Http(_))
        ));
    }

    #[tokio::test]
    async fn rejected_token_request_is_an_auth_error() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/api/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_client"}"#)
            .create_async()
            .await;

        assert!(matches!(
            SpotifyReader::connect(&stub_config(&server)).await,
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn decodes_playlist_page() {
        let body = r#"{
            "href": "https://api.spotify.com/v1/users/me/playlists?offset=0&limit=50",
            "items": [
                {"id": "37i9", "name": "Road Trip", "public": true, "tracks": {"href": "x", "total": 42}},
                {"id": "1a2b", "name": "Focus", "tracks": {"total": 0}}
            ],
            "limit": 50,
            "next": "https://api.spotify.com/v1/users/me/playlists?offset=50&limit=50",
            "total": 52
        }"#;

        let page: Page<ApiPlaylist> = serde_json::from_str(body).unwrap();
        assert_eq!(
            page.next.as_deref(),
            Some("https://api.spotify.com/v1/users/me/playlists?offset=50&limit=50")
        );

        let playlists: Vec<Playlist> = page.items.into_iter().map(Playlist::from).collect();
        assert_eq!(
            playlists[0],
            Playlist {
                id: "37i9".into(),
                name: "Road Trip".into(),
                total_tracks: 42,
            }
        );
        assert_eq!(playlists[1].total_tracks, 0);
    }

    #[test]
    fn decodes_tracks_and_drops_missing_entries() {
        let body = r#"{
            "items": [
                {"added_at": "2024-01-01T00:00:00Z", "track": {
                    "id": "3AJwUDP919kvQ9QcozQPxg",
                    "name": "Yellow",
                    "album": {"name": "Parachutes"},
                    "artists": [{"name": "Coldplay"}]
                }},
                {"track": null},
                {"track": {
                    "id": null,
                    "name": "Local Demo",
                    "album": {"name": ""},
                    "artists": [{"name": "A"}, {"name": "B"}]
                }}
            ],
            "next": null
        }"#;

        let page: Page<ApiPlaylistItem> = serde_json::from_str(body).unwrap();
        assert!(page.next.is_none());

        let tracks = tracks_from_items(page.items);
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            tracks[0],
            Track {
                id: "3AJwUDP919kvQ9QcozQPxg".into(),
                name: "Yellow".into(),
                album_name: "Parachutes".into(),
                artists: vec!["Coldplay".into()],
            }
        );
        assert_eq!(tracks[1].id, "");
        assert_eq!(tracks[1].artists, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn decodes_token() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token": "BQD", "token_type": "Bearer", "expires_in": 3600}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "BQD");
    }
}
