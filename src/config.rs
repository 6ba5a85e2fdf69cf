use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sync::MembershipPolicy;

pub const APP_NAME: &str = "playbridge";

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to the Google OAuth2 client secret JSON file
    #[clap(short = 'o', long, value_name = "PATH")]
    pub oauth2_json: Option<String>,

    /// Spotify application client ID
    #[clap(long, value_name = "CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret
    #[clap(long, value_name = "CLIENT_SECRET")]
    pub spotify_client_secret: Option<String>,

    /// Spotify user whose playlists are mirrored
    #[clap(short = 'u', long, value_name = "USER_ID")]
    pub spotify_user_id: Option<String>,

    /// Lower bound of the random pause before each insert
    #[clap(long, value_name = "MILLIS")]
    pub min_delay_ms: Option<u64>,

    /// Upper bound of the random pause before each insert
    #[clap(long, value_name = "MILLIS")]
    pub max_delay_ms: Option<u64>,

    /// Whether videos added during a run count as already present for later tracks
    #[clap(short = 'm', long, value_enum)]
    pub membership: Option<MembershipPolicy>,

    /// List the current configuration
    #[clap(short = 'l', long)]
    pub list: bool,

    /// Reset the configuration to default values
    #[clap(long)]
    pub reset: bool,
}

impl ConfigArgs {
    /// Copies every provided setting into `cfg`. Returns whether anything changed.
    pub fn apply(&self, cfg: &mut Config) -> bool {
        let mut changed = false;

        if let Some(path) = &self.oauth2_json {
            cfg.oauth2_json = Some(path.clone());
            changed = true;
        }
        if let Some(id) = &self.spotify_client_id {
            cfg.spotify.client_id = id.clone();
            changed = true;
        }
        if let Some(secret) = &self.spotify_client_secret {
            cfg.spotify.client_secret = secret.clone();
            changed = true;
        }
        if let Some(user) = &self.spotify_user_id {
            cfg.spotify.user_id = user.clone();
            changed = true;
        }
        if let Some(min) = self.min_delay_ms {
            cfg.sync.min_delay_ms = min;
            changed = true;
        }
        if let Some(max) = self.max_delay_ms {
            cfg.sync.max_delay_ms = max;
            changed = true;
        }
        if let Some(membership) = self.membership {
            cfg.sync.membership = membership;
            changed = true;
        }

        changed
    }

    /// Loads the file at `path`, applies the given settings and stores the
    /// result when anything changed. A file that fails to load is left untouched.
    pub fn update_file(&self, path: &Path) -> Result<(Config, bool)> {
        let mut cfg = Config::read_from(path)?;
        let changed = self.apply(&mut cfg);

        if changed {
            cfg.write_to(path)?;
        }

        Ok((cfg, changed))
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct Config {
    /// Path to the OAuth2 client secret used for the YouTube Data API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth2_json: Option<String>,

    pub spotify: SpotifyConfig,

    pub sync: SyncConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_id: String,
    pub auth_url: String,
    pub api_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        SpotifyConfig {
            client_id: String::new(),
            client_secret: String::new(),
            user_id: String::new(),
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base: "https://api.spotify.com/v1/".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,

    /// Number of search hits requested per track
    pub search_results: u32,

    pub membership: MembershipPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            min_delay_ms: 1_000,
            max_delay_ms: 3_000,
            search_results: 3,
            membership: MembershipPolicy::default(),
        }
    }
}

impl Config {
    /// Location of the configuration file
    pub fn path() -> Result<PathBuf> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }

    /// Read the configuration from the file
    pub fn read() -> Result<Self> {
        Self::read_from(&Self::path()?)
    }

    /// Read the configuration from `path`, creating a default file if none exists
    pub fn read_from(path: &Path) -> Result<Self> {
        let cfg: Config = confy::load_path(path)?;

        Ok(cfg)
    }

    /// Write the configuration to `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        confy::store_path(path, self)?;

        Ok(())
    }

    /// Checks that everything a sync run needs is present.
    pub fn validate(&self) -> Result<()> {
        if self.oauth2_json.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Config(
                "the path to the OAuth2 JSON file is not set".into(),
            ));
        }

        let spotify = &self.spotify;
        if spotify.client_id.is_empty() || spotify.client_secret.is_empty() {
            return Err(Error::Config("Spotify client credentials are not set".into()));
        }
        if spotify.user_id.is_empty() {
            return Err(Error::Config("Spotify user ID is not set".into()));
        }

        if self.sync.min_delay_ms > self.sync.max_delay_ms {
            return Err(Error::Config(format!(
                "min_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.sync.min_delay_ms, self.sync.max_delay_ms
            )));
        }
        if !(1..=50).contains(&self.sync.search_results) {
            return Err(Error::Config(format!(
                "search_results must be between 1 and 50, got {}",
                self.sync.search_results
            )));
        }

        Ok(())
    }
}

/// Hides all but the last four characters of a secret.
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "<not set>".to_string();
    }

    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}
