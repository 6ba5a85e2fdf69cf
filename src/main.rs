use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cliclack::{confirm, intro, note, outro};
use log::info;

mod catalog;
mod config;
mod error;
mod matcher;
mod model;
mod pacing;
mod spotify;
mod sync;
mod youtube;

use error::{Error, Result};
use matcher::FirstVideoMatcher;
use pacing::Jitter;
use spotify::SpotifyReader;
use sync::Reconciler;
use youtube::YouTubeClient;

#[derive(Parser, Debug)]
#[command(version, about = "Mirror Spotify playlists into YouTube playlists")]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage credentials and sync settings
    Config(config::ConfigArgs),
    /// Mirror every Spotify playlist of the configured user into YouTube
    Sync {
        /// Create YouTube playlists that do not exist yet
        #[clap(short = 'c', long)]
        create_missing: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    exit_code(run(cli).await)
}

async fn run(cli: Cli) -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| Error::Config("Failed to install rustls crypto provider".into()))?;

    match cli.command {
        Commands::Config(args) => handle_config(args),
        Commands::Sync { create_missing } => handle_sync(create_missing).await,
    }
}

/// Errors are shown once as the closing line; the process then exits non-zero.
fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = outro(format!("❌ {e}"));
            ExitCode::FAILURE
        }
    }
}

fn handle_config(args: config::ConfigArgs) -> Result<()> {
    intro("📝 Configuration")?;

    let path = config::Config::path()?;

    if args.reset {
        let confirmed = confirm("Are you sure you want to reset the configuration?").interact()?;

        if confirmed {
            config::Config::default().write_to(&path)?;
            outro("✅ Configuration reset successfully")?;
        }
        return Ok(());
    }

    let (cfg, changed) = args.update_file(&path)?;
    if changed {
        outro("✅ Configuration updated successfully")?;
    }

    if args.list {
        note(
            "OAuth2 JSON path",
            cfg.oauth2_json.as_deref().unwrap_or("<not set>"),
        )?;
        note(
            "Spotify",
            format!(
                "client id: {}\nclient secret: {}\nuser id: {}",
                cfg.spotify.client_id,
                config::mask(&cfg.spotify.client_secret),
                cfg.spotify.user_id
            ),
        )?;
        note(
            "Sync",
            format!(
                "delay: {}-{} ms\nsearch results: {}\nmembership: {:?}",
                cfg.sync.min_delay_ms,
                cfg.sync.max_delay_ms,
                cfg.sync.search_results,
                cfg.sync.membership
            ),
        )?;
        outro("✅ Configuration listing completed")?;
    }

    Ok(())
}

async fn handle_sync(create_missing: bool) -> Result<()> {
    intro(if create_missing {
        "🔄 Playlist Sync (creating missing playlists)"
    } else {
        "🔄 Playlist Sync"
    })?;

    sync_all(create_missing).await?;
    outro("✅ Sync completed")?;
    Ok(())
}

async fn sync_all(create_missing: bool) -> Result<()> {
    let cfg = config::Config::read()?;
    cfg.validate()?;

    let oauth2_json = cfg
        .oauth2_json
        .as_deref()
        .ok_or_else(|| Error::Config("OAuth2 JSON path is not set".into()))?;

    info!("Authorizing clients ...");
    let source = SpotifyReader::connect(&cfg.spotify).await?;
    let destination = YouTubeClient::new(oauth2_json).await?;

    let reconciler = Reconciler::new(
        destination,
        Box::new(FirstVideoMatcher),
        Jitter::new(cfg.sync.min_delay_ms, cfg.sync.max_delay_ms)?,
        cfg.sync.membership,
        cfg.sync.search_results,
    );

    let summary = reconciler.run(&source, create_missing).await?;
    info!(
        "Synced {} playlists ({} created): {} videos added, {} already present, {} unmatched, {} failed",
        summary.playlists,
        summary.created,
        summary.tracks.appended,
        summary.tracks.already_present,
        summary.tracks.unmatched,
        summary.tracks.failed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_exit_non_zero() {
        let err = Error::PlaylistMatch {
            name: "Road Trip".into(),
            found: 2,
        };
        assert_eq!(exit_code(Err(err)), ExitCode::FAILURE);
        assert_eq!(exit_code(Ok(())), ExitCode::SUCCESS);
    }
}
