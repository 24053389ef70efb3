use std::path::PathBuf;

use eyre::{Result, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, Command, OutputFormat};
use learntube::chat::ChatClient;
use learntube::config::Config;
use learntube::link;
use learntube::metadata::MetadataFetcher;
use learntube::output;
use learntube::playlist::PlaylistFetcher;
use learntube::server::{self, AppState};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("learntube.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learntube")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nSUPPORTED LINKS:\n  https://www.youtube.com/watch?v=ID[&list=PLAYLIST]\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/playlist?list=PLAYLIST\n\nLogs are written to: {}",
        log_dir().join("learntube.log").display()
    )
}

fn render<T: serde::Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => output::render_json(value),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cmd = <Cli as clap::CommandFactory>::command().after_help(build_after_help());
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        // The default location is optional; a broken file there should not block the CLI
        None => Config::load().unwrap_or_default(),
    }
    .with_env_keys();

    if cli.verbose {
        let path = cli.config.clone().unwrap_or_else(learntube::config::config_path);
        if path.exists() {
            eprintln!("Config: {}", path.display());
        }
    }

    let fetch_config = config.fetch_config();
    debug!("Sources: {:?}", fetch_config.sources);

    match cli.command {
        Command::Extract { url, format } => {
            let ids = link::extract(&url);
            if ids.is_empty() {
                bail!("not a recognized YouTube link: {url}");
            }
            println!("{}", render(format, &ids, output::render_identifiers_text)?);
        }
        Command::Info { video, format } => {
            let video_id = link::extract(&video).video_id.unwrap_or_else(|| video.trim().to_string());
            if video_id.is_empty() {
                bail!("no video ID provided");
            }
            if cli.verbose {
                eprintln!("Fetching metadata for {video_id}");
            }
            let meta = MetadataFetcher::new(fetch_config).fetch_metadata(&video_id).await;
            println!("{}", render(format, &meta, output::render_metadata_text)?);
        }
        Command::Playlist { playlist, format } => {
            let playlist_id = link::extract(&playlist)
                .playlist_id
                .unwrap_or_else(|| playlist.trim().to_string());
            if playlist_id.is_empty() {
                bail!("no playlist ID provided");
            }
            if cli.verbose {
                eprintln!("Fetching playlist {playlist_id}");
            }
            let list = PlaylistFetcher::new(fetch_config).fetch_playlist(&playlist_id).await;
            println!("{}", render(format, &list, output::render_playlist_text)?);
        }
        Command::Serve { listen } => {
            let addr = listen.unwrap_or_else(|| config.listen_addr());
            let state = AppState::new(
                MetadataFetcher::new(fetch_config.clone()),
                PlaylistFetcher::new(fetch_config),
                ChatClient::new(config.chat_config()),
            );
            eprintln!("Serving on http://{addr}");
            server::serve(state, &addr).await?;
        }
    }

    Ok(())
}
