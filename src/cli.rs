use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "learntube",
    about = "Distraction-free learning backend: link parsing, video metadata, chat proxy",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Config file (defaults to ~/.config/learntube/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print extra progress information to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract video and playlist IDs from a link
    Extract {
        /// Pasted YouTube link
        url: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show metadata for a video
    Info {
        /// YouTube link or bare video ID
        video: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the videos in a playlist
    Playlist {
        /// YouTube playlist link or bare playlist ID
        playlist: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides listen_addr in the config)
        #[arg(short, long)]
        listen: Option<String>,
    },
}
