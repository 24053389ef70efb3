pub mod chat;
pub mod config;
pub mod error;
pub mod fallback;
pub mod format;
pub mod link;
pub mod metadata;
pub mod output;
pub mod playlist;
pub mod server;

pub use link::{IdentifierPair, extract};
pub use metadata::{MetadataFetcher, VideoMetadata};
pub use playlist::{Playlist, PlaylistFetcher, PlaylistVideo};
