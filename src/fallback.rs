use std::future::Future;

use eyre::Result;
use log::{debug, warn};

/// Try each source in order and return the first successful result.
///
/// A source is only attempted after the previous one has failed. Failures are
/// logged and swallowed; `None` means every source failed.
pub async fn first_success<T, F, Fut>(sources: &[String], mut attempt: F) -> Option<T>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for source in sources {
        debug!("Trying source {source}");
        match attempt(source).await {
            Ok(value) => return Some(value),
            Err(e) => warn!("Source {source} failed: {e:#}"),
        }
    }
    None
}
