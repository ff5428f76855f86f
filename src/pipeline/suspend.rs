//! Cooperative-suspension driver: a plain `async` loop.
//!
//! The pipeline suspends at each `.await` on the transport or resolver and
//! resumes on the next stage once the completion is in.

use tracing::instrument;

use super::download::Download;
use super::state::Outcome;

/// Runs `download` to a terminal state.
#[instrument(level = "debug", skip(download), fields(pipeline = download.id()))]
pub async fn run(mut download: Download) -> Outcome {
    let mut action = download.start();
    while let Some(event) = download.perform(action).await {
        action = download.advance(event);
    }
    download.finish()
}
