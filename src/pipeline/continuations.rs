//! Continuation driver: each stage is a future whose continuation schedules
//! the next stage.
//!
//! The whole pipeline is one chain built with [`FutureExt::then`]. The
//! receive self-loop is a continuation that re-enters [`chain`] with another
//! `Receive` action until the state machine answers `Finish`.

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use super::download::Download;
use super::state::{Action, Outcome};

/// Builds the continuation chain for `download`.
///
/// Nothing runs until the returned future is polled.
pub fn run(download: Download) -> BoxFuture<'static, Outcome> {
    let action = download.start();
    chain(download, action).map(Download::finish).boxed()
}

fn chain(download: Download, action: Action) -> BoxFuture<'static, Download> {
    download
        .step(action)
        .then(|(mut download, event)| match event {
            Some(event) => {
                let next = download.advance(event);
                chain(download, next)
            }
            None => future::ready(download).boxed(),
        })
        .boxed()
}
