//! Callback driver: every operation is issued with a completion handler.
//!
//! [`begin`] starts one operation on the runtime and invokes its handler
//! exactly once with the result. The handler advances the state machine and
//! issues the next operation with a fresh handler, so each stage's completion
//! strictly precedes the start of the next. When the pipeline finishes, the
//! caller's handler receives the [`Outcome`].

use tokio::sync::oneshot;
use tracing::debug;

use super::download::Download;
use super::state::{Action, Event, Outcome};

type CompletionHandler = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// Starts `download` and returns immediately.
///
/// `on_complete` is invoked once the pipeline reaches a terminal state. If a
/// stage task panics the handler is dropped without being invoked.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub fn start<F>(download: Download, on_complete: F)
where
    F: FnOnce(Outcome) + Send + 'static,
{
    let action = download.start();
    dispatch(download, action, Box::new(on_complete));
}

/// Runs `download` through the callback chain and waits for its outcome.
///
/// Returns `None` if the chain was abandoned before completing.
pub async fn run(download: Download) -> Option<Outcome> {
    let (tx, rx) = oneshot::channel();
    start(download, move |outcome| {
        // Receiver gone means nobody is waiting any more.
        let _ = tx.send(outcome);
    });
    rx.await.ok()
}

fn dispatch(download: Download, action: Action, on_complete: CompletionHandler) {
    begin(download, action, move |mut download, event| match event {
        Some(event) => {
            let next = download.advance(event);
            dispatch(download, next, on_complete);
        }
        None => {
            debug!(pipeline = download.id(), stage = %download.stage(), "pipeline finished");
            on_complete(download.finish());
        }
    });
}

/// Issues `action` and calls `handler` with its completion.
fn begin<H>(download: Download, action: Action, handler: H)
where
    H: FnOnce(Download, Option<Event>) + Send + 'static,
{
    tokio::spawn(async move {
        let (download, event) = download.step(action).await;
        handler(download, event);
    });
}
