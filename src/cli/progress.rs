//! Waiting indicator for model responses
//!
//! The spinner lives in its own task, redrawn on a fixed interval until the
//! owner sends the one-shot stop signal. Stopping waits for the task to clear
//! its line, so nothing printed afterwards can be overwritten.

use std::time::Duration;

use console::Term;
use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::ui::Output;
use crate::ai::{LlmProvider, collect_stream};
use crate::constants::progress::{SPINNER_FRAMES, SPINNER_INTERVAL_MS};
use crate::types::Result;

pub struct Spinner {
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start drawing on stderr; a no-op when stderr is not a terminal
    pub fn start(message: &str) -> Self {
        let term = Term::stderr();
        if !term.is_term() {
            return Self::hidden();
        }

        let (stop, mut stopped) = oneshot::channel::<()>();
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(SPINNER_INTERVAL_MS));
            let mut frame = 0usize;

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
                        let _ = term.write_str(&format!("\r\x1B[K{} {}", glyph, message));
                        frame += 1;
                    }
                }
            }

            let _ = term.write_str("\r\x1B[K");
        });

        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    pub fn hidden() -> Self {
        Self {
            stop: None,
            handle: None,
        }
    }

    /// Signal the task and wait until its line is cleared
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// Stream a response to `output`, with the spinner shown until the first
/// fragment (or error) arrives. Returns the cleaned full text.
pub async fn stream_response(
    provider: &dyn LlmProvider,
    prompt: &str,
    output: &Output,
    label: &str,
) -> Result<String> {
    let spinner = Spinner::start(label);

    let mut deltas = match provider.stream(prompt).await {
        Ok(deltas) => deltas,
        Err(e) => {
            spinner.stop().await;
            return Err(e);
        }
    };

    let first = deltas.next().await;
    spinner.stop().await;

    let rest = futures::stream::iter(first).chain(deltas);
    let text = collect_stream(Box::pin(rest), &mut |delta| output.print(delta)).await;
    output.blank();
    text
}
