//! Streamed response decoding
//!
//! The endpoint sends newline-delimited events of the form
//! `data: <json>` and ends with `data: [DONE]`. Lines without the prefix are
//! ignored, and a malformed event is skipped rather than failing the stream.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use super::{DeltaStream, StreamChunk};
use crate::constants::llm::{STREAM_DONE, STREAM_PREFIX};
use crate::types::SgitError;

/// Meaning of one event line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
    Ignored,
}

pub fn parse_event_line(line: &str) -> StreamEvent {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(payload) = line.strip_prefix(STREAM_PREFIX) else {
        return StreamEvent::Ignored;
    };

    if payload.trim() == STREAM_DONE {
        return StreamEvent::Done;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(StreamEvent::Delta)
            .unwrap_or(StreamEvent::Ignored),
        Err(e) => {
            debug!("Skipping malformed stream event: {}", e);
            StreamEvent::Ignored
        }
    }
}

/// Turn a response body into a stream of content deltas.
///
/// Lines are split on `\n` after buffering, so an event broken across
/// network chunks is decoded whole. Invalid UTF-8 is replaced rather than
/// treated as fatal.
pub fn decode_events<R>(body: R) -> DeltaStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut reader = BufReader::new(body);
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    match parse_event_line(&text) {
                        StreamEvent::Delta(delta) => yield Ok::<String, SgitError>(delta),
                        StreamEvent::Done => break,
                        StreamEvent::Ignored => {}
                    }
                }
                Err(e) => {
                    yield Err(SgitError::from(e));
                    break;
                }
            }
        }
    })
}
