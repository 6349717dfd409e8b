//! Server-sent event decoding for streamed chat completions.
//!
//! The API streams one JSON object per `data:` line and ends the stream
//! with a literal sentinel:
//!
//! ```text
//! data: {"id":"chatcmpl-1","choices":[...]}
//!
//! data: [DONE]
//! ```

use futures_util::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{Result, XenoError};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// What a single line of the event stream means to the decoder.
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// The payload following a `data: ` prefix.
    Data(&'a str),
    /// The `[DONE]` sentinel.
    Done,
    /// Blank lines, comments and fields other than `data`.
    Ignored,
}

/// Classifies one line of the event stream. Surrounding whitespace is trimmed.
pub fn parse_line(line: &str) -> SseLine<'_> {
    match line.trim().strip_prefix(DATA_PREFIX) {
        Some(DONE_SENTINEL) => SseLine::Done,
        Some(data) => SseLine::Data(data),
        None => SseLine::Ignored,
    }
}

/// Splits incoming chunks into complete lines.
///
/// Bytes after the last newline are held back until the next chunk, so
/// multi-byte characters split across chunks are decoded intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Removes and returns the next complete line, without its newline.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line[..pos]).into_owned())
    }

    /// The incomplete trailing segment that has not been emitted yet.
    pub fn residue(&self) -> &[u8] {
        &self.buffer
    }
}

struct DecodeState<S> {
    body: S,
    lines: LineBuffer,
    finished: bool,
}

/// Decodes a byte stream of server-sent events into typed events.
///
/// Events are produced lazily: the body is only read when the consumer asks
/// for the next item. Lines whose payload is not valid JSON for `T` are
/// skipped. The stream ends at the `[DONE]` sentinel or when the body ends;
/// a read error is yielded once and ends the stream. The body is dropped on
/// every one of those exits, and when the returned stream is dropped early.
pub fn decode<S, B, E, T>(body: S) -> impl Stream<Item = Result<T>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + Unpin,
    B: AsRef<[u8]> + Send,
    E: Into<XenoError> + Send,
    T: DeserializeOwned + Send,
{
    let state = DecodeState {
        body,
        lines: LineBuffer::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            while let Some(line) = state.lines.next_line() {
                match parse_line(&line) {
                    SseLine::Done => return None,
                    SseLine::Ignored => continue,
                    SseLine::Data(data) => match serde_json::from_str::<T>(data) {
                        Ok(event) => return Some((Ok(event), state)),
                        Err(e) => {
                            trace!(error = %e, "skipping undecodable stream line");
                        }
                    },
                }
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.lines.push(chunk.as_ref()),
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    if !state.lines.residue().is_empty() {
                        trace!(
                            bytes = state.lines.residue().len(),
                            "discarding unterminated stream line"
                        );
                    }
                    return None;
                }
            }
        }
    })
}
