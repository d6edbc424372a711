use http::{header::CONTENT_LENGTH, HeaderMap, HeaderValue, StatusCode};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::{body::Body, error::ResponseError, response::PlatformResponse};

/// A buffered stand-in for a streaming HTTP response.
///
/// Handlers call [`set_status_and_headers`](ServerResponse::set_status_and_headers)
/// and [`finish`](ServerResponse::finish) as they would on a streaming
/// response. Nothing reaches the platform until the adapter flushes the
/// buffer, committing status, headers and body in one go.
///
/// Clones share the same buffer, so a handler may finish the response from
/// another task after it has returned.
#[derive(Clone, Debug)]
pub struct ServerResponse {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
    finished: watch::Sender<bool>,
}

#[derive(Debug, Default)]
struct State {
    status: StatusCode,
    headers: HeaderMap,
    chunks: Vec<Vec<u8>>,
    headers_sent: bool,
    flushed: bool,
}

impl Default for ServerResponse {
    fn default() -> Self {
        ServerResponse::new()
    }
}

impl ServerResponse {
    pub fn new() -> Self {
        let (finished, _) = watch::channel(false);
        ServerResponse {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                finished,
            }),
        }
    }

    /// Whether the response has been finalized.
    pub fn headers_sent(&self) -> bool {
        self.state().headers_sent
    }

    /// Sets the status and merges `headers` over any set before.
    pub fn set_status_and_headers(
        &self,
        status: StatusCode,
        headers: Option<HeaderMap>,
    ) -> Result<(), ResponseError> {
        let mut state = self.state();
        if state.headers_sent {
            return Err(ResponseError::HeadersSent);
        }
        state.status = status;
        if let Some(headers) = headers {
            state.headers.extend(headers);
        }
        Ok(())
    }

    /// Buffers the final chunk, if any, and finalizes the response.
    ///
    /// Finalizing wakes anyone waiting in
    /// [`wait_for_completion`](ServerResponse::wait_for_completion).
    pub fn finish<B>(&self, chunk: B) -> Result<(), ResponseError>
    where
        B: Into<Body>,
    {
        {
            let mut state = self.state();
            if state.headers_sent {
                return Err(ResponseError::AlreadyFinished);
            }
            let chunk = chunk.into();
            if !chunk.is_empty() {
                state.chunks.push(chunk.into_bytes());
            }
            state.headers_sent = true;
        }
        self.inner.finished.send_replace(true);
        Ok(())
    }

    /// Resolves once the response has been finalized, immediately if it
    /// already has been.
    pub async fn wait_for_completion(&self) {
        let mut finished = self.inner.finished.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = finished.wait_for(|done| *done).await;
    }

    /// Commits the buffered response to the platform.
    ///
    /// Adds a `content-length` covering every buffered chunk, then issues one
    /// `write_head`, the chunks in order and one `end`. A buffer is flushed
    /// at most once; later flushes fail and leave `response` untouched.
    pub(crate) fn flush_to<R>(self, mut response: R) -> Result<R::Output, ResponseError>
    where
        R: PlatformResponse,
    {
        let (status, mut headers, chunks) = {
            let mut state = self.state();
            if state.flushed {
                return Err(ResponseError::AlreadyFlushed);
            }
            state.flushed = true;
            (
                state.status,
                std::mem::take(&mut state.headers),
                std::mem::take(&mut state.chunks),
            )
        };

        let total: usize = chunks.iter().map(Vec::len).sum();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(total));
        debug!("flushing response: status={} content-length={}", status, total);

        response.write_head(status, &headers);
        for chunk in &chunks {
            response.write(chunk);
        }
        Ok(response.end())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
