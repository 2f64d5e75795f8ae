//! Reading a lesson body into a growing text buffer.
//!
//! Two interfaces drain the same [`StreamReader`]:
//!
//! - [`cumulative_text`]: an async sequence of snapshots. Dropping it stops
//!   the read.
//! - [`read_stream`] / [`read_stream_until_cancelled`]: a callback loop with
//!   progress, completion and error handlers.
//!
//! Every snapshot is the decoded concatenation of all chunks received so far.

use futures::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::ClientError;
use crate::decode::Utf8Decoder;

/// Owns one chunk source and the cumulative buffer built from it.
///
/// The buffer only ever grows. After the source is exhausted or fails the
/// reader yields nothing more.
pub struct StreamReader<S> {
    source: S,
    decoder: Utf8Decoder,
    buffer: String,
    chunks: usize,
    finished: bool,
}

impl<S, B> StreamReader<S>
where
    S: Stream<Item = Result<B, ClientError>> + Unpin,
    B: AsRef<[u8]>,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            decoder: Utf8Decoder::new(),
            buffer: String::new(),
            chunks: 0,
            finished: false,
        }
    }

    /// Read the next chunk and return the cumulative text.
    ///
    /// Returns `None` once the source is exhausted. A source failure, or a
    /// character left incomplete at the end, is returned once as `Err`.
    pub async fn next(&mut self) -> Option<Result<&str, ClientError>> {
        match self.advance().await? {
            Ok(()) => Some(Ok(&self.buffer)),
            Err(e) => Some(Err(e)),
        }
    }

    /// Like [`next`](Self::next), but gives up with
    /// [`ClientError::StreamCancelled`] as soon as `token` fires.
    pub async fn next_until_cancelled(
        &mut self,
        token: &CancellationToken,
    ) -> Option<Result<&str, ClientError>> {
        let step = if token.is_cancelled() {
            None
        } else {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                step = self.advance() => Some(step),
            }
        };

        match step {
            None => {
                self.finished = true;
                debug!("Lesson stream cancelled after {} chunks", self.chunks);
                Some(Err(ClientError::StreamCancelled))
            }
            Some(None) => None,
            Some(Some(Ok(()))) => Some(Ok(&self.buffer)),
            Some(Some(Err(e))) => Some(Err(e)),
        }
    }

    async fn advance(&mut self) -> Option<Result<(), ClientError>> {
        if self.finished {
            return None;
        }

        match self.source.next().await {
            Some(Ok(chunk)) => {
                self.chunks += 1;
                let text = self.decoder.decode(chunk.as_ref());
                self.buffer.push_str(&text);
                debug!("Chunk {} received, {} bytes buffered", self.chunks, self.buffer.len());
                Some(Ok(()))
            }
            Some(Err(e)) => {
                self.finished = true;
                warn!("Chunk source failed after {} chunks: {}", self.chunks, e);
                Some(Err(e))
            }
            None => {
                self.finished = true;
                match std::mem::take(&mut self.decoder).finish() {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("Lesson stream ended mid-character: {}", e);
                        Some(Err(e))
                    }
                }
            }
        }
    }

    /// Text received so far.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Number of chunks consumed.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}

/// Callbacks for [`read_stream`].
///
/// `on_complete` and `on_error` are `FnOnce`: at most one of them runs, once.
pub struct StreamHandlers<'a> {
    on_progress: Box<dyn FnMut(&str) + Send + 'a>,
    on_complete: Box<dyn FnOnce() + Send + 'a>,
    on_error: Box<dyn FnOnce(&ClientError) + Send + 'a>,
}

impl<'a> StreamHandlers<'a> {
    /// Handlers with the given progress callback and no-op completion and
    /// error callbacks.
    pub fn new<P>(on_progress: P) -> Self
    where
        P: FnMut(&str) + Send + 'a,
    {
        Self {
            on_progress: Box::new(on_progress),
            on_complete: Box::new(|| {}),
            on_error: Box::new(|_| {}),
        }
    }

    pub fn on_complete<C>(mut self, on_complete: C) -> Self
    where
        C: FnOnce() + Send + 'a,
    {
        self.on_complete = Box::new(on_complete);
        self
    }

    pub fn on_error<E>(mut self, on_error: E) -> Self
    where
        E: FnOnce(&ClientError) + Send + 'a,
    {
        self.on_error = Box::new(on_error);
        self
    }
}

/// Drain `source`, reporting cumulative text after every chunk.
///
/// For `n` chunks `on_progress` runs exactly `n` times, then `on_complete`
/// runs once. On failure `on_error` runs once instead of `on_complete`.
/// Returns the full text or the error.
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use futures::stream;
/// use lessonstream::client::ClientError;
/// use lessonstream::stream::{read_stream, StreamHandlers};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let chunks = vec![Ok::<_, ClientError>(Bytes::from("# Tit")), Ok(Bytes::from("le\n"))];
/// let mut seen = Vec::new();
/// let text = read_stream(stream::iter(chunks), StreamHandlers::new(|t| seen.push(t.to_string())))
///     .await
///     .unwrap();
/// assert_eq!(text, "# Title\n");
/// assert_eq!(seen, vec!["# Tit", "# Title\n"]);
/// # });
/// ```
pub async fn read_stream<S, B>(source: S, handlers: StreamHandlers<'_>) -> Result<String, ClientError>
where
    S: Stream<Item = Result<B, ClientError>> + Unpin,
    B: AsRef<[u8]>,
{
    read_stream_until_cancelled(source, handlers, &CancellationToken::new()).await
}

/// [`read_stream`] that stops when `token` is cancelled.
///
/// Cancellation returns [`ClientError::StreamCancelled`] without running
/// `on_complete` or `on_error`.
pub async fn read_stream_until_cancelled<S, B>(
    source: S,
    handlers: StreamHandlers<'_>,
    token: &CancellationToken,
) -> Result<String, ClientError>
where
    S: Stream<Item = Result<B, ClientError>> + Unpin,
    B: AsRef<[u8]>,
{
    let StreamHandlers {
        mut on_progress,
        on_complete,
        on_error,
    } = handlers;
    let mut reader = StreamReader::new(source);

    loop {
        match reader.next_until_cancelled(token).await {
            Some(Ok(text)) => on_progress(text),
            Some(Err(ClientError::StreamCancelled)) => return Err(ClientError::StreamCancelled),
            Some(Err(e)) => {
                on_error(&e);
                return Err(e);
            }
            None => break,
        }
    }

    info!("Lesson stream complete: {} chunks, {} bytes", reader.chunks(), reader.text().len());
    on_complete();
    Ok(reader.into_text())
}

/// Cumulative snapshots of `source` as an async sequence.
///
/// Yields one `Ok` snapshot per chunk and ends after the first `Err`.
/// Dropping the returned stream stops reading the source.
pub fn cumulative_text<S, B>(source: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<B, ClientError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    stream::unfold(StreamReader::new(Box::pin(source)), |mut reader| async move {
        let item = match reader.next().await {
            Some(Ok(text)) => Ok(text.to_string()),
            Some(Err(e)) => Err(e),
            None => return None,
        };
        Some((item, reader))
    })
}
