use crate::errors::{EbookError, EbookResult};
use crate::render::CancellationToken;
use tracing::debug;

/// Reassembles large markup in fixed-size slices,
/// yielding to the async scheduler between slices.
///
/// Content is never transformed; only the pacing changes.
///
/// # Examples
/// ```
/// # use libris::render::{CancellationToken, ChunkedProcessor};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> libris::errors::EbookResult<()> {
/// let content = "a".repeat(120_000);
/// let processed = ChunkedProcessor::default()
///     .process(&content, &CancellationToken::new())
///     .await?;
///
/// assert_eq!(content, processed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkedProcessor {
    chunk_size: usize,
}

impl ChunkedProcessor {
    /// The default slice length, in characters.
    pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

    /// Creates a processor slicing content every `chunk_size` characters.
    ///
    /// A `chunk_size` of `0` is treated as `1`.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// The slice length, in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Starts a [`ChunkedJob`] over `content` for hosts driving their own scheduling.
    pub fn job<'a>(&self, content: &'a str) -> ChunkedJob<'a> {
        ChunkedJob {
            content,
            chunk_size: self.chunk_size,
            cursor: 0,
            output: String::with_capacity(content.len()),
            aborted: false,
        }
    }

    /// Reassembles `content`, checking `token` before each slice
    /// and yielding with [`tokio::task::yield_now`] after each one.
    ///
    /// # Errors
    /// [`EbookError::Aborted`] once `token` is observed as cancelled;
    /// partial output is discarded.
    pub async fn process(&self, content: &str, token: &CancellationToken) -> EbookResult<String> {
        let mut job = self.job(content);
        let mut slices = 0usize;

        while job.step(token)?.is_some() {
            slices += 1;
            tokio::task::yield_now().await;
        }

        debug!(slices, bytes = job.output.len(), "Processed content in slices");
        job.finish().ok_or(EbookError::Aborted)
    }
}

impl Default for ChunkedProcessor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE)
    }
}

/// Stepwise reassembly of one string; see [`ChunkedProcessor::job`].
///
/// # Examples
/// ```
/// # use libris::render::{CancellationToken, ChunkedProcessor};
/// let token = CancellationToken::new();
/// let mut job = ChunkedProcessor::new(4).job("abcdefghij");
///
/// assert_eq!(Some(4), job.step(&token).unwrap());
/// assert_eq!(Some(4), job.step(&token).unwrap());
/// assert_eq!(Some(2), job.step(&token).unwrap());
/// assert_eq!(None, job.step(&token).unwrap());
/// assert_eq!(Some("abcdefghij".to_owned()), job.finish());
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedJob<'a> {
    content: &'a str,
    chunk_size: usize,
    cursor: usize,
    output: String,
    aborted: bool,
}

impl ChunkedJob<'_> {
    /// Checks `token`, then appends the next slice.
    ///
    /// Returns the number of characters appended,
    /// or [`None`] once all content has been appended.
    ///
    /// # Errors
    /// [`EbookError::Aborted`] if `token` is cancelled.
    /// The partial output is discarded and every later step fails the same way.
    pub fn step(&mut self, token: &CancellationToken) -> EbookResult<Option<usize>> {
        if self.aborted {
            return Err(EbookError::Aborted);
        }
        if let Err(error) = token.check_cancelled() {
            self.aborted = true;
            self.output = String::new();
            return Err(error);
        }
        if self.is_complete() {
            return Ok(None);
        }

        let remaining = &self.content[self.cursor..];
        // Slice ends on a char boundary
        let (end, count) = match remaining.char_indices().nth(self.chunk_size) {
            Some((offset, _)) => (offset, self.chunk_size),
            None => (remaining.len(), remaining.chars().count()),
        };

        self.output.push_str(&remaining[..end]);
        self.cursor += end;
        Ok(Some(count))
    }

    /// Returns `true` once all content has been appended.
    pub fn is_complete(&self) -> bool {
        self.cursor == self.content.len()
    }

    /// Returns `true` if a step observed cancellation.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// The reassembled content, or [`None`] if the job was aborted or is incomplete.
    pub fn finish(self) -> Option<String> {
        (!self.aborted && self.is_complete()).then_some(self.output)
    }
}
