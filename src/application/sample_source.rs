// Sample source seam - anything that can lazily yield batches of raw samples
use crate::domain::controls::SourceMode;
use crate::domain::sample::RawSample;
use crate::domain::session::Session;
use futures::stream::Stream;
use std::pin::Pin;
use std::time::Duration;

/// Samples pulled in one tick: a full snapshot or a single sample
pub type SampleBatch = Vec<RawSample>;

/// Pull-based sample sequence. `None` means the source is exhausted; an `Err`
/// item is the last item the stream yields.
pub type SampleStream = Pin<Box<dyn Stream<Item = Result<SampleBatch, SourceError>> + Send>>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("no data from {url} within {timeout:?}")]
    ReadTimeout { url: String, timeout: Duration },

    #[error("stream from {url} broke: {source}")]
    Read {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid source setup: {0}")]
    Setup(String),
}

/// Opens sample streams for a source mode
pub trait SourceFactory: Send + Sync {
    fn open(&self, mode: SourceMode, stream_url: &str, session: &Session) -> SampleStream;
}
