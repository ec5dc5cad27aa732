// Builds the sample stream for each source mode
use crate::application::sample_source::{SampleBatch, SampleStream, SourceFactory};
use crate::application::synthetic_source::{SyntheticSource, SyntheticStyle};
use crate::domain::controls::SourceMode;
use crate::domain::session::Session;
use crate::infrastructure::config::SourceSettings;
use crate::infrastructure::sse_source::SseSource;
use futures::stream;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DefaultSourceFactory {
    settings: SourceSettings,
}

impl DefaultSourceFactory {
    pub fn new(settings: SourceSettings) -> Self {
        Self { settings }
    }
}

impl SourceFactory for DefaultSourceFactory {
    fn open(&self, mode: SourceMode, stream_url: &str, session: &Session) -> SampleStream {
        match mode {
            SourceMode::Snapshot => SyntheticSource::new(session, SyntheticStyle::Snapshot)
                .with_seed(self.settings.seed)
                .into_stream(),
            SourceMode::Random => SyntheticSource::new(session, SyntheticStyle::Continuous)
                .with_seed(self.settings.seed)
                .into_stream(),
            SourceMode::Stream => {
                let source = SseSource::new(
                    stream_url,
                    Duration::from_secs(self.settings.connect_timeout_secs),
                    Duration::from_secs(self.settings.read_timeout_secs),
                );
                match source {
                    Ok(source) => source.into_stream(),
                    Err(e) => Box::pin(stream::once(async move { Err::<SampleBatch, _>(e) })),
                }
            }
        }
    }
}
