// Event-stream sample source - reads `data: {json}` lines from a long-lived HTTP response
use crate::application::sample_source::{SampleStream, SourceError};
use crate::domain::sample::RawSample;
use bytes::{Buf, BytesMut};
use futures::StreamExt;
use reqwest::header;
use std::time::Duration;

pub const DATA_PREFIX: &str = "data:";

#[derive(Debug, Clone)]
pub struct SseSource {
    client: reqwest::Client,
    url: String,
    read_timeout: Duration,
}

impl SseSource {
    pub fn new(url: impl Into<String>, connect_timeout: Duration, read_timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| SourceError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            read_timeout,
        })
    }

    /// One sample per well-formed frame. The stream ends on connection close,
    /// or after yielding the first connection-level error.
    pub fn into_stream(self) -> SampleStream {
        let SseSource {
            client,
            url,
            read_timeout,
        } = self;

        Box::pin(async_stream::stream! {
            let connect = client
                .get(&url)
                .header(header::ACCEPT, "text/event-stream")
                .send();

            let response = match tokio::time::timeout(read_timeout, connect).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    yield Err(SourceError::Connect { url: url.clone(), source: e.into() });
                    return;
                }
                Err(_) => {
                    yield Err(SourceError::ReadTimeout { url: url.clone(), timeout: read_timeout });
                    return;
                }
            };

            if !response.status().is_success() {
                yield Err(SourceError::Status { url: url.clone(), status: response.status().as_u16() });
                return;
            }

            tracing::info!(%url, "connected to sample stream");
            let mut body = response.bytes_stream();
            let mut lines = LineBuffer::default();

            loop {
                let chunk = match tokio::time::timeout(read_timeout, body.next()).await {
                    Ok(Some(Ok(chunk))) => chunk,
                    Ok(Some(Err(e))) => {
                        yield Err(SourceError::Read { url: url.clone(), source: e.into() });
                        return;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        yield Err(SourceError::ReadTimeout { url: url.clone(), timeout: read_timeout });
                        return;
                    }
                };

                lines.extend(&chunk);
                while let Some(line) = lines.next_line() {
                    if let Some(sample) = parse_frame(&line) {
                        yield Ok(vec![sample]);
                    }
                }
            }

            if let Some(sample) = lines.finish().as_deref().and_then(parse_frame) {
                yield Ok(vec![sample]);
            }
            tracing::info!(%url, "sample stream closed by server");
        })
    }
}

/// Payload of a `data:` line. Other lines and unparsable payloads yield `None`.
pub fn parse_frame(line: &str) -> Option<RawSample> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    match serde_json::from_str(payload) {
        Ok(sample) => Some(sample),
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed frame");
            None
        }
    }
}

/// Splits a byte stream into lines, tolerating chunks that cut lines in half
#[derive(Debug, Default)]
struct LineBuffer {
    pending: BytesMut,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|b| *b == b'\n')?;
        let line = self.pending.split_to(end);
        self.pending.advance(1);
        Some(decode(&line))
    }

    /// Whatever is left after the connection closed
    fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| decode(&self.pending))
    }
}

fn decode(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
