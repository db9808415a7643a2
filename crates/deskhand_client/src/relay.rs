use client_logging::{client_debug, client_warn};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use url::Url;

use crate::http::ApiClient;
use crate::types::{ApiError, DeliveryStatusDto, ProgressUpdateDto};

/// Where the push-event subscription lives and which logical channel to join.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub events_path: String,
    pub channel: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            events_path: "/api/events".to_string(),
            channel: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// The subscription opened; joining the channel is the subscription itself.
    Connected,
    Progress(ProgressUpdateDto),
    DeliveryStatus(DeliveryStatusDto),
    /// Terminal: nothing reconnects, events missed after this are lost.
    Disconnected { reason: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: RelayEvent);
}

/// One parsed server-sent-events frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental parser over the `text/event-stream` framing: `event:` and
/// `data:` fields accumulate until a blank line dispatches the frame.
///
/// Chunks arrive at arbitrary byte offsets, so the buffer holds raw bytes and
/// only complete lines are decoded. A `\n` byte never occurs inside a
/// multibyte UTF-8 sequence, so splitting on it keeps every line decodable
/// on its own even when a chunk boundary lands mid-character.
#[derive(Debug, Default)]
pub struct FrameParser {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(newline) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=newline).collect();
            let mut end = raw.len() - 1;
            if end > 0 && raw[end - 1] == b'\r' {
                end -= 1;
            }
            let line = String::from_utf8_lossy(&raw[..end]);
            self.take_line(&line, &mut frames);
        }
        frames
    }

    fn take_line(&mut self, line: &str, frames: &mut Vec<SseFrame>) {
        if line.is_empty() {
            if self.event.is_some() || !self.data.is_empty() {
                frames.push(SseFrame {
                    event: self.event.take(),
                    data: self.data.join("\n"),
                });
                self.data.clear();
            }
        } else if line.starts_with(':') {
            // Comment line, used by the server as a heartbeat.
        } else if let Some(value) = field_value(line, "event") {
            self.event = Some(value.to_string());
        } else if let Some(value) = field_value(line, "data") {
            self.data.push(value.to_string());
        }
        // Other fields (id, retry) carry nothing we use.
    }
}

fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    let value = rest.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}

/// Maps a dispatched frame onto a relay event. Unknown event names and
/// malformed payloads are logged and dropped.
pub fn decode_frame(frame: &SseFrame) -> Option<RelayEvent> {
    match frame.event.as_deref() {
        Some("progress_update") => match serde_json::from_str(&frame.data) {
            Ok(dto) => Some(RelayEvent::Progress(dto)),
            Err(err) => {
                client_warn!("dropping malformed progress_update: {err}");
                None
            }
        },
        Some("email_status_update") => match serde_json::from_str(&frame.data) {
            Ok(dto) => Some(RelayEvent::DeliveryStatus(dto)),
            Err(err) => {
                client_warn!("dropping malformed email_status_update: {err}");
                None
            }
        },
        Some(other) => {
            client_debug!("ignoring relay event '{other}'");
            None
        }
        None => None,
    }
}

/// The live subscription itself: connect, join, receive until the stream
/// drops. One pass; the caller decides whether a new relay is ever built.
pub struct EventRelay {
    http: reqwest::Client,
    url: Url,
}

impl EventRelay {
    pub fn new(api: &ApiClient, settings: &RelaySettings) -> Result<Self, ApiError> {
        let mut url = api
            .base_url()
            .join(&settings.events_path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        url.query_pairs_mut().append_pair("channel", &settings.channel);

        // The subscription must outlive any per-request timeout, so only the
        // connect phase is bounded.
        let http = reqwest::Client::builder()
            .connect_timeout(api.settings().connect_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(Self { http, url })
    }

    pub async fn run(&self, sink: &dyn EventSink) {
        let response = match self
            .http
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                sink.emit(RelayEvent::Disconnected {
                    reason: err.to_string(),
                });
                return;
            }
        };

        if !response.status().is_success() {
            sink.emit(RelayEvent::Disconnected {
                reason: format!("subscribe failed: http {}", response.status().as_u16()),
            });
            return;
        }

        sink.emit(RelayEvent::Connected);

        let mut parser = FrameParser::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for frame in parser.push(&bytes) {
                        if let Some(event) = decode_frame(&frame) {
                            sink.emit(event);
                        }
                    }
                }
                Err(err) => {
                    client_warn!("relay stream error: {err}");
                    sink.emit(RelayEvent::Disconnected {
                        reason: err.to_string(),
                    });
                    return;
                }
            }
        }

        sink.emit(RelayEvent::Disconnected {
            reason: "stream closed by server".to_string(),
        });
    }
}
