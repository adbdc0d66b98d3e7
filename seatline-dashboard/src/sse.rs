//! Server-sent change feed consumed by remote dashboards.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use seatline_core::{
    BroadcastNotifier, ChangeEvent, ChangeNotifier, ChangeSubscription, CHANGE_EVENT_NAME,
};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` decoder.
///
/// Chunks may split lines, frames and multi-byte characters anywhere;
/// bytes are only decoded once their line is complete.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(frame) = self.finish_frame() {
                    frames.push(frame);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        frames
    }

    fn finish_frame(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame { event, data })
    }
}

/// Decode a change frame; anything unreadable still means "re-fetch".
pub fn frame_to_event(frame: &SseFrame) -> Option<ChangeEvent> {
    if frame.event.as_deref() != Some(CHANGE_EVENT_NAME) {
        return None;
    }
    match serde_json::from_str(&frame.data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Unreadable change frame ({}), forcing resync", e);
            Some(ChangeEvent::resync())
        }
    }
}

/// [`ChangeNotifier`] fed by the API's `/v1/bookings/stream` endpoint.
///
/// The stream is re-opened after any disconnect. Every successful connect
/// emits a resync event, since changes may have been missed while it was down.
/// Publishing only reaches local subscribers; the server publishes its own
/// events.
pub struct SseChangeFeed {
    local: BroadcastNotifier,
    task: JoinHandle<()>,
}

impl SseChangeFeed {
    pub fn connect(base_url: impl Into<String>, capacity: usize) -> Self {
        let url = format!("{}/v1/bookings/stream", base_url.into().trim_end_matches('/'));
        let local = BroadcastNotifier::new(capacity);
        let task = tokio::spawn(relay(Client::new(), url, local.clone()));
        Self { local, task }
    }
}

impl Drop for SseChangeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl ChangeNotifier for SseChangeFeed {
    async fn publish(&self, event: ChangeEvent) {
        self.local.send(event);
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.local.subscribe()
    }
}

async fn relay(client: Client, url: String, local: BroadcastNotifier) {
    loop {
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Change stream connected: {}", url);
                local.send(ChangeEvent::resync());

                let mut parser = SseParser::new();
                let mut bytes = Box::pin(response.bytes_stream());
                while let Some(chunk) = bytes.next().await {
                    match chunk {
                        Ok(chunk) => {
                            for frame in parser.push(&chunk) {
                                if let Some(event) = frame_to_event(&frame) {
                                    debug!("Remote change {:?}", event.kind);
                                    local.send(event);
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Change stream interrupted: {}", e);
                            break;
                        }
                    }
                }
            }
            Ok(response) => warn!("Change stream refused: HTTP {}", response.status()),
            Err(e) => warn!("Change stream connect failed: {}", e),
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
