use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use seatline_core::{BroadcastNotifier, ChangeEvent, ChangeNotifier, ChangeSubscription};

use crate::redis_repo::{MsgStream, RedisClient};

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

/// Change notifier shared by every API instance through a Redis channel.
///
/// `publish` sends to Redis; a background relay forwards whatever arrives on
/// the channel to local subscribers, including this instance's own events.
/// Dropping the feed stops the relay.
pub struct RedisChangeFeed {
    redis: RedisClient,
    channel: String,
    local: BroadcastNotifier,
    relay: JoinHandle<()>,
}

impl RedisChangeFeed {
    pub async fn start(
        redis: RedisClient,
        channel: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, redis::RedisError> {
        let channel = channel.into();
        let local = BroadcastNotifier::new(capacity);

        // Fail fast if Redis is unreachable at startup
        let stream = redis.subscribe(&channel).await?;
        let task = tokio::spawn(relay(redis.clone(), channel.clone(), local.clone(), stream));

        Ok(Self {
            redis,
            channel,
            local,
            relay: task,
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Drop for RedisChangeFeed {
    fn drop(&mut self) {
        self.relay.abort();
    }
}

#[async_trait]
impl ChangeNotifier for RedisChangeFeed {
    async fn publish(&self, event: ChangeEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to encode change event: {}", e);
                return;
            }
        };

        if let Err(e) = self.redis.publish(&self.channel, &payload).await {
            // Local viewers still hear about it
            error!("Failed to publish change to {}: {}", self.channel, e);
            self.local.send(event);
        }
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.local.subscribe()
    }
}

async fn relay(redis: RedisClient, channel: String, local: BroadcastNotifier, mut stream: MsgStream) {
    loop {
        while let Some(msg) = stream.next().await {
            let event = match msg.get_payload::<String>() {
                Ok(payload) => decode_event(&payload),
                Err(e) => {
                    warn!("Unreadable message on {}: {}", channel, e);
                    ChangeEvent::resync()
                }
            };
            debug!("Relaying {:?} from {}", event.kind, channel);
            local.send(event);
        }

        warn!("Redis change feed on {} ended, resubscribing", channel);
        loop {
            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            match redis.subscribe(&channel).await {
                Ok(fresh) => {
                    stream = fresh;
                    break;
                }
                Err(e) => error!("Resubscribe to {} failed: {}", channel, e),
            }
        }
        // Anything published while disconnected was missed
        info!("Redis change feed on {} restored", channel);
        local.send(ChangeEvent::resync());
    }
}

/// Any message on the channel means "something changed"; a payload that does
/// not decode still triggers a re-fetch.
fn decode_event(payload: &str) -> ChangeEvent {
    serde_json::from_str(payload).unwrap_or_else(|_| ChangeEvent::resync())
}
