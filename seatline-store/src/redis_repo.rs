use futures_util::Stream;
use redis::{AsyncCommands, RedisResult};
use std::pin::Pin;
use tracing::info;

pub type MsgStream = Pin<Box<dyn Stream<Item = redis::Msg> + Send>>;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    pub async fn publish(&self, channel: &str, payload: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.publish::<_, _, ()>(channel, payload).await
    }

    /// Open a dedicated pub/sub connection subscribed to `channel`.
    pub async fn subscribe(&self, channel: &str) -> RedisResult<MsgStream> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;
        info!("Subscribed to Redis channel {}", channel);
        Ok(Box::pin(pubsub.into_on_message()))
    }
}
