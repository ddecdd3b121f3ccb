use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::Source;

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint store error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("invalid checkpoint {value:?} stored under {key}")]
    Invalid { key: String, value: String },
}

/// Last fully synced block height per source.
///
/// A missing height means the source has never been synced.
#[async_trait::async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get_height(&self, source: &Source) -> Result<Option<u64>, CheckpointError>;
    async fn set_height(&self, source: &Source, height: u64) -> Result<(), CheckpointError>;
}

#[derive(Clone)]
pub struct RedisCheckpointStore {
    conn: MultiplexedConnection,
}

impl RedisCheckpointStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CheckpointError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;

        Ok(Self { conn })
    }

    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl CheckpointStore for RedisCheckpointStore {
    async fn get_height(&self, source: &Source) -> Result<Option<u64>, CheckpointError> {
        let key = source.checkpoint_key();
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(&key).await?;

        value
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| CheckpointError::Invalid { key, value })
            })
            .transpose()
    }

    async fn set_height(&self, source: &Source, height: u64) -> Result<(), CheckpointError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(source.checkpoint_key(), height).await?;

        Ok(())
    }
}
