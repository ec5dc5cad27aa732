// Store trait for the plant/sensor configuration document
use crate::domain::session::Session;
use async_trait::async_trait;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the configured plants and sensors
    async fn load_session(&self) -> anyhow::Result<Session>;
}
