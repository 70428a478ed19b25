use async_trait::async_trait;
use std::any::Any;
use std::fmt::Debug;
use thiserror::Error;

/// An `EndpointsController` knows how to update the service endpoints of a client
/// for one networking strategy (e.g. one ip per pod).
#[async_trait]
pub trait EndpointsController: Debug + Send + Sync {
    /// Updates the service endpoints of the client the controller was created with.
    async fn sync_service_endpoints(&self) -> Result<(), SyncError>;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("{0}")]
    Failed(String),
}
