use crate::client::ApiClient;
use crate::domain::endpoints_controller::{EndpointsController, SyncError};
use async_trait::async_trait;
use controller_macros::endpoints_controller;
use std::any::Any;
use tracing::{info, instrument};

pub const CONTROLLER_NAME: &str = "log";

/// Dry-run strategy that only reports the sync it was asked to perform.
#[derive(Debug)]
pub struct LogEndpointsController {
    base_url: String,
}

#[endpoints_controller("log")]
fn new_log_controller(client: &ApiClient) -> Box<dyn EndpointsController> {
    Box::new(LogEndpointsController {
        base_url: client.base_url().to_owned(),
    })
}

#[async_trait]
impl EndpointsController for LogEndpointsController {
    #[instrument(fields(controller = CONTROLLER_NAME), skip(self))]
    async fn sync_service_endpoints(&self) -> Result<(), SyncError> {
        info!("📝 Would sync service endpoints against '{}'", self.base_url);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
