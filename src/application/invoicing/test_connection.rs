use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::gateway::{GatewayError, ServiceKind, TenantConfigSource};
use crate::infrastructure::qnb::QnbClient;

#[derive(Debug)]
pub struct TestConnectionCommand {
  pub tenant_id: Uuid,
  /// "EFATURA" | "EARSIV"
  pub service: String,
}

#[derive(Debug, Serialize)]
pub struct TestConnectionResponse {
  pub service: ServiceKind,
  pub session_id: String,
}

/// Exercises only the login step against the selected sub-service. Useful
/// for verifying tenant credentials without submitting anything.
pub struct TestConnectionUseCase {
  tenants: Arc<dyn TenantConfigSource>,
}

impl TestConnectionUseCase {
  pub fn new(tenants: Arc<dyn TenantConfigSource>) -> Self {
    Self { tenants }
  }

  pub async fn execute(
    &self,
    command: TestConnectionCommand,
  ) -> Result<TestConnectionResponse, GatewayError> {
    let service = ServiceKind::from_str(&command.service)?;
    let config = self.tenants.gateway_config(command.tenant_id).await?;

    let client = QnbClient::new(config);
    let token = client.login(service).await?;

    tracing::info!(service = %service, "gateway connection test succeeded");

    Ok(TestConnectionResponse {
      service,
      session_id: token.into_inner(),
    })
  }
}
