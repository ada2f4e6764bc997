use async_trait::async_trait;
use uuid::Uuid;

use super::entities::DocumentStatusRecord;
use super::errors::GatewayError;
use super::value_objects::GatewayConfig;

/// Persistence collaborator for submitted-document records. Implemented by
/// the surrounding application; this crate only reads and writes through it.
#[async_trait]
pub trait InvoiceRecordStore: Send + Sync {
  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Option<DocumentStatusRecord>, GatewayError>;
  async fn save(&self, record: DocumentStatusRecord) -> Result<(), GatewayError>;
}

/// Tenant-configuration collaborator. Resolves the gateway settings for a
/// tenant; the returned value is owned by the caller for the duration of one
/// operation.
#[async_trait]
pub trait TenantConfigSource: Send + Sync {
  async fn gateway_config(&self, tenant_id: Uuid) -> Result<GatewayConfig, GatewayError>;
}
