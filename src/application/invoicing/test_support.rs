//! Shared fakes for use-case tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::gateway::{
  DocumentStatusRecord, GatewayConfig, GatewayError, InvoiceRecordStore, TenantConfigSource,
};

/// Record store whose writes always fail; reads find nothing.
pub struct FailingRecordStore;

#[async_trait]
impl InvoiceRecordStore for FailingRecordStore {
  async fn find_by_invoice_id(
    &self,
    _invoice_id: Uuid,
  ) -> Result<Option<DocumentStatusRecord>, GatewayError> {
    Ok(None)
  }

  async fn save(&self, _record: DocumentStatusRecord) -> Result<(), GatewayError> {
    Err(GatewayError::Store("write failed".to_string()))
  }
}

/// In-memory record store keyed by invoice id.
#[derive(Default)]
pub struct MemoryRecordStore {
  records: Mutex<HashMap<Uuid, DocumentStatusRecord>>,
}

impl MemoryRecordStore {
  pub fn with_record(record: DocumentStatusRecord) -> Self {
    let store = Self::default();
    store
      .records
      .lock()
      .unwrap()
      .insert(record.invoice_id, record);
    store
  }

  pub fn get(&self, invoice_id: Uuid) -> Option<DocumentStatusRecord> {
    self.records.lock().unwrap().get(&invoice_id).cloned()
  }
}

#[async_trait]
impl InvoiceRecordStore for MemoryRecordStore {
  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Option<DocumentStatusRecord>, GatewayError> {
    Ok(self.records.lock().unwrap().get(&invoice_id).cloned())
  }

  async fn save(&self, record: DocumentStatusRecord) -> Result<(), GatewayError> {
    self
      .records
      .lock()
      .unwrap()
      .insert(record.invoice_id, record);
    Ok(())
  }
}

/// Tenant source with a fixed configuration, or none at all for tests that
/// must fail before configuration is ever resolved.
pub struct StaticTenants {
  config: Option<GatewayConfig>,
}

impl StaticTenants {
  pub fn new(config: GatewayConfig) -> Self {
    Self {
      config: Some(config),
    }
  }

  pub fn unreachable() -> Self {
    Self { config: None }
  }
}

#[async_trait]
impl TenantConfigSource for StaticTenants {
  async fn gateway_config(&self, _tenant_id: Uuid) -> Result<GatewayConfig, GatewayError> {
    match &self.config {
      Some(config) => Ok(config.clone()),
      None => panic!("tenant configuration must not be resolved in this test"),
    }
  }
}
