use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::gateway::{
  DocumentState, GatewayError, InvoiceRecordStore, ServiceKind, TenantConfigSource, classify,
  reconcile,
};
use crate::infrastructure::qnb::QnbClient;

#[derive(Debug)]
pub struct CheckInvoiceStatusCommand {
  pub tenant_id: Uuid,
  pub invoice_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CheckInvoiceStatusResponse {
  pub invoice_id: Uuid,
  pub service: ServiceKind,
  pub state: DocumentState,
  pub document_number: String,
  pub pdf_url: Option<String>,
  pub ettn: Option<String>,
  /// False when the gateway exposed nothing usable and the stored state is
  /// reported unchanged
  pub refreshed: bool,
}

pub struct CheckInvoiceStatusUseCase {
  records: Arc<dyn InvoiceRecordStore>,
  tenants: Arc<dyn TenantConfigSource>,
}

impl CheckInvoiceStatusUseCase {
  pub fn new(records: Arc<dyn InvoiceRecordStore>, tenants: Arc<dyn TenantConfigSource>) -> Self {
    Self { records, tenants }
  }

  pub async fn execute(
    &self,
    command: CheckInvoiceStatusCommand,
  ) -> Result<CheckInvoiceStatusResponse, GatewayError> {
    let record = self
      .records
      .find_by_invoice_id(command.invoice_id)
      .await?
      .ok_or(GatewayError::RecordNotFound(command.invoice_id))?;

    // Re-derive the owning sub-service from the stored record; the
    // service assignment at send time may have been provisional
    let service = classify(&record);
    let config = self.tenants.gateway_config(command.tenant_id).await?;
    let client = QnbClient::new(config);

    let report = client
      .document_status(&record.document_number, service, record.ettn.as_deref())
      .await?;

    let (record, refreshed) = match report {
      Some(report) => {
        let updated = reconcile(record, &report);
        if let Err(e) = self.records.save(updated.clone()).await {
          tracing::warn!(
            invoice_id = %command.invoice_id,
            error = %e,
            "reconciled state could not be stored"
          );
        }
        (updated, true)
      }
      None => {
        tracing::debug!(invoice_id = %command.invoice_id, "status query exposed nothing new");
        (record, false)
      }
    };

    Ok(CheckInvoiceStatusResponse {
      invoice_id: command.invoice_id,
      service,
      state: record.state,
      document_number: record.document_number,
      pdf_url: record.pdf_url,
      ettn: record.ettn,
      refreshed,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::invoicing::test_support::{MemoryRecordStore, StaticTenants};

  #[tokio::test]
  async fn test_unknown_invoice_yields_record_not_found() {
    let use_case = CheckInvoiceStatusUseCase::new(
      Arc::new(MemoryRecordStore::default()),
      Arc::new(StaticTenants::unreachable()),
    );

    let invoice_id = Uuid::new_v4();
    let result = use_case
      .execute(CheckInvoiceStatusCommand {
        tenant_id: Uuid::new_v4(),
        invoice_id,
      })
      .await;

    match result {
      Err(GatewayError::RecordNotFound(id)) => assert_eq!(id, invoice_id),
      other => panic!("Expected RecordNotFound, got {:?}", other.map(|_| ())),
    }
  }
}
