use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::gateway::{
  CustomerParty, DocumentState, DocumentStatusRecord, GatewayError, InvoiceDraft, InvoiceLine,
  InvoiceRecordStore, ServiceKind, TenantConfigSource,
};
use crate::infrastructure::qnb::QnbClient;

const DEFAULT_UNIT_CODE: &str = "C62";

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SendInvoiceLineDto {
  #[validate(length(min = 1))]
  pub name: String,
  pub quantity: Decimal,
  pub unit_code: Option<String>,
  pub unit_price: Decimal,
  pub vat_rate: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendInvoiceCustomerDto {
  #[validate(length(min = 1))]
  pub identifier: String,
  #[validate(length(min = 1))]
  pub name: String,
  pub street: Option<String>,
  pub district: Option<String>,
  pub city: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendInvoiceCommand {
  pub tenant_id: Uuid,
  pub invoice_id: Uuid,
  #[validate(nested)]
  pub customer: SendInvoiceCustomerDto,
  #[validate(length(min = 1), nested)]
  pub lines: Vec<SendInvoiceLineDto>,
  /// "EFATURA" | "EARSIV"; defaults to the e-Invoice service
  pub document_type: Option<String>,
  pub invoice_number: Option<String>,
  pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendInvoiceResponse {
  pub invoice_id: Uuid,
  pub document_number: String,
  pub ettn: Option<String>,
  pub pdf_url: Option<String>,
  pub service: ServiceKind,
}

pub struct SendInvoiceUseCase {
  records: Arc<dyn InvoiceRecordStore>,
  tenants: Arc<dyn TenantConfigSource>,
}

impl SendInvoiceUseCase {
  pub fn new(records: Arc<dyn InvoiceRecordStore>, tenants: Arc<dyn TenantConfigSource>) -> Self {
    Self { records, tenants }
  }

  pub async fn execute(
    &self,
    command: SendInvoiceCommand,
  ) -> Result<SendInvoiceResponse, GatewayError> {
    // Rejected before any network call
    command
      .validate()
      .map_err(|e| GatewayError::Validation(e.to_string()))?;

    let service = match &command.document_type {
      Some(kind) => ServiceKind::from_str(kind)?,
      None => ServiceKind::EInvoice,
    };

    let config = self.tenants.gateway_config(command.tenant_id).await?;

    let draft = InvoiceDraft {
      invoice_number: command.invoice_number,
      customer: CustomerParty {
        identifier: command.customer.identifier,
        name: command.customer.name,
        street: command.customer.street,
        district: command.customer.district,
        city: command.customer.city,
      },
      lines: command
        .lines
        .into_iter()
        .map(|line| {
          InvoiceLine::new(
            line.name,
            line.quantity,
            line.unit_code.unwrap_or_else(|| DEFAULT_UNIT_CODE.to_string()),
            line.unit_price,
            line.vat_rate,
          )
        })
        .collect(),
      note: command.note,
    };

    let client = QnbClient::new(config);
    let receipt = client.send_invoice(&draft, service).await?;

    let mut record = DocumentStatusRecord::new(
      command.invoice_id,
      receipt.document_number.clone(),
      service == ServiceKind::EArchive,
    );
    record.state = DocumentState::Sent;
    record.pdf_url = receipt.pdf_url.clone();
    record.ettn = receipt.ettn.clone();

    // The remote send already succeeded; a failed local write must not turn
    // the operation into a failure
    if let Err(e) = self.records.save(record).await {
      tracing::warn!(
        invoice_id = %command.invoice_id,
        error = %e,
        "invoice sent but record could not be stored"
      );
    }

    Ok(SendInvoiceResponse {
      invoice_id: command.invoice_id,
      document_number: receipt.document_number,
      ettn: receipt.ettn,
      pdf_url: receipt.pdf_url,
      service,
    })
  }
}
