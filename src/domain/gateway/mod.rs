pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  CustomerParty, DocumentStatusRecord, DraftTotals, InvoiceDraft, InvoiceLine, StatusReport,
  round2,
};
pub use errors::GatewayError;
pub use ports::{InvoiceRecordStore, TenantConfigSource};
pub use services::{classify, is_provisional, reconcile};
pub use value_objects::{
  DocumentState, GatewayConfig, ServiceKind, SessionToken, ValueObjectError,
};
