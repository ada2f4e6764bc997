//! Gateway adapter for the QNB eSolutions e-Invoice / e-Archive services.

pub mod client;
pub mod envelopes;
pub mod response;
pub mod session;
pub mod ubl;

pub use client::{QnbClient, SendReceipt};
pub use session::SessionManager;
pub use ubl::{UblInvoice, build_invoice_xml};
