pub mod check_invoice_status;
pub mod send_invoice;
pub mod test_connection;

#[cfg(test)]
pub mod test_support;

pub use check_invoice_status::{
  CheckInvoiceStatusCommand, CheckInvoiceStatusResponse, CheckInvoiceStatusUseCase,
};
pub use send_invoice::{
  SendInvoiceCommand, SendInvoiceCustomerDto, SendInvoiceLineDto, SendInvoiceResponse,
  SendInvoiceUseCase,
};
pub use test_connection::{TestConnectionCommand, TestConnectionResponse, TestConnectionUseCase};
