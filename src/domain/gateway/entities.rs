use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::DocumentState;

/// Two-decimal rounding used for every currency-qualified amount.
/// Standard (midpoint away from zero) rounding, not truncation.
pub fn round2(amount: Decimal) -> Decimal {
  amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// Customer party on the invoice. The identifier is either a 10-digit VKN
// (legal entity) or an 11-digit TCKN (natural person).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerParty {
  pub identifier: String,
  pub name: String,
  pub street: Option<String>,
  pub district: Option<String>,
  pub city: Option<String>,
}

impl CustomerParty {
  pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      identifier: identifier.into(),
      name: name.into(),
      street: None,
      district: None,
      city: None,
    }
  }

  /// 11-digit identifiers belong to natural persons (TCKN scheme);
  /// everything else is treated as a VKN.
  pub fn is_personal_id(&self) -> bool {
    self.identifier.len() == 11
  }
}

// Single invoice line. Derived amounts are fixed at construction so the
// document builder never re-computes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
  pub name: String,
  pub quantity: Decimal,
  pub unit_code: String,
  pub unit_price: Decimal,
  pub vat_rate: Decimal,
  pub vat_amount: Decimal,
  pub line_total: Decimal,
}

impl InvoiceLine {
  pub fn new(
    name: impl Into<String>,
    quantity: Decimal,
    unit_code: impl Into<String>,
    unit_price: Decimal,
    vat_rate: Decimal,
  ) -> Self {
    let line_total = round2(quantity * unit_price);
    let vat_amount = round2(line_total * vat_rate / Decimal::ONE_HUNDRED);
    Self {
      name: name.into(),
      quantity,
      unit_code: unit_code.into(),
      unit_price,
      vat_rate,
      vat_amount,
      line_total,
    }
  }
}

/// Invoice payload as submitted by the caller, constructed per send request
/// and discarded after encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
  pub invoice_number: Option<String>,
  pub customer: CustomerParty,
  pub lines: Vec<InvoiceLine>,
  pub note: Option<String>,
}

impl InvoiceDraft {
  pub fn totals(&self) -> DraftTotals {
    DraftTotals::calculate(&self.lines)
  }
}

// Aggregates over the line sequence. Calculated, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTotals {
  pub total_line_amount: Decimal,
  pub total_vat: Decimal,
  pub payable_amount: Decimal,
}

impl DraftTotals {
  pub fn calculate(lines: &[InvoiceLine]) -> Self {
    let total_line_amount = round2(lines.iter().map(|line| line.line_total).sum());
    let total_vat = round2(lines.iter().map(|line| line.vat_amount).sum());
    let payable_amount = round2(total_line_amount + total_vat);
    Self {
      total_line_amount,
      total_vat,
      payable_amount,
    }
  }
}

/// Persisted view of a submitted document. Created at send time and mutated
/// only by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatusRecord {
  pub invoice_id: Uuid,
  /// Service-assigned document number, possibly provisional
  pub document_number: String,
  pub is_e_archive: bool,
  pub state: DocumentState,
  pub pdf_url: Option<String>,
  pub ettn: Option<String>,
}

impl DocumentStatusRecord {
  pub fn new(
    invoice_id: Uuid,
    document_number: impl Into<String>,
    is_e_archive: bool,
  ) -> Self {
    Self {
      invoice_id,
      document_number: document_number.into(),
      is_e_archive,
      state: DocumentState::Pending,
      pdf_url: None,
      ettn: None,
    }
  }
}

/// Intermediate view of a loosely-typed status response. Parsed once at the
/// transport boundary so business logic never branches on raw body text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusReport {
  pub status_text: Option<String>,
  pub canonical_number: Option<String>,
  pub ettn: Option<String>,
  pub artifact_url: Option<String>,
  pub raw: String,
}

impl StatusReport {
  pub fn is_empty(&self) -> bool {
    self.status_text.is_none() && self.canonical_number.is_none() && self.artifact_url.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_line_amounts_derived() {
    let line = InvoiceLine::new("Kahve", dec!(2), "C62", dec!(50.00), dec!(20));
    assert_eq!(line.line_total, dec!(100.00));
    assert_eq!(line.vat_amount, dec!(20.00));
  }

  #[test]
  fn test_totals_invariant() {
    let lines = vec![
      InvoiceLine::new("Kahve", dec!(2), "C62", dec!(50.00), dec!(20)),
      InvoiceLine::new("Poşet", dec!(3), "C62", dec!(0.25), dec!(10)),
    ];
    let totals = DraftTotals::calculate(&lines);
    assert_eq!(totals.total_line_amount, dec!(100.75));
    assert_eq!(totals.total_vat, dec!(20.08));
    assert_eq!(
      totals.payable_amount,
      round2(totals.total_line_amount + totals.total_vat)
    );
    assert_eq!(totals.payable_amount, dec!(120.83));
  }

  #[test]
  fn test_empty_lines_zero_totals() {
    let totals = DraftTotals::calculate(&[]);
    assert_eq!(totals.total_line_amount, Decimal::ZERO);
    assert_eq!(totals.total_vat, Decimal::ZERO);
    assert_eq!(totals.payable_amount, Decimal::ZERO);
  }

  #[test]
  fn test_rounding_is_midpoint_away_from_zero() {
    assert_eq!(round2(dec!(1.005)), dec!(1.01));
    assert_eq!(round2(dec!(1.004)), dec!(1.00));
  }

  #[test]
  fn test_personal_id_by_length() {
    assert!(CustomerParty::new("12345678901", "Ali Veli").is_personal_id());
    assert!(!CustomerParty::new("1234567890", "Firma A.Ş.").is_personal_id());
  }

  #[test]
  fn test_new_record_starts_pending() {
    let record = DocumentStatusRecord::new(Uuid::new_v4(), "EP-0000000001", true);
    assert_eq!(record.state, DocumentState::Pending);
    assert!(record.pdf_url.is_none());
  }
}
