use super::entities::{DocumentStatusRecord, StatusReport};
use super::value_objects::{DocumentState, ServiceKind};

/// Prefix of locally fabricated e-Archive numbers issued before the service
/// assigns a canonical one.
pub const PROVISIONAL_PREFIX: &str = "EP-";
/// Placeholder marker for archive submissions still awaiting numbering
pub const ARCHIVE_PENDING_PREFIX: &str = "EARSIV_PENDING";
const ARCHIVE_PREFIX: &str = "EARSIV";
// Canonical archive numbers issued by the service start with EAA
const ARCHIVE_NUMBER_PREFIX: &str = "EAA";
const ARCHIVE_NUMBER_LENGTH_THRESHOLD: usize = 15;

const FAILURE_MARKER: &str = "HATA";
const INVALID_MARKER: &str = "GEÇERSİZ";

/// Decides which sub-service owns a persisted document.
///
/// Precedence: the explicit e-archive flag wins; otherwise the stored number
/// is inspected for the provisional prefix, the archive-specific prefixes,
/// or a length beyond what e-Invoice numbering produces. The length rule is
/// best-effort: the remote numbering scheme is not authoritatively specified
/// and exotic numbers may be misclassified.
pub fn classify(record: &DocumentStatusRecord) -> ServiceKind {
  if record.is_e_archive {
    return ServiceKind::EArchive;
  }
  let number = record.document_number.as_str();
  if number.starts_with(PROVISIONAL_PREFIX)
    || number.starts_with(ARCHIVE_PREFIX)
    || number.starts_with(ARCHIVE_NUMBER_PREFIX)
    || number.len() > ARCHIVE_NUMBER_LENGTH_THRESHOLD
  {
    ServiceKind::EArchive
  } else {
    ServiceKind::EInvoice
  }
}

/// True for numbers this system fabricated while waiting for the service to
/// assign a canonical one.
pub fn is_provisional(number: &str) -> bool {
  number.starts_with(PROVISIONAL_PREFIX) || number.starts_with(ARCHIVE_PENDING_PREFIX)
}

/// Folds a fresh status response into the persisted record.
///
/// A status containing the failure or invalid marker maps to Failed;
/// anything else counts as Sent (confirmation is implied by absence of
/// failure after polling). An artifact URL always overwrites the stored one.
/// The document number upgrades only from provisional to canonical; a
/// canonical number is never replaced.
pub fn reconcile(mut record: DocumentStatusRecord, report: &StatusReport) -> DocumentStatusRecord {
  record.state = match &report.status_text {
    Some(status) if status.contains(FAILURE_MARKER) || status.contains(INVALID_MARKER) => {
      DocumentState::Failed
    }
    _ => DocumentState::Sent,
  };

  if let Some(url) = &report.artifact_url {
    record.pdf_url = Some(url.clone());
  }

  if let Some(ettn) = &report.ettn {
    if !ettn.is_empty() {
      record.ettn = Some(ettn.clone());
    }
  }

  if let Some(number) = &report.canonical_number {
    if is_provisional(&record.document_number) && !is_provisional(number) {
      record.document_number = number.clone();
    }
  }

  record
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn record(number: &str, is_e_archive: bool) -> DocumentStatusRecord {
    DocumentStatusRecord::new(Uuid::new_v4(), number, is_e_archive)
  }

  fn report(status: Option<&str>, number: Option<&str>) -> StatusReport {
    StatusReport {
      status_text: status.map(str::to_string),
      canonical_number: number.map(str::to_string),
      ..Default::default()
    }
  }

  #[test]
  fn test_explicit_flag_wins() {
    // The number alone would classify as e-Invoice
    assert_eq!(classify(&record("FT2026000001", true)), ServiceKind::EArchive);
  }

  #[test]
  fn test_classify_by_prefix() {
    assert_eq!(classify(&record("EP-0000000001", false)), ServiceKind::EArchive);
    assert_eq!(classify(&record("EARSIV_PENDING", false)), ServiceKind::EArchive);
    assert_eq!(classify(&record("EAA2026000000001", false)), ServiceKind::EArchive);
  }

  #[test]
  fn test_classify_by_length() {
    // 17 chars, no archive prefix
    assert_eq!(classify(&record("FT202600000000001", false)), ServiceKind::EArchive);
    assert_eq!(classify(&record("FT2026000001", false)), ServiceKind::EInvoice);
  }

  #[test]
  fn test_classify_is_deterministic() {
    let rec = record("FT2026000001", false);
    assert_eq!(classify(&rec), classify(&rec));
  }

  #[test]
  fn test_failure_marker_maps_to_failed() {
    let updated = reconcile(record("FT2026000001", false), &report(Some("HATA"), None));
    assert_eq!(updated.state, DocumentState::Failed);

    let updated = reconcile(
      record("FT2026000001", false),
      &report(Some("IMZA GEÇERSİZ"), None),
    );
    assert_eq!(updated.state, DocumentState::Failed);
  }

  #[test]
  fn test_absence_of_failure_means_sent() {
    let updated = reconcile(
      record("FT2026000001", false),
      &report(Some("ONAYLANDI"), None),
    );
    assert_eq!(updated.state, DocumentState::Sent);

    // No status text at all still counts as sent
    let updated = reconcile(record("FT2026000001", false), &report(None, None));
    assert_eq!(updated.state, DocumentState::Sent);
  }

  #[test]
  fn test_provisional_number_upgrades() {
    let updated = reconcile(
      record("EP-0000000001", true),
      &report(None, Some("EAA2026000000001")),
    );
    assert_eq!(updated.document_number, "EAA2026000000001");
  }

  #[test]
  fn test_canonical_number_never_downgrades() {
    let updated = reconcile(
      record("EAA2026000000001", true),
      &report(None, Some("EP-0000000002")),
    );
    assert_eq!(updated.document_number, "EAA2026000000001");

    // A second canonical number does not replace the first either
    let updated = reconcile(
      record("EAA2026000000001", true),
      &report(None, Some("EAA2026000000099")),
    );
    assert_eq!(updated.document_number, "EAA2026000000001");
  }

  #[test]
  fn test_pending_marker_upgrades() {
    let updated = reconcile(
      record("EARSIV_PENDING", true),
      &report(None, Some("EAA2026000000001")),
    );
    assert_eq!(updated.document_number, "EAA2026000000001");
  }

  #[test]
  fn test_artifact_url_overwrites() {
    let mut stored = record("EAA2026000000001", true);
    stored.pdf_url = Some("https://old.example/doc.pdf".to_string());
    let fresh = StatusReport {
      artifact_url: Some("https://new.example/doc.pdf".to_string()),
      ..Default::default()
    };
    let updated = reconcile(stored, &fresh);
    assert_eq!(updated.pdf_url.as_deref(), Some("https://new.example/doc.pdf"));
  }
}
