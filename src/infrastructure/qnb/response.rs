//! Tolerant parsing of gateway response bodies.
//!
//! The services answer with loosely-typed SOAP bodies whose element names
//! drift between operations and versions. Everything is extracted here into
//! intermediate types with named optional fields; business logic never
//! touches the raw text.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::domain::gateway::StatusReport;

lazy_static! {
  static ref URL_PATTERN: Regex = Regex::new(r#"https?://[^\s"<]+"#).unwrap();
  static ref FATURA_NO_PATTERN: Regex = Regex::new(r#"faturaNo["\s:]+([A-Z0-9-]+)"#).unwrap();
}

/// Extracts the text content of the first `<tag>` element, with or without a
/// namespace prefix. Nested markup inside the element is not matched.
pub fn extract_tag_content(xml: &str, tag: &str) -> Option<String> {
  let pattern = format!(
    r"(?i)<([a-z0-9]+:)?{tag}[^>]*>([^<]+)</([a-z0-9]+:)?{tag}>",
    tag = regex::escape(tag)
  );
  let regex = Regex::new(&pattern).ok()?;
  regex
    .captures(xml)
    .and_then(|caps| caps.get(2))
    .map(|m| m.as_str().to_string())
}

fn first_tag(xml: &str, tags: &[&str]) -> Option<String> {
  tags.iter().find_map(|tag| extract_tag_content(xml, tag))
}

/// Extracts a SOAP fault as "faultstring (detail)" when present.
pub fn extract_fault(xml: &str) -> Option<String> {
  let fault_string = extract_tag_content(xml, "faultstring")?;
  let detail =
    extract_tag_content(xml, "detail").or_else(|| extract_tag_content(xml, "message"));
  Some(match detail {
    Some(detail) => format!("{} ({})", fault_string, detail),
    None => fault_string,
  })
}

/// Parses a status-query response. Returns `None` when the body carries a
/// fault or exposes none of the status fields.
pub fn parse_status_report(body: &str) -> Option<StatusReport> {
  if extract_fault(body).is_some() {
    return None;
  }

  let status_text = first_tag(body, &["durum", "durumAciklamasi", "resultText"]);
  let ettn = first_tag(body, &["ettn", "faturaUuid"]);
  let mut artifact_url = first_tag(body, &["url", "faturaUrl", "pdfUrl"]);
  let canonical_number = extract_tag_content(body, "faturaNo");

  // The archive service may inline the rendered PDF instead of linking it
  if let Some(content) = extract_tag_content(body, "belgeIcerigi") {
    artifact_url = Some(format!("data:application/pdf;base64,{}", content));
  }

  let report = StatusReport {
    status_text,
    canonical_number,
    ettn,
    artifact_url,
    raw: body.to_string(),
  };

  if report.is_empty() { None } else { Some(report) }
}

/// Fields salvaged from an e-Archive creation response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveSendResult {
  pub fatura_no: Option<String>,
  pub ettn: Option<String>,
  pub url: Option<String>,
  pub result_code: Option<String>,
  pub result_text: Option<String>,
}

impl ArchiveSendResult {
  /// An explicit non-success result code is a gateway-level rejection even
  /// inside an HTTP 200 body.
  pub fn rejection(&self) -> Option<String> {
    match self.result_code.as_deref() {
      Some(code) if code != "AE00000" && code != "0" => Some(format!(
        "{}: {}",
        code,
        self.result_text.as_deref().unwrap_or("")
      )),
      _ => None,
    }
  }
}

/// Parses an e-Archive creation response. The interesting payload hides in
/// `<return>` as a JSON string; plain elements and regex sniffing cover the
/// variants that are not JSON.
pub fn parse_archive_send(body: &str) -> ArchiveSendResult {
  let mut result = ArchiveSendResult {
    fatura_no: extract_tag_content(body, "faturaNo"),
    ettn: first_tag(body, &["ettn", "faturaUuid"]),
    url: first_tag(body, &["url", "faturaUrl"]),
    result_code: extract_tag_content(body, "resultCode"),
    result_text: extract_tag_content(body, "resultText"),
  };

  if let Some(content) = extract_tag_content(body, "belgeIcerigi") {
    result.url = Some(format!("data:application/pdf;base64,{}", content));
  }

  if let Some(raw) = extract_tag_content(body, "return") {
    merge_return_payload(&mut result, &raw);
  }

  result
}

fn merge_return_payload(result: &mut ArchiveSendResult, raw: &str) {
  match serde_json::from_str::<Value>(raw) {
    Ok(payload) => {
      merge_str(&mut result.fatura_no, &payload, &["faturaNo", "belgeNo", "invoiceNo"]);
      merge_str(&mut result.url, &payload, &["url", "faturaUrl", "pdfUrl", "htmlUrl"]);
      merge_str(&mut result.ettn, &payload, &["ettn", "uuid"]);

      // Some responses nest a second JSON document inside resultExtra
      if let Some(extra_raw) = payload.get("resultExtra").and_then(Value::as_str) {
        if let Ok(extra) = serde_json::from_str::<Value>(extra_raw) {
          merge_str(&mut result.ettn, &extra, &["faturaOid"]);
          merge_str(&mut result.fatura_no, &extra, &["faturaNo"]);
        }
      }
    }
    Err(_) => {
      // Not JSON; sniff the text for a number and a link
      if result.fatura_no.is_none() {
        result.fatura_no = FATURA_NO_PATTERN
          .captures(raw)
          .and_then(|caps| caps.get(1))
          .map(|m| m.as_str().to_string());
      }
      if result.url.is_none() {
        result.url = URL_PATTERN.find(raw).map(|m| m.as_str().to_string());
      }
    }
  }
}

fn merge_str(slot: &mut Option<String>, payload: &Value, keys: &[&str]) {
  if slot.is_some() {
    return;
  }
  *slot = keys
    .iter()
    .find_map(|key| payload.get(key).and_then(Value::as_str))
    .map(str::to_string);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_handles_namespace_prefixes() {
    let xml = "<ns2:faturaNo>EAA2026000000001</ns2:faturaNo>";
    assert_eq!(
      extract_tag_content(xml, "faturaNo").as_deref(),
      Some("EAA2026000000001")
    );
    assert_eq!(
      extract_tag_content("<faturaNo>FT1</faturaNo>", "faturaNo").as_deref(),
      Some("FT1")
    );
    assert!(extract_tag_content(xml, "belgeNo").is_none());
  }

  #[test]
  fn test_extract_fault_combines_detail() {
    let xml = "<soap:Fault><faultstring>Oturum bulunamadı</faultstring><detail>SEC-401</detail></soap:Fault>";
    assert_eq!(
      extract_fault(xml).as_deref(),
      Some("Oturum bulunamadı (SEC-401)")
    );
    assert!(extract_fault("<ok>true</ok>").is_none());
  }

  #[test]
  fn test_status_report_field_fallbacks() {
    let body = "<durumAciklamasi>ONAYLANDI</durumAciklamasi><faturaUuid>abc-123</faturaUuid><faturaUrl>https://portal.example/doc.pdf</faturaUrl>";
    let report = parse_status_report(body).unwrap();
    assert_eq!(report.status_text.as_deref(), Some("ONAYLANDI"));
    assert_eq!(report.ettn.as_deref(), Some("abc-123"));
    assert_eq!(
      report.artifact_url.as_deref(),
      Some("https://portal.example/doc.pdf")
    );
    assert!(report.canonical_number.is_none());
  }

  #[test]
  fn test_status_report_none_when_nothing_extracted() {
    assert!(parse_status_report("<ok>true</ok>").is_none());
  }

  #[test]
  fn test_status_report_none_on_fault() {
    let body = "<faultstring>HATA</faultstring><durum>HATA</durum>";
    assert!(parse_status_report(body).is_none());
  }

  #[test]
  fn test_inline_pdf_becomes_data_url() {
    let body = "<durum>ONAYLANDI</durum><belgeIcerigi>JVBERi0xLjQ=</belgeIcerigi>";
    let report = parse_status_report(body).unwrap();
    assert_eq!(
      report.artifact_url.as_deref(),
      Some("data:application/pdf;base64,JVBERi0xLjQ=")
    );
  }

  #[test]
  fn test_archive_send_json_return() {
    let body = r#"<return>{"faturaNo":"EAA2026000000001","url":"https://portal.example/doc","ettn":"abc-123"}</return>"#;
    let result = parse_archive_send(body);
    assert_eq!(result.fatura_no.as_deref(), Some("EAA2026000000001"));
    assert_eq!(result.url.as_deref(), Some("https://portal.example/doc"));
    assert_eq!(result.ettn.as_deref(), Some("abc-123"));
    assert!(result.rejection().is_none());
  }

  #[test]
  fn test_archive_send_nested_result_extra() {
    let body = r#"<return>{"resultExtra":"{\"faturaOid\":\"oid-99\",\"faturaNo\":\"EAA2026000000002\"}"}</return>"#;
    let result = parse_archive_send(body);
    assert_eq!(result.ettn.as_deref(), Some("oid-99"));
    assert_eq!(result.fatura_no.as_deref(), Some("EAA2026000000002"));
  }

  #[test]
  fn test_archive_send_regex_fallback() {
    let body = r#"<return>faturaNo: EAA2026000000003 https://portal.example/view/3</return>"#;
    let result = parse_archive_send(body);
    assert_eq!(result.fatura_no.as_deref(), Some("EAA2026000000003"));
    assert_eq!(result.url.as_deref(), Some("https://portal.example/view/3"));
  }

  #[test]
  fn test_archive_send_result_code_gate() {
    let body = "<resultCode>AE00011</resultCode><resultText>Mükerrer fatura</resultText>";
    let result = parse_archive_send(body);
    assert_eq!(
      result.rejection().as_deref(),
      Some("AE00011: Mükerrer fatura")
    );

    let ok = parse_archive_send("<resultCode>AE00000</resultCode>");
    assert!(ok.rejection().is_none());
    let ok = parse_archive_send("<resultCode>0</resultCode>");
    assert!(ok.rejection().is_none());
  }
}
