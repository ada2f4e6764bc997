use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid service kind: {0}")]
  InvalidServiceKind(String),
  #[error("Invalid document state: {0}")]
  InvalidDocumentState(String),
}

// Gateway sub-service selector. EFATURA is the real-time registered-taxpayer
// exchange, EARSIV the deferred archive service for everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
  EInvoice,
  EArchive,
}

impl ServiceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ServiceKind::EInvoice => "EFATURA",
      ServiceKind::EArchive => "EARSIV",
    }
  }
}

impl fmt::Display for ServiceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for ServiceKind {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "EFATURA" => Ok(ServiceKind::EInvoice),
      "EARSIV" => Ok(ServiceKind::EArchive),
      _ => Err(ValueObjectError::InvalidServiceKind(s.to_string())),
    }
  }
}

// Local lifecycle state of a submitted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
  Pending,
  Sent,
  Failed,
}

impl DocumentState {
  pub fn as_str(&self) -> &'static str {
    match self {
      DocumentState::Pending => "pending",
      DocumentState::Sent => "sent",
      DocumentState::Failed => "failed",
    }
  }
}

impl FromStr for DocumentState {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "pending" => Ok(DocumentState::Pending),
      "sent" => Ok(DocumentState::Sent),
      "failed" => Ok(DocumentState::Failed),
      _ => Err(ValueObjectError::InvalidDocumentState(s.to_string())),
    }
  }
}

const EFATURA_TEST_BASE: &str = "https://erpefaturatest1.qnbesolutions.com.tr";
const EFATURA_PROD_BASE: &str = "https://erpefatura.qnbesolutions.com.tr";
const EARSIV_TEST_BASE: &str = "https://portaltest.qnbesolutions.com.tr";
const EARSIV_PROD_BASE: &str = "https://portal.qnbesolutions.com.tr";

const EFATURA_SERVICE_PATH: &str = "/efatura/ws/connectorService";
const EARSIV_SERVICE_PATH: &str = "/earsiv/ws/EarsivWebService";

/// Tenant-scoped gateway settings. Passed by value into every operation;
/// never held as shared mutable state.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
  /// Tax identifier of the issuing legal entity
  pub vkn: String,
  pub erp_code: String,
  pub efatura_username: String,
  pub efatura_password: String,
  pub earsiv_username: String,
  pub earsiv_password: String,
  #[serde(default = "default_is_test")]
  pub is_test: bool,
  /// Explicit overrides for non-standard deployments
  #[serde(default)]
  pub base_url: Option<String>,
  #[serde(default)]
  pub earsiv_base_url: Option<String>,
}

fn default_is_test() -> bool {
  true
}

impl GatewayConfig {
  fn efatura_base(&self) -> &str {
    match &self.base_url {
      Some(url) => url,
      None if self.is_test => EFATURA_TEST_BASE,
      None => EFATURA_PROD_BASE,
    }
  }

  fn earsiv_base(&self) -> &str {
    match &self.earsiv_base_url {
      Some(url) => url,
      None if self.is_test => EARSIV_TEST_BASE,
      None => EARSIV_PROD_BASE,
    }
  }

  pub fn endpoint(&self, service: ServiceKind) -> String {
    match service {
      ServiceKind::EInvoice => format!("{}{}", self.efatura_base(), EFATURA_SERVICE_PATH),
      ServiceKind::EArchive => format!("{}{}", self.earsiv_base(), EARSIV_SERVICE_PATH),
    }
  }

  pub fn credentials(&self, service: ServiceKind) -> (&str, &str) {
    match service {
      ServiceKind::EInvoice => (&self.efatura_username, &self.efatura_password),
      ServiceKind::EArchive => (&self.earsiv_username, &self.earsiv_password),
    }
  }
}

/// Opaque session identifier returned by the login handshake.
/// Valid for one subsequent operation unless the caller reuses it
/// within the same logical transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
  pub fn new(value: String) -> Self {
    Self(value)
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(is_test: bool) -> GatewayConfig {
    GatewayConfig {
      vkn: "1234567890".to_string(),
      erp_code: "ERP01".to_string(),
      efatura_username: "1234567890".to_string(),
      efatura_password: "secret".to_string(),
      earsiv_username: "arsiv_user".to_string(),
      earsiv_password: "secret".to_string(),
      is_test,
      base_url: None,
      earsiv_base_url: None,
    }
  }

  #[test]
  fn test_service_kind_roundtrip() {
    assert_eq!("EFATURA".parse::<ServiceKind>().unwrap(), ServiceKind::EInvoice);
    assert_eq!("earsiv".parse::<ServiceKind>().unwrap(), ServiceKind::EArchive);
    assert!("EIRSALIYE".parse::<ServiceKind>().is_err());
  }

  #[test]
  fn test_endpoints_follow_test_flag() {
    let test = config(true);
    assert_eq!(
      test.endpoint(ServiceKind::EInvoice),
      "https://erpefaturatest1.qnbesolutions.com.tr/efatura/ws/connectorService"
    );
    assert_eq!(
      test.endpoint(ServiceKind::EArchive),
      "https://portaltest.qnbesolutions.com.tr/earsiv/ws/EarsivWebService"
    );

    let prod = config(false);
    assert_eq!(
      prod.endpoint(ServiceKind::EInvoice),
      "https://erpefatura.qnbesolutions.com.tr/efatura/ws/connectorService"
    );
  }

  #[test]
  fn test_base_url_override_wins() {
    let mut cfg = config(true);
    cfg.base_url = Some("https://gateway.example.test".to_string());
    assert_eq!(
      cfg.endpoint(ServiceKind::EInvoice),
      "https://gateway.example.test/efatura/ws/connectorService"
    );
  }

  #[test]
  fn test_credentials_per_service() {
    let cfg = config(true);
    assert_eq!(cfg.credentials(ServiceKind::EInvoice).0, "1234567890");
    assert_eq!(cfg.credentials(ServiceKind::EArchive).0, "arsiv_user");
  }
}
