use reqwest::header::{CONTENT_TYPE, SET_COOKIE};

use crate::domain::gateway::{GatewayConfig, GatewayError, ServiceKind, SessionToken};

use super::envelopes;
use super::response::{extract_fault, extract_tag_content};

// A <return> value long enough to be a server-side session id rather than a
// boolean flag
const MIN_SESSION_ID_LENGTH: usize = 10;

/// Performs the login handshake against one of the two sub-services.
///
/// Owns no state beyond the in-flight call: every login is a fresh
/// handshake, and the returned token is the caller's to reuse or discard.
pub struct SessionManager {
  http: reqwest::Client,
}

impl SessionManager {
  pub fn new(http: reqwest::Client) -> Self {
    Self { http }
  }

  pub async fn login(
    &self,
    service: ServiceKind,
    config: &GatewayConfig,
  ) -> Result<SessionToken, GatewayError> {
    let (username, password) = config.credentials(service);
    let envelope = match service {
      ServiceKind::EInvoice => envelopes::login(username, password),
      ServiceKind::EArchive => envelopes::login_earsiv(username, password),
    };
    let endpoint = config.endpoint(service);

    tracing::debug!(service = %service, endpoint = %endpoint, "gateway login");

    let response = self
      .http
      .post(&endpoint)
      .header(CONTENT_TYPE, "text/xml;charset=UTF-8")
      .header("SOAPAction", "\"\"")
      .body(envelope)
      .send()
      .await
      .map_err(|e| GatewayError::Transport(format!("Login request failed: {}", e)))?;

    // The session arrives as the first cookie pair, when it arrives at all
    let session_cookie = response
      .headers()
      .get(SET_COOKIE)
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.split(';').next())
      .map(str::to_string)
      .filter(|cookie| !cookie.is_empty());

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| GatewayError::Transport(format!("Login response unreadable: {}", e)))?;

    if let Some(fault) = extract_fault(&body) {
      tracing::warn!(service = %service, fault = %fault, "login rejected");
      return Err(GatewayError::Auth(fault));
    }

    if !status.is_success() {
      return Err(GatewayError::Transport(format!(
        "Login returned HTTP {}: {}",
        status, body
      )));
    }

    let return_value = extract_tag_content(&body, "return");

    if let Some(cookie) = session_cookie {
      return Ok(SessionToken::new(cookie));
    }
    match return_value.as_deref() {
      // Some deployments confirm the login without echoing a cookie; the
      // service then authenticates the follow-up call on its own
      Some("true") => Ok(SessionToken::new("SESSION_ESTABLISHED".to_string())),
      Some(value) if value.len() > MIN_SESSION_ID_LENGTH => {
        Ok(SessionToken::new(format!("JSESSIONID={}", value)))
      }
      _ => Err(GatewayError::Auth(
        "Login response carried no session identifier".to_string(),
      )),
    }
  }
}
