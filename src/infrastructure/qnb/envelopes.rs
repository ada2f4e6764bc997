//! SOAP envelope composition, one pure function per remote operation.
//!
//! Every function is byte-stable for equal inputs: the envelopes are a wire
//! contract, not a formatting convenience. Values are inserted through
//! [`xml_escape`], with one deliberate exception: the e-Archive control
//! block is JSON-as-text and must reach the service unescaped (see
//! [`archive_control_json`]).

use serde::Serialize;

const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const EFATURA_LOGIN_NS: &str = "http://service.csap.cs.com.tr/";
const EARSIV_NS: &str = "http://service.earsiv.uut.cs.com.tr/";
const CONNECTOR_NS: &str = "http://service.connector.elenx.com.tr";
const WSSE_NS: &str =
  "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// Escapes text for use as XML element content or attribute value.
pub fn xml_escape(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for ch in value.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&apos;"),
      _ => escaped.push(ch),
    }
  }
  escaped
}

// Field order is the wire order; serde serializes in declaration order.
#[derive(Serialize)]
struct ArchiveControl<'a> {
  #[serde(rename = "islemId")]
  islem_id: &'a str,
  vkn: &'a str,
  sube: &'a str,
  kasa: &'a str,
  #[serde(rename = "donenBelgeFormati")]
  donen_belge_formati: &'a str,
  #[serde(rename = "erpKodu")]
  erp_kodu: &'a str,
  #[serde(rename = "numaraVerilsinMi")]
  numara_verilsin_mi: u8,
}

/// The e-Archive creation control block, inserted as RAW element text.
///
/// The target schema expects a JSON string inside the `<input>` element, so
/// this is the one value that bypasses [`xml_escape`] by protocol
/// requirement.
pub fn archive_control_json(islem_id: &str, vkn: &str, erp_code: &str) -> String {
  let control = ArchiveControl {
    islem_id,
    vkn,
    sube: "DFLT",
    kasa: "DFLT",
    donen_belge_formati: "2",
    erp_kodu: erp_code,
    numara_verilsin_mi: 1,
  };
  serde_json::to_string(&control).expect("control block serialization cannot fail")
}

/// Plain login for the e-Invoice connector service.
pub fn login(username: &str, password: &str) -> String {
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{EFATURA_LOGIN_NS}">
   <soapenv:Header/>
   <soapenv:Body>
      <ser:wsLogin>
         <userId>{user}</userId>
         <password>{pass}</password>
         <lang>tr</lang>
      </ser:wsLogin>
   </soapenv:Body>
</soapenv:Envelope>"#,
    user = xml_escape(username),
    pass = xml_escape(password),
  )
}

/// Plain login for the e-Archive service (same body, different namespace).
pub fn login_earsiv(username: &str, password: &str) -> String {
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{EARSIV_NS}">
   <soapenv:Header/>
   <soapenv:Body>
      <ser:wsLogin>
         <userId>{user}</userId>
         <password>{pass}</password>
         <lang>tr</lang>
      </ser:wsLogin>
   </soapenv:Body>
</soapenv:Envelope>"#,
    user = xml_escape(username),
    pass = xml_escape(password),
  )
}

/// Extended document send for the e-Invoice connector.
pub fn send_document_ext(
  vkn: &str,
  doc_type: &str,
  doc_no: &str,
  payload_b64: &str,
  doc_hash: &str,
  erp_code: &str,
) -> String {
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{CONNECTOR_NS}">
   <soapenv:Header/>
   <soapenv:Body>
      <ser:belgeGonderExt>
         <ser:vergiTcKimlikNo>{vkn}</ser:vergiTcKimlikNo>
         <ser:belgeTuru>{doc_type}</ser:belgeTuru>
         <ser:belgeNo>{doc_no}</ser:belgeNo>
         <ser:veri>{payload}</ser:veri>
         <ser:belgeHash>{hash}</ser:belgeHash>
         <ser:mimeType>application/xml</ser:mimeType>
         <ser:belgeVersiyon>1.0</ser:belgeVersiyon>
         <ser:erpKodu>{erp}</ser:erpKodu>
      </ser:belgeGonderExt>
   </soapenv:Body>
</soapenv:Envelope>"#,
    vkn = xml_escape(vkn),
    doc_type = xml_escape(doc_type),
    doc_no = xml_escape(doc_no),
    payload = payload_b64,
    hash = xml_escape(doc_hash),
    erp = xml_escape(erp_code),
  )
}

/// Extended outbound-document status query for the e-Invoice connector.
/// The number is always looked up as a local ("YEREL") number.
pub fn check_status_ext(vkn: &str, doc_no: &str, doc_type: &str) -> String {
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{CONNECTOR_NS}">
   <soapenv:Header/>
   <soapenv:Body>
      <ser:gidenBelgeDurumSorgulaExt>
         <ser:vergiTcKimlikNo>{vkn}</ser:vergiTcKimlikNo>
         <ser:belgeNo>{doc_no}</ser:belgeNo>
         <ser:belgeNoTip>YEREL</ser:belgeNoTip>
         <ser:belgeTuru>{doc_type}</ser:belgeTuru>
      </ser:gidenBelgeDurumSorgulaExt>
   </soapenv:Body>
</soapenv:Envelope>"#,
    vkn = xml_escape(vkn),
    doc_no = xml_escape(doc_no),
    doc_type = xml_escape(doc_type),
  )
}

/// e-Archive invoice creation. Authenticates inline through a WS-Security
/// UsernameToken header instead of a prior login; the credentials are a
/// plaintext passthrough on this hop.
pub fn create_archive_invoice_ext(
  payload_b64: &str,
  vkn: &str,
  erp_code: &str,
  username: &str,
  password: &str,
  islem_id: &str,
) -> String {
  let control = archive_control_json(islem_id, vkn, erp_code);
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{EARSIV_NS}" xmlns:wsse="{WSSE_NS}">
   <soapenv:Header>
      <wsse:Security>
         <wsse:UsernameToken>
            <wsse:Username>{user}</wsse:Username>
            <wsse:Password>{pass}</wsse:Password>
         </wsse:UsernameToken>
      </wsse:Security>
   </soapenv:Header>
   <soapenv:Body>
      <ser:faturaOlusturExt>
         <input>{control}</input>
         <fatura>
            <belgeFormati>UBL</belgeFormati>
            <belgeIcerigi>{payload}</belgeIcerigi>
         </fatura>
      </ser:faturaOlusturExt>
   </soapenv:Body>
</soapenv:Envelope>"#,
    user = xml_escape(username),
    pass = xml_escape(password),
    control = control,
    payload = payload_b64,
  )
}

/// e-Archive status lookup by invoice number.
pub fn archive_status_by_number(vkn: &str, fatura_no: &str) -> String {
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{EARSIV_NS}">
   <soapenv:Header/>
   <soapenv:Body>
      <ser:faturaSorgula>
         <vknTckn>{vkn}</vknTckn>
         <faturaNo>{fatura_no}</faturaNo>
      </ser:faturaSorgula>
   </soapenv:Body>
</soapenv:Envelope>"#,
    vkn = xml_escape(vkn),
    fatura_no = xml_escape(fatura_no),
  )
}

/// e-Archive status lookup by the document's unique transaction id.
pub fn archive_status_by_ettn(vkn: &str, ettn: &str) -> String {
  format!(
    r#"<soapenv:Envelope xmlns:soapenv="{SOAP_NS}" xmlns:ser="{EARSIV_NS}">
   <soapenv:Header/>
   <soapenv:Body>
      <ser:faturaSorgula>
         <vknTckn>{vkn}</vknTckn>
         <ettn>{ettn}</ettn>
      </ser:faturaSorgula>
   </soapenv:Body>
</soapenv:Envelope>"#,
    vkn = xml_escape(vkn),
    ettn = xml_escape(ettn),
  )
}
