//! UBL-TR 2.1 invoice document builder.
//!
//! Pure construction, no I/O. Two builds of the same draft are identical
//! except for the freshly generated ETTN and issue timestamp.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::gateway::{InvoiceDraft, ServiceKind, round2};

use super::envelopes::xml_escape;

/// Draft documents get a locally generated placeholder number until the
/// caller supplies a real one.
pub const DRAFT_NUMBER_PREFIX: &str = "TASLAK-";

// Fallback address used when the customer record carries no usable address.
// The gateway rejects party blocks with empty address elements.
const DEFAULT_STREET: &str = "İSTANBUL";
const DEFAULT_DISTRICT: &str = "ESENYURT";
const DEFAULT_CITY: &str = "İSTANBUL";
const COUNTRY_NAME: &str = "TÜRKİYE";

const CURRENCY_CODE: &str = "TRY";
const VAT_SCHEME_NAME: &str = "KDV";
const VAT_TYPE_CODE: &str = "0015";

/// A built document plus the identifiers the send path needs.
#[derive(Debug, Clone)]
pub struct UblInvoice {
  pub xml: String,
  pub document_id: String,
  pub ettn: Uuid,
}

fn profile_id(service: ServiceKind) -> &'static str {
  match service {
    ServiceKind::EInvoice => "TICARIFATURA",
    ServiceKind::EArchive => "EARSIVFATURA",
  }
}

// Currency-qualified amounts always carry exactly two decimals
fn amount(value: Decimal) -> String {
  format!("{:.2}", round2(value))
}

pub fn build_invoice_xml(
  draft: &InvoiceDraft,
  supplier_vkn: &str,
  service: ServiceKind,
) -> UblInvoice {
  let ettn = Uuid::new_v4();
  let now = Utc::now();
  let issue_date = now.format("%Y-%m-%d").to_string();
  let issue_time = now.format("%H:%M:%S").to_string();

  let document_id = draft
    .invoice_number
    .clone()
    .unwrap_or_else(|| format!("{}{}", DRAFT_NUMBER_PREFIX, &ettn.to_string()[..8]));

  let customer = &draft.customer;
  let customer_scheme = if customer.is_personal_id() { "TCKN" } else { "VKN" };
  let street = customer.street.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STREET);
  let district = customer
    .district
    .as_deref()
    .filter(|s| !s.is_empty())
    .unwrap_or(DEFAULT_DISTRICT);
  let city = customer.city.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_CITY);

  let totals = draft.totals();

  let mut xml = format!(
    r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
 xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
 xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"
 xmlns:ext="urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2">
    <cbc:UBLVersionID>2.1</cbc:UBLVersionID>
    <cbc:CustomizationID>TR1.2</cbc:CustomizationID>
    <cbc:ProfileID>{profile}</cbc:ProfileID>
    <cbc:ID>{id}</cbc:ID>
    <cbc:CopyIndicator>false</cbc:CopyIndicator>
    <cbc:UUID>{ettn}</cbc:UUID>
    <cbc:IssueDate>{date}</cbc:IssueDate>
    <cbc:IssueTime>{time}</cbc:IssueTime>
    <cbc:InvoiceTypeCode>SATIS</cbc:InvoiceTypeCode>
"#,
    profile = profile_id(service),
    id = xml_escape(&document_id),
    ettn = ettn,
    date = issue_date,
    time = issue_time,
  );

  if let Some(note) = draft.note.as_deref().filter(|n| !n.is_empty()) {
    xml.push_str(&format!("    <cbc:Note>{}</cbc:Note>\n", xml_escape(note)));
  }

  xml.push_str(&format!(
    r#"    <cbc:DocumentCurrencyCode>{currency}</cbc:DocumentCurrencyCode>
    <cbc:LineCountNumeric>{line_count}</cbc:LineCountNumeric>
    <cac:AccountingSupplierParty>
        <cac:Party>
            <cac:PartyIdentification>
                <cbc:ID schemeID="VKN">{supplier_vkn}</cbc:ID>
            </cac:PartyIdentification>
            <cac:PostalAddress>
                <cbc:CityName>{default_city}</cbc:CityName>
                <cac:Country>
                    <cbc:Name>{country}</cbc:Name>
                </cac:Country>
            </cac:PostalAddress>
            <cac:PartyTaxScheme>
                <cac:TaxScheme>
                    <cbc:Name>KURUMLAR VERGISI</cbc:Name>
                </cac:TaxScheme>
            </cac:PartyTaxScheme>
        </cac:Party>
    </cac:AccountingSupplierParty>
    <cac:AccountingCustomerParty>
        <cac:Party>
            <cac:PartyIdentification>
                <cbc:ID schemeID="{scheme}">{customer_id}</cbc:ID>
            </cac:PartyIdentification>
            <cac:PartyName>
                <cbc:Name>{customer_name}</cbc:Name>
            </cac:PartyName>
            <cac:PostalAddress>
                <cbc:StreetName>{street}</cbc:StreetName>
                <cbc:CitySubdivisionName>{district}</cbc:CitySubdivisionName>
                <cbc:CityName>{city}</cbc:CityName>
                <cac:Country>
                    <cbc:Name>{country}</cbc:Name>
                </cac:Country>
            </cac:PostalAddress>
        </cac:Party>
    </cac:AccountingCustomerParty>
    <cac:TaxTotal>
        <cbc:TaxAmount currencyID="{currency}">{total_vat}</cbc:TaxAmount>
        <cac:TaxSubtotal>
            <cbc:TaxableAmount currencyID="{currency}">{subtotal}</cbc:TaxableAmount>
            <cbc:TaxAmount currencyID="{currency}">{total_vat}</cbc:TaxAmount>
            <cac:TaxCategory>
                <cac:TaxScheme>
                    <cbc:Name>{vat_name}</cbc:Name>
                    <cbc:TaxTypeCode>{vat_code}</cbc:TaxTypeCode>
                </cac:TaxScheme>
            </cac:TaxCategory>
        </cac:TaxSubtotal>
    </cac:TaxTotal>
    <cac:LegalMonetaryTotal>
        <cbc:LineExtensionAmount currencyID="{currency}">{subtotal}</cbc:LineExtensionAmount>
        <cbc:TaxExclusiveAmount currencyID="{currency}">{subtotal}</cbc:TaxExclusiveAmount>
        <cbc:TaxInclusiveAmount currencyID="{currency}">{payable}</cbc:TaxInclusiveAmount>
        <cbc:AllowanceTotalAmount currencyID="{currency}">0.00</cbc:AllowanceTotalAmount>
        <cbc:PayableAmount currencyID="{currency}">{payable}</cbc:PayableAmount>
    </cac:LegalMonetaryTotal>
"#,
    currency = CURRENCY_CODE,
    line_count = draft.lines.len(),
    supplier_vkn = xml_escape(supplier_vkn),
    default_city = DEFAULT_CITY,
    country = COUNTRY_NAME,
    scheme = customer_scheme,
    customer_id = xml_escape(&customer.identifier),
    customer_name = xml_escape(&customer.name),
    street = xml_escape(street),
    district = xml_escape(district),
    city = xml_escape(city),
    total_vat = amount(totals.total_vat),
    subtotal = amount(totals.total_line_amount),
    payable = amount(totals.payable_amount),
    vat_name = VAT_SCHEME_NAME,
    vat_code = VAT_TYPE_CODE,
  ));

  for (index, line) in draft.lines.iter().enumerate() {
    xml.push_str(&format!(
      r#"    <cac:InvoiceLine>
        <cbc:ID>{id}</cbc:ID>
        <cbc:InvoicedQuantity unitCode="{unit}">{quantity}</cbc:InvoicedQuantity>
        <cbc:LineExtensionAmount currencyID="{currency}">{line_total}</cbc:LineExtensionAmount>
        <cac:TaxTotal>
            <cbc:TaxAmount currencyID="{currency}">{vat_amount}</cbc:TaxAmount>
            <cac:TaxSubtotal>
                <cbc:TaxableAmount currencyID="{currency}">{line_total}</cbc:TaxableAmount>
                <cbc:TaxAmount currencyID="{currency}">{vat_amount}</cbc:TaxAmount>
                <cbc:Percent>{vat_rate}</cbc:Percent>
                <cac:TaxCategory>
                    <cac:TaxScheme>
                        <cbc:Name>{vat_name}</cbc:Name>
                        <cbc:TaxTypeCode>{vat_code}</cbc:TaxTypeCode>
                    </cac:TaxScheme>
                </cac:TaxCategory>
            </cac:TaxSubtotal>
        </cac:TaxTotal>
        <cac:Item>
            <cbc:Name>{name}</cbc:Name>
        </cac:Item>
        <cac:Price>
            <cbc:PriceAmount currencyID="{currency}">{unit_price}</cbc:PriceAmount>
        </cac:Price>
    </cac:InvoiceLine>
"#,
      id = index + 1,
      unit = xml_escape(&line.unit_code),
      quantity = line.quantity,
      currency = CURRENCY_CODE,
      line_total = amount(line.line_total),
      vat_amount = amount(line.vat_amount),
      vat_rate = line.vat_rate,
      vat_name = VAT_SCHEME_NAME,
      vat_code = VAT_TYPE_CODE,
      name = xml_escape(&line.name),
      unit_price = amount(line.unit_price),
    ));
  }

  xml.push_str("</Invoice>");

  UblInvoice {
    xml,
    document_id,
    ettn,
  }
}
