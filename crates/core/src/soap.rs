//! HUD ARM SOAP envelopes and response parsing.
//!
//! Submissions carry the report document base64-encoded inside
//! `ser:submissionData`. Responses are read with an XML reader and matched
//! by local element name, so namespace prefixes chosen by the service do not
//! matter.

use armlink_domain::constants::{
    ARM_SERVICE_NAMESPACE, SOAP_ENV_NAMESPACE, SUBMISSION_DATA_ENCODING,
};
use armlink_domain::{ArmLinkError, IntegrationSettings, ReportKind, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

fn envelope(body: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{SOAP_ENV_NAMESPACE}\" xmlns:ser=\"{ARM_SERVICE_NAMESPACE}\">\
         <soapenv:Header></soapenv:Header><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"
    )
}

/// Base64 (standard alphabet, padded) of the UTF-8 document.
pub fn encode_payload(document: &str) -> String {
    STANDARD.encode(document.as_bytes())
}

/// Envelope for `postClientData` / `postForm9902Data`.
pub fn submission_envelope(
    kind: ReportKind,
    settings: &IntegrationSettings,
    fiscal_year_id: &str,
    document: &str,
) -> String {
    let op = kind.operation();
    envelope(&format!(
        "<ser:{op}><ser:submissionHeader6.0>\
         <ser:agcHcsId>{}</ser:agcHcsId>\
         <ser:agcName>{}</ser:agcName>\
         <ser:fiscalYearId>{}</ser:fiscalYearId>\
         <ser:cmsVendorId>{}</ser:cmsVendorId>\
         <ser:cmsPassword>{}</ser:cmsPassword>\
         </ser:submissionHeader6.0>\
         <ser:submissionDataEncoding>{SUBMISSION_DATA_ENCODING}</ser:submissionDataEncoding>\
         <ser:submissionData>{}</ser:submissionData></ser:{op}>",
        escape(settings.agency_id.as_str()),
        escape(settings.agency_name.as_str()),
        escape(fiscal_year_id),
        escape(settings.vendor_id.as_str()),
        escape(settings.cms_password.as_str()),
        encode_payload(document),
    ))
}

/// Envelope for `getSubmissionInfo`.
pub fn status_envelope(settings: &IntegrationSettings, submission_id: &str) -> String {
    envelope(&format!(
        "<ser:getSubmissionInfo><ser:agcHcsId>{}</ser:agcHcsId>\
         <ser:submissionId>{}</ser:submissionId></ser:getSubmissionInfo>",
        escape(settings.agency_id.as_str()),
        escape(submission_id),
    ))
}

/// Text of the first element whose local name is `name`.
fn element_text(body: &str, name: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(body);
    let mut capture: Option<String> = None;
    let mut depth = 0_usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            ArmLinkError::MalformedResponse(format!(
                "unreadable response at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(start) => {
                if capture.is_some() {
                    depth += 1;
                } else if start.local_name().as_ref() == name.as_bytes() {
                    capture = Some(String::new());
                    depth = 0;
                }
            }
            Event::Empty(start) if capture.is_none() && start.local_name().as_ref() == name.as_bytes() => {
                return Ok(Some(String::new()));
            }
            Event::Text(text) => {
                if let Some(buf) = capture.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| ArmLinkError::MalformedResponse(format!("bad text in <{name}>: {e}")))?;
                    buf.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(buf) = capture.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if capture.is_some() {
                    if depth == 0 {
                        return Ok(capture.map(|s| s.trim().to_string()));
                    }
                    depth -= 1;
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Extracts `submissionId` from a submission response.
pub fn parse_submission_id(body: &str) -> Result<String> {
    match element_text(body, "submissionId")? {
        Some(id) if !id.is_empty() => Ok(id),
        Some(_) => Err(ArmLinkError::MalformedResponse("submissionId is empty".to_string())),
        None => Err(ArmLinkError::MalformedResponse(
            "response does not contain a submissionId element".to_string(),
        )),
    }
}

/// Extracts `statusMessage` from a `getSubmissionInfo` response.
pub fn parse_status_message(body: &str) -> Result<String> {
    element_text(body, "statusMessage")?.ok_or_else(|| {
        ArmLinkError::MalformedResponse("response does not contain a statusMessage element".to_string())
    })
}
