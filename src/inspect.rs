use base64::Engine;
use lopdf::{Document as LoDocument, Object as LoObject};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectErrorCode {
    DataUriMalformed,
    Base64Invalid,
    PdfParseFailed,
    PdfEmptyOrNoPages,
}

impl InspectErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectErrorCode::DataUriMalformed => "DATA_URI_MALFORMED",
            InspectErrorCode::Base64Invalid => "BASE64_INVALID",
            InspectErrorCode::PdfParseFailed => "PDF_PARSE_FAILED",
            InspectErrorCode::PdfEmptyOrNoPages => "PDF_EMPTY_OR_NO_PAGES",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .code.as_str(), .message)]
pub struct InspectError {
    pub code: InspectErrorCode,
    pub message: String,
}

impl InspectError {
    fn new(code: InspectErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub byte_size: usize,
    pub title: Option<String>,
}

/// Decodes a `data:application/pdf;...;base64,` URI back to PDF bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, InspectError> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| InspectError::new(InspectErrorCode::DataUriMalformed, "not a data uri"))?;
    let mut params = header.split(';');
    if params.next() != Some("application/pdf") {
        return Err(InspectError::new(
            InspectErrorCode::DataUriMalformed,
            format!("unexpected media type in {header:?}"),
        ));
    }
    if !params.any(|param| param == "base64") {
        return Err(InspectError::new(
            InspectErrorCode::DataUriMalformed,
            "payload is not base64",
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|err| InspectError::new(InspectErrorCode::Base64Invalid, err.to_string()))
}

pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<DocumentReport, InspectError> {
    let pdf = LoDocument::load_mem(bytes)
        .map_err(|err| InspectError::new(InspectErrorCode::PdfParseFailed, err.to_string()))?;
    let page_count = pdf.get_pages().len();
    if page_count == 0 {
        return Err(InspectError::new(
            InspectErrorCode::PdfEmptyOrNoPages,
            "pdf has no pages",
        ));
    }
    let title = pdf
        .trailer
        .get(b"Info")
        .and_then(|info| info.as_reference())
        .and_then(|id| pdf.get_dictionary(id))
        .and_then(|info| info.get(b"Title"))
        .ok()
        .and_then(|title| match title {
            LoObject::String(raw, _) => Some(String::from_utf8_lossy(raw).into_owned()),
            _ => None,
        });

    Ok(DocumentReport {
        pdf_version: pdf.version.clone(),
        page_count,
        encrypted: pdf.is_encrypted(),
        byte_size: bytes.len(),
        title,
    })
}

pub fn inspect_document(data_uri: &str) -> Result<DocumentReport, InspectError> {
    inspect_pdf_bytes(&decode_data_uri(data_uri)?)
}
