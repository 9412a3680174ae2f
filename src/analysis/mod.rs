//! Image intake: storage plus a pluggable "analysis" step.
//!
//! No image content is inspected. [`CannedAnalyzer`] answers every upload with
//! the same localized text; a real model can be swapped in behind
//! [`ImageAnalyzer`] without touching the handlers.

pub mod storage;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::i18n::Locale;

pub use storage::ImageStore;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("image is empty")]
    EmptyImage,
    #[error("image is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("failed to store image: {0}")]
    Storage(#[from] std::io::Error),
}

/// An uploaded image as received, before any processing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied name, used only to pick a file extension.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

pub trait ImageAnalyzer: Send + Sync {
    fn analyze(&self, image: &ImageUpload, locale: Locale) -> Result<String, AnalysisError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CannedAnalyzer;

impl CannedAnalyzer {
    pub fn canned_text(locale: Locale) -> &'static str {
        match locale {
            Locale::En => {
                "The plant looks healthy. No signs of disease or pests were detected. \
                 Keep monitoring humidity and watering regularly."
            }
            Locale::Es => {
                "La planta se ve saludable. No se detectaron signos de enfermedades ni plagas. \
                 Siga controlando la humedad y riegue con regularidad."
            }
        }
    }
}

impl ImageAnalyzer for CannedAnalyzer {
    fn analyze(&self, image: &ImageUpload, locale: Locale) -> Result<String, AnalysisError> {
        if image.bytes.is_empty() {
            return Err(AnalysisError::EmptyImage);
        }
        Ok(Self::canned_text(locale).to_owned())
    }
}

/// Decodes a standard-alphabet base64 image, tolerating a `data:<mime>;base64,`
/// prefix and embedded whitespace.
pub fn decode_base64_image(input: &str) -> Result<Vec<u8>, AnalysisError> {
    let data = match input.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => input,
    };
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    if bytes.is_empty() {
        return Err(AnalysisError::EmptyImage);
    }
    Ok(bytes)
}
