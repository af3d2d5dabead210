//! Output types returned by the pipeline.

use crate::error::{AtsError, ExportError};
use crate::model::{Document, InjectionStats};
use crate::pipeline::validate::ValidationReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complete result of one [`crate::optimize::run_pipeline`] call.
///
/// Serialises to JSON with the binary payloads as base64 strings
/// (`docx_base64`, `pdf_base64`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// The injected document the artifacts were rendered from.
    pub document: Document,

    /// Plain-text rendering of `document`.
    pub text: String,

    #[serde(rename = "docx_base64", with = "base64_bytes")]
    pub docx: Vec<u8>,

    #[serde(rename = "pdf_base64", with = "base64_bytes")]
    pub pdf: Vec<u8>,

    pub stats: InjectionStats,

    /// Keyword coverage of `text`.
    pub match_report: MatchReport,

    /// Score of the parsed résumé before injection, for comparison.
    pub original_score: u32,

    pub validation: ValidationReport,

    /// Wall time of the whole pipeline.
    pub timing_ms: f64,
}

impl PipelineOutput {
    /// Artifact bytes for `format`.
    pub fn bytes(&self, format: ExportFormat) -> &[u8] {
        match format {
            ExportFormat::Text => self.text.as_bytes(),
            ExportFormat::Docx => &self.docx,
            ExportFormat::Pdf => &self.pdf,
        }
    }

    /// Score gained through injection.
    pub fn score_delta(&self) -> i64 {
        i64::from(self.match_report.score) - i64::from(self.original_score)
    }
}

/// Which keywords a rendered text contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// `round(100 × matched / total)`, 0 when there are no keywords.
    pub score: u32,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

// ── Export formats ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Docx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Text, ExportFormat::Docx, ExportFormat::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "docx" | "word" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AtsError::InvalidConfig(format!(
                "unknown export format '{other}' (expected txt, docx or pdf)"
            ))),
        }
    }
}

/// Download-friendly file name: `Jane_Doe_Resume.pdf`, or `Resume.pdf`
/// when the document has no usable name.
pub fn suggested_filename(doc: &Document, format: ExportFormat) -> String {
    format!("{}.{}", suggested_stem(doc), format.extension())
}

/// [`suggested_filename`] without the extension.
pub fn suggested_stem(doc: &Document) -> String {
    let words: Vec<String> = doc
        .personal
        .name
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric() || *c == '-').collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        "Resume".to_string()
    } else {
        format!("{}_Resume", words.join("_"))
    }
}

/// One exported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub format: ExportFormat,
    pub file_name: String,
    #[serde(rename = "data_base64", with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Result of [`crate::optimize::export_formats`]: every artifact produced
/// before the first failure, and that failure if there was one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportReport {
    pub artifacts: Vec<Artifact>,
    pub failure: Option<ExportError>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn formats(&self) -> Vec<ExportFormat> {
        self.artifacts.iter().map(|a| a.format).collect()
    }

    /// All artifacts, or the recorded failure as [`AtsError::ExportFailed`].
    pub fn into_result(self) -> Result<Vec<Artifact>, AtsError> {
        match self.failure {
            Some(failure) => Err(failure.into()),
            None => Ok(self.artifacts),
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames() {
        let mut doc = Document::default();
        assert_eq!(suggested_filename(&doc, ExportFormat::Pdf), "Resume.pdf");

        doc.personal.name = "  Jane   Doe ".into();
        assert_eq!(suggested_filename(&doc, ExportFormat::Pdf), "Jane_Doe_Resume.pdf");

        doc.personal.name = "Mary-Kate O'Hara, PhD".into();
        assert_eq!(
            suggested_filename(&doc, ExportFormat::Docx),
            "Mary-Kate_OHara_PhD_Resume.docx"
        );
    }

    #[test]
    fn format_parsing_and_metadata() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(" docx ".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert!("rtf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(ExportFormat::Docx.to_string(), "docx");
    }

    #[test]
    fn artifact_json_uses_base64() {
        let artifact = Artifact {
            format: ExportFormat::Text,
            file_name: "Resume.txt".into(),
            bytes: b"hi".to_vec(),
        };
        let json = serde_json::to_string(&artifact).unwrap();
        assert_eq!(
            json,
            r#"{"format":"text","file_name":"Resume.txt","data_base64":"aGk="}"#
        );
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn report_completeness() {
        let mut report = ExportReport::default();
        assert!(report.is_complete());
        report.failure = Some(ExportError {
            format: "pdf".into(),
            detail: "boom".into(),
        });
        assert!(!report.is_complete());
        assert!(report.formats().is_empty());
        assert!(matches!(
            report.into_result(),
            Err(AtsError::ExportFailed { ref format, .. }) if format == "pdf"
        ));
    }
}
