//! Inline-content extractors (documents and prior AI analyses)
//!
//! `rawContent` is treated as already-extracted text. PDF and DOCX go through
//! a `DocumentDecoder` so a real binary parser can be plugged in; the default
//! decoder passes the text through.

use super::ContentExtractor;
use crate::types::{PipelineError, Source, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Decoder for one binary document format
pub trait DocumentDecoder: Send + Sync {
    fn decode(&self, source: &Source) -> Result<String, PipelineError>;
}

/// Returns `rawContent` unchanged (empty when absent)
pub struct PassthroughDecoder;

impl DocumentDecoder for PassthroughDecoder {
    fn decode(&self, source: &Source) -> Result<String, PipelineError> {
        Ok(source.raw_content.clone().unwrap_or_default())
    }
}

/// document-text / document-pdf / document-docx
pub struct DocumentExtractor {
    pdf: Arc<dyn DocumentDecoder>,
    docx: Arc<dyn DocumentDecoder>,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::with_decoders(Arc::new(PassthroughDecoder), Arc::new(PassthroughDecoder))
    }

    pub fn with_decoders(pdf: Arc<dyn DocumentDecoder>, docx: Arc<dyn DocumentDecoder>) -> Self {
        Self { pdf, docx }
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for DocumentExtractor {
    fn name(&self) -> &'static str {
        "documents"
    }

    async fn extract(&self, source: &Source) -> Result<String, PipelineError> {
        match source.kind {
            SourceKind::DocumentPdf => self.pdf.decode(source),
            SourceKind::DocumentDocx => self.docx.decode(source),
            _ => Ok(source.raw_content.clone().unwrap_or_default()),
        }
    }
}

/// prior-ai-analysis: content passes through unchanged
pub struct PriorAnalysisExtractor;

#[async_trait]
impl ContentExtractor for PriorAnalysisExtractor {
    fn name(&self) -> &'static str {
        "prior-analysis"
    }

    async fn extract(&self, source: &Source) -> Result<String, PipelineError> {
        Ok(source.raw_content.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseDecoder;

    impl DocumentDecoder for UppercaseDecoder {
        fn decode(&self, source: &Source) -> Result<String, PipelineError> {
            Ok(source.raw_content.clone().unwrap_or_default().to_uppercase())
        }
    }

    struct RejectingDecoder;

    impl DocumentDecoder for RejectingDecoder {
        fn decode(&self, source: &Source) -> Result<String, PipelineError> {
            Err(PipelineError::SourceProcessingFailed {
                source_id: source.id.clone(),
                reason: "corrupt docx".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_text_passthrough() {
        let source = Source::inline("s1", SourceKind::DocumentText, "Memo", "clause 4.2");
        let text = DocumentExtractor::new().extract(&source).await.unwrap();
        assert_eq!(text, "clause 4.2");
    }

    #[tokio::test]
    async fn test_custom_decoders_selected_by_kind() {
        let extractor =
            DocumentExtractor::with_decoders(Arc::new(UppercaseDecoder), Arc::new(RejectingDecoder));

        let pdf = Source::inline("p", SourceKind::DocumentPdf, "Brief", "exhibit a");
        assert_eq!(extractor.extract(&pdf).await.unwrap(), "EXHIBIT A");

        let docx = Source::inline("d", SourceKind::DocumentDocx, "Draft", "x");
        assert!(extractor.extract(&docx).await.is_err());

        // Plain text never goes through a decoder
        let txt = Source::inline("t", SourceKind::DocumentText, "Note", "lower");
        assert_eq!(extractor.extract(&txt).await.unwrap(), "lower");
    }

    #[tokio::test]
    async fn test_prior_analysis_passthrough() {
        let source = Source::inline("a", SourceKind::PriorAiAnalysis, "Review", "risk: high");
        let text = PriorAnalysisExtractor.extract(&source).await.unwrap();
        assert_eq!(text, "risk: high");
    }
}
