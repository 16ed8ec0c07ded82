//! database-extract sources
//!
//! There is no live database connection. The caller supplies a
//! `DatabaseExtract` that turns the source into text; the default one reads
//! the already-materialized `rawContent`.

use super::ContentExtractor;
use crate::types::{PipelineError, Source};
use async_trait::async_trait;
use std::sync::Arc;

/// Caller-supplied extraction callback
#[async_trait]
pub trait DatabaseExtract: Send + Sync {
    async fn extract(&self, source: &Source) -> Result<String, PipelineError>;
}

/// Reads `rawContent` (empty when absent)
pub struct MaterializedExtract;

#[async_trait]
impl DatabaseExtract for MaterializedExtract {
    async fn extract(&self, source: &Source) -> Result<String, PipelineError> {
        Ok(source.raw_content.clone().unwrap_or_default())
    }
}

pub struct DatabaseExtractor {
    callback: Arc<dyn DatabaseExtract>,
}

impl DatabaseExtractor {
    pub fn new(callback: Arc<dyn DatabaseExtract>) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl ContentExtractor for DatabaseExtractor {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn extract(&self, source: &Source) -> Result<String, PipelineError> {
        self.callback.extract(source).await
    }
}
