// Feature service - Use case for fetching and transforming one feature's metadata
use crate::application::attribute_builder::build_attribute_tree;
use crate::application::extract_options::ExtractOptions;
use crate::application::metadata_repository::MetadataRepository;
use crate::application::time_series_extractor::extract_time_series;
use crate::domain::feature::FeatureMetadata;
use serde_json::Value;
use std::sync::Arc;

/// Transform an already-retrieved document. Pure; never fails.
pub fn build_feature_metadata(document: &Value, options: &ExtractOptions) -> FeatureMetadata {
    FeatureMetadata::new(
        build_attribute_tree(document, options),
        extract_time_series(document, options),
    )
}

#[derive(Clone)]
pub struct FeatureService {
    repository: Arc<dyn MetadataRepository>,
    options: ExtractOptions,
    default_stack: String,
}

impl FeatureService {
    pub fn new(
        repository: Arc<dyn MetadataRepository>,
        options: ExtractOptions,
        default_stack: String,
    ) -> Self {
        Self {
            repository,
            options,
            default_stack,
        }
    }

    pub async fn get_feature(
        &self,
        iri: &str,
        stack: Option<&str>,
    ) -> anyhow::Result<FeatureMetadata> {
        let stack = stack.unwrap_or(&self.default_stack);
        let document = self.repository.fetch_document(iri, stack).await?;
        let metadata = build_feature_metadata(&document, &self.options);

        tracing::debug!(
            "Built metadata for {} from {}: {} entries, {} series",
            iri,
            stack,
            metadata.attributes.display_order.len(),
            metadata.time_series.as_ref().map(|t| t.series.len()).unwrap_or(0)
        );
        Ok(metadata)
    }
}
