// Repository trait for metadata document access
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Fetch the raw metadata document for `iri` from the backend named by `stack`.
    async fn fetch_document(&self, iri: &str, stack: &str) -> anyhow::Result<Value>;
}
