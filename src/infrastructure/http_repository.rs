// HTTP metadata repository implementation
use crate::application::metadata_repository::MetadataRepository;
use crate::infrastructure::config::prepare_query;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HttpMetadataRepository {
    client: reqwest::Client,
    stacks: HashMap<String, String>,
    query_template: String,
    token: Option<String>,
}

impl HttpMetadataRepository {
    pub fn new(
        stacks: HashMap<String, String>,
        query_template: String,
        token: Option<String>,
    ) -> Self {
        let stacks = stacks
            .into_iter()
            .map(|(name, url)| (name, url.trim_end_matches('/').to_string()))
            .collect();
        Self {
            client: reqwest::Client::new(),
            stacks,
            query_template,
            token,
        }
    }

    /// A configured stack name, or a stack given directly as a URL.
    fn stack_url(&self, stack: &str) -> Result<String> {
        if let Some(url) = self.stacks.get(stack) {
            return Ok(url.clone());
        }
        if stack.starts_with("http://") || stack.starts_with("https://") {
            return Ok(stack.trim_end_matches('/').to_string());
        }
        anyhow::bail!("Unknown stack {}", stack)
    }

    fn build_query_url(&self, iri: &str, stack: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("iri".to_string(), urlencoding::encode(iri).into_owned());
        Ok(format!(
            "{}{}",
            self.stack_url(stack)?,
            prepare_query(&self.query_template, &vars)
        ))
    }
}

#[async_trait]
impl MetadataRepository for HttpMetadataRepository {
    async fn fetch_document(&self, iri: &str, stack: &str) -> Result<Value> {
        let url = self.build_query_url(iri, stack)?;
        tracing::debug!("Fetching metadata for {} from {}", iri, url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send metadata request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Metadata query failed with status {}: {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse metadata response")
    }
}
