use crate::application::extract_options::{
    DEFAULT_ATTRIBUTE_KEY, DEFAULT_MAX_DEPTH, DEFAULT_TIME_KEY, ExtractOptions,
};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    /// Stack name to backend base URL.
    #[serde(default)]
    pub stacks: HashMap<String, String>,
    #[serde(default)]
    pub extraction: ExtractionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentSettings {
    #[serde(default = "default_stack")]
    pub default_stack: String,
    /// Path and query appended to the stack URL; `${iri}` is replaced by the encoded IRI.
    #[serde(default = "default_query_template")]
    pub query_template: String,
    pub token: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            default_stack: default_stack(),
            query_template: default_query_template(),
            token: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionSettings {
    #[serde(default = "default_attribute_key")]
    pub attribute_key: String,
    #[serde(default = "default_time_key")]
    pub time_key: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            attribute_key: default_attribute_key(),
            time_key: default_time_key(),
            max_depth: default_max_depth(),
        }
    }
}

impl ExtractionSettings {
    pub fn to_options(&self) -> ExtractOptions {
        ExtractOptions {
            attribute_key: self.attribute_key.clone(),
            time_key: self.time_key.clone(),
            max_depth: self.max_depth,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_stack() -> String {
    "local".to_string()
}

fn default_query_template() -> String {
    "/feature-info-agent/get?iri=${iri}".to_string()
}

fn default_attribute_key() -> String {
    DEFAULT_ATTRIBUTE_KEY.to_string()
}

fn default_time_key() -> String {
    DEFAULT_TIME_KEY.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Load `config/feature-info.*`, overridden by `FEATURE_INFO__*` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/feature-info").required(false))
        .add_source(config::Environment::with_prefix("FEATURE_INFO").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
