// Parameters for one transform pass

pub const DEFAULT_ATTRIBUTE_KEY: &str = "meta";
pub const DEFAULT_TIME_KEY: &str = "time";
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Where to find the branches of a metadata document and how deep to walk them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub attribute_key: String,
    pub time_key: String,
    pub max_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            attribute_key: DEFAULT_ATTRIBUTE_KEY.to_string(),
            time_key: DEFAULT_TIME_KEY.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
