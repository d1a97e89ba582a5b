// Feature metadata: the complete product of one transform pass
use super::attribute::AttributeGroup;
use super::time_series::TimeSeriesGroup;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMetadata {
    pub attributes: AttributeGroup,
    pub time_series: Option<TimeSeriesGroup>,
}

impl FeatureMetadata {
    pub fn new(attributes: AttributeGroup, time_series: Option<TimeSeriesGroup>) -> Self {
        Self {
            attributes,
            time_series,
        }
    }

    /// Placeholder shown before any document has been resolved.
    pub fn empty(root_name: &str) -> Self {
        Self::new(AttributeGroup::empty(root_name), None)
    }
}
