// Domain layer - Feature metadata models
pub mod attribute;
pub mod feature;
pub mod literal;
pub mod time_series;
