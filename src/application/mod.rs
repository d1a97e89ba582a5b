// Application layer - Metadata transform and resolution use cases
pub mod attribute_builder;
pub mod extract_options;
pub mod feature_service;
pub mod metadata_repository;
pub mod subquery_resolver;
pub mod time_series_extractor;
