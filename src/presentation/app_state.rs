// Application state for HTTP handlers
use crate::application::feature_service::FeatureService;
use crate::application::subquery_resolver::SubqueryResolver;

#[derive(Clone)]
pub struct AppState {
    pub feature_service: FeatureService,
    pub explorer: SubqueryResolver,
}
