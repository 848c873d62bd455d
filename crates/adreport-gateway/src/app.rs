use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use adreport_scheduler::SchedulerService;
use adreport_store::ReportStore;

use crate::signed::UrlSigner;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub store: Arc<ReportStore>,
    pub scheduler: SchedulerService,
    pub signer: UrlSigner,
}

impl AppState {
    pub fn new(store: Arc<ReportStore>, scheduler: SchedulerService, signer: UrlSigner) -> Self {
        Self {
            store,
            scheduler,
            signer,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/reports",
            post(crate::http::reports::create_report_config)
                .get(crate::http::reports::list_report_configs),
        )
        .route(
            "/reports/{id}",
            axum::routing::put(crate::http::reports::update_report_config)
                .delete(crate::http::reports::delete_report_config),
        )
        .route("/reports/{id}/run", post(crate::http::reports::run_report_now))
        .route(
            "/reports/{id}/share",
            get(crate::http::reports::share_report_link),
        )
        .route("/jobs/status", get(crate::http::jobs::jobs_status))
        .route(
            "/view-report/{id}",
            get(crate::http::view_report::view_report),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
