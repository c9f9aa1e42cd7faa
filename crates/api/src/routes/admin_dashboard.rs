//! Admin dashboard summary.

use axum::{extract::State, Json};
use domain::models::DashboardStats;
use domain::services::DashboardAggregator;

use crate::app::AppState;
use crate::extractors::Admin;

/// Row counts for the dashboard cards. A failed count shows as zero.
///
/// GET /api/v1/admin/dashboard
pub async fn get_dashboard(State(state): State<AppState>, Admin(admin): Admin) -> Json<DashboardStats> {
    let stats = DashboardAggregator::new(state.backend.gateway_for(&admin))
        .collect()
        .await;
    Json(stats)
}
