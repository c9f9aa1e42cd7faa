//! Dashboard summary domain model.

use serde::{Deserialize, Serialize};

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardStats {
    pub packages: u64,
    pub faqs: u64,
    pub submissions: u64,
    pub new_submissions: u64,
}
