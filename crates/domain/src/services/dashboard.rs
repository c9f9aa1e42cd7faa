//! Dashboard aggregation.

use std::sync::Arc;

use tracing::warn;

use super::entity::Entity;
use super::gateway::{Filter, GatewayError, TableGateway};
use crate::models::{ContactSubmission, DashboardStats, Faq, Package, SubmissionStatus};

/// Runs the dashboard counts concurrently and combines them.
pub struct DashboardAggregator {
    gateway: Arc<dyn TableGateway>,
}

fn or_zero(label: &str, result: Result<u64, GatewayError>) -> u64 {
    result.unwrap_or_else(|e| {
        warn!(count = label, error = %e, "Dashboard count failed, showing zero");
        0
    })
}

impl DashboardAggregator {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    /// A failing count reads as zero; the others are unaffected.
    pub async fn collect(&self) -> DashboardStats {
        let new_filter = [Filter::eq("status", SubmissionStatus::New.as_str())];

        let (packages, faqs, submissions, new_submissions) = tokio::join!(
            self.gateway.count(Package::TABLE, &[]),
            self.gateway.count(Faq::TABLE, &[]),
            self.gateway.count(ContactSubmission::TABLE, &[]),
            self.gateway.count(ContactSubmission::TABLE, &new_filter),
        );

        DashboardStats {
            packages: or_zero("packages", packages),
            faqs: or_zero("faqs", faqs),
            submissions: or_zero("submissions", submissions),
            new_submissions: or_zero("new_submissions", new_submissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::{Query, Row};
    use crate::services::memory::InMemoryGateway;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn gateway() -> Arc<InMemoryGateway> {
        Arc::new(
            InMemoryGateway::new()
                .with_rows("packages", vec![json!({"id": "p1"}), json!({"id": "p2"})])
                .with_rows("faqs", vec![json!({"id": "f1"}), json!({"id": "f2"}), json!({"id": "f3"})])
                .with_rows(
                    "contact_submissions",
                    vec![
                        json!({"id": "s1", "status": "new"}),
                        json!({"id": "s2", "status": "read"}),
                        json!({"id": "s3", "status": "new"}),
                        json!({"id": "s4", "status": "read"}),
                    ],
                ),
        )
    }

    #[tokio::test]
    async fn test_collect_counts() {
        let stats = DashboardAggregator::new(gateway()).collect().await;
        assert_eq!(
            stats,
            DashboardStats {
                packages: 2,
                faqs: 3,
                submissions: 4,
                new_submissions: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_count_reads_zero() {
        let gateway = gateway();
        gateway.fail_count("faqs");

        let stats = DashboardAggregator::new(gateway.clone()).collect().await;

        assert_eq!(stats.faqs, 0);
        assert_eq!(stats.packages, 2);
        assert_eq!(stats.submissions, 4);
        assert_eq!(stats.new_submissions, 2);
    }

    /// Delays counts on one table and records the order counts finish in.
    struct SlowTable {
        inner: Arc<InMemoryGateway>,
        slow_table: &'static str,
        finished: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl TableGateway for SlowTable {
        async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, GatewayError> {
            self.inner.select(table, query).await
        }

        async fn insert(&self, table: &str, row: Row) -> Result<Row, GatewayError> {
            self.inner.insert(table, row).await
        }

        async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Row, GatewayError> {
            self.inner.update(table, id, patch).await
        }

        async fn delete(&self, table: &str, id: &str) -> Result<(), GatewayError> {
            self.inner.delete(table, id).await
        }

        async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, GatewayError> {
            if table == self.slow_table {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            let result = self.inner.count(table, filters).await;
            self.finished.lock().unwrap().push(table.to_string());
            result
        }
    }

    fn slow(inner: Arc<InMemoryGateway>, slow_table: &'static str) -> Arc<SlowTable> {
        Arc::new(SlowTable {
            inner,
            slow_table,
            finished: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_collect_independent_of_completion_order() {
        let gateway = slow(gateway(), "packages");

        let stats = DashboardAggregator::new(gateway.clone()).collect().await;

        let finished = gateway.finished.lock().unwrap().clone();
        assert_eq!(finished.len(), 4);
        assert_eq!(finished.last().map(String::as_str), Some("packages"));
        assert_eq!(
            stats,
            DashboardStats {
                packages: 2,
                faqs: 3,
                submissions: 4,
                new_submissions: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_late_failure_reads_zero() {
        let inner = gateway();
        inner.fail_count("packages");
        let gateway = slow(inner, "packages");

        let stats = DashboardAggregator::new(gateway.clone()).collect().await;

        let finished = gateway.finished.lock().unwrap().clone();
        assert_eq!(finished.last().map(String::as_str), Some("packages"));
        assert_eq!(stats.packages, 0);
        assert_eq!(stats.faqs, 3);
        assert_eq!(stats.submissions, 4);
        assert_eq!(stats.new_submissions, 2);
    }

    #[tokio::test]
    async fn test_all_counts_issued() {
        let gateway = gateway();
        DashboardAggregator::new(gateway.clone()).collect().await;
        assert_eq!(gateway.calls().len(), 4);
    }
}
