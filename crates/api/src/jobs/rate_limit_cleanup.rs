//! Drops idle client entries from the form rate limiter.

use std::sync::Arc;
use std::time::Duration;

use super::scheduler::Job;
use crate::middleware::RateLimiterState;

pub struct RateLimitCleanupJob {
    limiter: Arc<RateLimiterState>,
}

impl RateLimitCleanupJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitCleanupJob {
    fn name(&self) -> &'static str {
        "rate_limit_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn execute(&self) -> Result<(), String> {
        self.limiter.retain_recent();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_keeps_limits() {
        let limiter = Arc::new(RateLimiterState::new(1));
        assert!(limiter.check("203.0.113.7").is_ok());

        let job = RateLimitCleanupJob::new(limiter.clone());
        job.execute().await.unwrap();

        assert!(limiter.check("203.0.113.7").is_err());
        assert_eq!(job.name(), "rate_limit_cleanup");
    }
}
