use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

/// Snapshot of outbound Reddit traffic, reported by the health route.
/// Per-route counters are keyed by endpoint template (`/r/{subreddit}/about`)
/// so the map stays small no matter how many subreddits are looked up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
    pub average_response_time: Duration,
    pub last_request_time: Option<SystemTime>,
    pub requests_by_route: HashMap<String, RouteStats>,
    #[serde(skip)]
    elapsed_total: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteStats {
    pub request_count: u64,
    pub error_count: u64,
    pub total_response_time: Duration,
    pub max_response_time: Duration,
}

impl RouteStats {
    pub fn average_response_time(&self) -> Duration {
        mean(self.total_response_time, self.request_count)
    }

    pub fn success_rate(&self) -> f64 {
        if self.request_count == 0 {
            return 0.0;
        }
        (self.request_count - self.error_count) as f64 / self.request_count as f64
    }
}

/// What happened to one request. `status` is `None` when the request never
/// got a response (connect failure, timeout).
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub route: String,
    pub status: Option<u16>,
    pub elapsed: Duration,
}

impl RequestOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, Some(code) if code < 400)
    }

    pub fn rate_limited(&self) -> bool {
        self.status == Some(429)
    }
}

fn mean(total: Duration, count: u64) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => Duration::ZERO,
    }
}

#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: RwLock<ApiMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, outcome: RequestOutcome) {
        let ok = outcome.succeeded();
        let mut m = self.inner.write().await;

        m.total_requests += 1;
        m.last_request_time = Some(SystemTime::now());
        if ok {
            m.successful_requests += 1;
        } else {
            m.failed_requests += 1;
        }
        if outcome.rate_limited() {
            m.rate_limited_requests += 1;
        }
        m.elapsed_total += outcome.elapsed;
        m.average_response_time = mean(m.elapsed_total, m.total_requests);

        let stats = m.requests_by_route.entry(outcome.route).or_default();
        stats.request_count += 1;
        stats.total_response_time += outcome.elapsed;
        stats.max_response_time = stats.max_response_time.max(outcome.elapsed);
        if !ok {
            stats.error_count += 1;
        }
    }

    pub async fn snapshot(&self) -> ApiMetrics {
        self.inner.read().await.clone()
    }

    pub async fn route(&self, route: &str) -> Option<RouteStats> {
        self.inner.read().await.requests_by_route.get(route).cloned()
    }

    pub async fn reset(&self) {
        *self.inner.write().await = ApiMetrics::default();
    }
}
