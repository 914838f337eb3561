use std::time::Duration;

/// Object store sink configuration
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Base URL of the object store, without trailing slash
    pub base_url: String,
    /// Class (collection) the records are written to
    pub class_name: String,
    /// Per-request timeout for object store writes
    pub timeout: Duration,
    /// Bounded queue size; 0 delivers inline from the request handler
    pub queue_capacity: usize,
    /// Number of delivery workers when queueing is enabled
    pub queue_workers: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://weaviate:8080".to_string(),
            class_name: "FinancialTxn".to_string(),
            timeout: Duration::from_secs(10),
            queue_capacity: 0,
            queue_workers: num_cpus::get(),
        }
    }
}

impl SinkConfig {
    /// Create a sink config from environment variables
    /// TXNBRIDGE_STORE_URL=http://weaviate:8080
    /// TXNBRIDGE_STORE_CLASS=FinancialTxn
    /// TXNBRIDGE_STORE_TIMEOUT_SECS=10
    /// TXNBRIDGE_QUEUE_CAPACITY=0
    /// TXNBRIDGE_QUEUE_WORKERS=<cpus>
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup("TXNBRIDGE_STORE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);
        let class_name = lookup("TXNBRIDGE_STORE_CLASS")
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.class_name);
        let timeout = lookup("TXNBRIDGE_STORE_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let queue_capacity = lookup("TXNBRIDGE_QUEUE_CAPACITY")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.queue_capacity);
        let queue_workers = lookup("TXNBRIDGE_QUEUE_WORKERS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.queue_workers);

        Self {
            base_url,
            class_name,
            timeout,
            queue_capacity,
            queue_workers,
        }
    }

    /// Object-creation endpoint
    pub fn objects_url(&self) -> String {
        format!("{}/v1/objects", self.base_url)
    }

    pub fn is_queued(&self) -> bool {
        self.queue_capacity > 0
    }
}
