use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sync item priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Critical = 0,
    High = 1,
    Normal = 2,
    Low = 3,
    Background = 4,
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        match value {
            0 => Priority::Critical,
            1 => Priority::High,
            2 => Priority::Normal,
            3 => Priority::Low,
            _ => Priority::Background,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Critical => write!(f, "Critical"),
            Priority::High => write!(f, "High"),
            Priority::Normal => write!(f, "Normal"),
            Priority::Low => write!(f, "Low"),
            Priority::Background => write!(f, "Background"),
        }
    }
}

/// Item status in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Pending,
    Processing,
    Failed,
    Completed,
    Cancelled,
    Scheduled,
}

/// Synchronization item with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncItem {
    pub id: String,
    pub priority: Priority,
    pub data: serde_json::Value,
    pub retry_count: u32,
    pub max_retries: u32,
    pub created_at: u64,
    pub updated_at: u64,
    /// Next retry timestamp in milliseconds since Unix epoch
    pub next_retry_at: Option<u128>,
    pub status: ItemStatus,
    pub error_message: Option<String>,
    pub metadata: HashMap<String, String>,
    pub processing_started_at: Option<u64>,
    pub processing_duration_ms: Option<u64>,
    pub correlation_id: Option<String>,
    pub partition_key: Option<String>,
}

impl SyncItem {
    /// Create a new sync item
    pub fn new(data: serde_json::Value, priority: Priority) -> Self {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();

        Self {
            id: Uuid::new_v4().to_string(),
            priority,
            data,
            retry_count: 0,
            max_retries: 5,
            created_at: now,
            updated_at: now,
            next_retry_at: None,
            status: ItemStatus::Pending,
            error_message: None,
            metadata: HashMap::new(),
            processing_started_at: None,
            processing_duration_ms: None,
            correlation_id: None,
            partition_key: None,
        }
    }

    /// Create with specific ID
    pub fn with_id(id: String, data: serde_json::Value, priority: Priority) -> Self {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();

        Self {
            id,
            priority,
            data,
            retry_count: 0,
            max_retries: 5,
            created_at: now,
            updated_at: now,
            next_retry_at: None,
            status: ItemStatus::Pending,
            error_message: None,
            metadata: HashMap::new(),
            processing_started_at: None,
            processing_duration_ms: None,
            correlation_id: None,
            partition_key: None,
        }
    }

    /// Set maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Set correlation ID for tracing
    pub fn with_correlation_id(mut self, id: String) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Set partition key for sharding
    pub fn with_partition_key(mut self, key: String) -> Self {
        self.partition_key = Some(key);
        self
    }

    /// Check if item can be retried
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries && self.status != ItemStatus::Cancelled
    }

    /// Calculate next retry time with exponential backoff and jitter.
    ///
    /// Returns an epoch timestamp in milliseconds.
    pub fn calculate_next_retry(&self, base_delay: Duration) -> u128 {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();

        let base_ms = base_delay.as_millis().max(1);

        // Prevent overflow by capping the exponent
        let exp = self.retry_count.min(10);
        let multiplier = 2_u128.saturating_pow(exp);
        let backoff = base_ms.saturating_mul(multiplier);

        // Add jitter (0-25% of backoff)
        let jitter_bound = backoff / 4;
        let jitter_value = if jitter_bound > 0 {
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos()
                % (jitter_bound + 1)
        } else {
            0
        };

        now.saturating_add(backoff).saturating_add(jitter_value)
    }

    /// Mark item as processing
    pub fn mark_processing(&mut self) {
        self.status = ItemStatus::Processing;
        self.processing_started_at =
            Some(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs());
        self.updated_at =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    }

    /// Mark item as completed
    pub fn mark_completed(&mut self) {
        self.status = ItemStatus::Completed;
        if let Some(started) = self.processing_started_at {
            let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
            self.processing_duration_ms = Some((now - started) * 1000);
        }
        self.updated_at =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    }

    /// Mark item as failed
    pub fn mark_failed(&mut self, error: Option<String>) {
        self.status = ItemStatus::Failed;
        self.error_message = error;
        self.retry_count += 1;
        if let Some(started) = self.processing_started_at {
            let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
            self.processing_duration_ms = Some((now - started) * 1000);
        }
        self.updated_at =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    }
}

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub max_capacity: usize,
    pub batch_size: usize,
    pub persistence_path: Option<PathBuf>,
    pub persistence_interval: Duration,
    pub enable_deduplication: bool,
    pub enable_compression: bool,
    pub compression_level: u32,
    pub enable_encryption: bool,
    pub encryption_key: Option<Vec<u8>>,
    pub retention_period: Duration,
    pub base_retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub cleanup_interval: Duration,
    pub heap_cleanup_threshold: usize,
    pub enable_partitioning: bool,
    pub partition_count: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            batch_size: 100,
            persistence_path: None,
            persistence_interval: Duration::from_secs(30),
            enable_deduplication: true,
            enable_compression: true,
            compression_level: 6,
            enable_encryption: false,
            encryption_key: None,
            retention_period: Duration::from_secs(7 * 24 * 3600), // 7 days
            base_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(3600), // 1 hour
            cleanup_interval: Duration::from_secs(300), // 5 minutes
            heap_cleanup_threshold: 1000,
            enable_partitioning: false,
            partition_count: 4,
        }
    }
}

impl QueueConfig {
    /// Create a high-performance configuration
    pub fn high_performance() -> Self {
        Self {
            max_capacity: 100_000,
            batch_size: 1000,
            persistence_interval: Duration::from_secs(60),
            enable_compression: false,
            enable_encryption: false,
            cleanup_interval: Duration::from_secs(600),
            heap_cleanup_threshold: 5000,
            ..Default::default()
        }
    }

    /// Create a high-security configuration
    pub fn high_security() -> Self {
        Self {
            enable_encryption: true,
            enable_compression: true,
            compression_level: 9,
            persistence_interval: Duration::from_secs(10),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_capacity == 0 {
            return Err("Max capacity must be greater than 0".to_string());
        }

        if self.base_retry_delay.as_millis() == 0 {
            return Err("Base retry delay must be greater than 0".to_string());
        }

        if self.batch_size > self.max_capacity {
            return Err("Batch size cannot exceed max capacity".to_string());
        }

        if self.enable_encryption && self.encryption_key.is_none() {
            return Err("Encryption key required when encryption is enabled".to_string());
        }

        if let Some(ref key) = self.encryption_key {
            if key.len() != 32 {
                return Err("Encryption key must be 32 bytes".to_string());
            }
        }

        if self.compression_level > 9 {
            return Err("Compression level must be between 0 and 9".to_string());
        }

        if self.enable_partitioning && self.partition_count == 0 {
            return Err("Partition count must be greater than 0".to_string());
        }

        Ok(())
    }
}
