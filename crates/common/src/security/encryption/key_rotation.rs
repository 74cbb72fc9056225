//! Key rotation scheduling
//!
//! Provides scheduling logic for automatic key rotation based on time periods.

use std::time::SystemTime;

use tracing::warn;

/// Key rotation schedule
///
/// Manages the timing and scheduling of encryption key rotations.
/// Tracks when the last rotation occurred and determines when the next
/// rotation should happen based on configured intervals.
#[derive(Debug, Clone)]
pub struct KeyRotationSchedule {
    /// Number of days between rotations
    pub rotation_days: u32,

    /// Timestamp of last rotation
    last_rotation: Option<SystemTime>,
}

impl Default for KeyRotationSchedule {
    fn default() -> Self {
        Self {
            rotation_days: 90, // Default: rotate every 90 days
            last_rotation: None,
        }
    }
}

impl KeyRotationSchedule {
    /// Create a new rotation schedule with a specific interval
    ///
    /// # Arguments
    /// * `rotation_days` - Number of days between rotations
    pub fn new(rotation_days: u32) -> Self {
        Self { rotation_days, last_rotation: None }
    }

    /// Check if rotation is needed
    ///
    /// Returns `true` if:
    /// - This is the first rotation (never rotated before)
    /// - The configured rotation period has elapsed since last rotation
    ///
    /// # Notes
    /// If the system clock goes backwards, this will default to zero elapsed
    /// time and log a warning. This prevents premature rotation due to
    /// clock issues.
    pub fn should_rotate(&self) -> bool {
        if let Some(last) = self.last_rotation {
            let elapsed = SystemTime::now().duration_since(last).unwrap_or_else(|e| {
                warn!(
                    error = %e,
                    "System clock went backwards during key rotation check, defaulting to zero elapsed time"
                );
                std::time::Duration::ZERO
            });

            elapsed.as_secs() > (self.rotation_days as u64 * 24 * 3600)
        } else {
            false // Don't rotate immediately on first use
        }
    }

    /// Record a rotation
    ///
    /// Updates the last rotation timestamp to now.
    pub fn record_rotation(&mut self) {
        self.last_rotation = Some(SystemTime::now());
    }

    /// Set rotation period in days
    ///
    /// # Arguments
    /// * `days` - Number of days between rotations
    pub fn set_rotation_days(&mut self, days: u32) {
        self.rotation_days = days;
    }

    /// Get the last rotation time
    pub fn last_rotation(&self) -> Option<SystemTime> {
        self.last_rotation
    }

    /// Get days since last rotation
    ///
    /// Returns `None` if never rotated.
    ///
    /// # Notes
    /// If the system clock goes backwards, this will default to zero days
    /// and log a warning.
    pub fn days_since_last_rotation(&self) -> Option<u64> {
        self.last_rotation.map(|last| {
            SystemTime::now()
                .duration_since(last)
                .unwrap_or_else(|e| {
                    warn!(
                        error = %e,
                        "System clock went backwards during days calculation, defaulting to zero"
                    );
                    std::time::Duration::ZERO
                })
                .as_secs()
                / (24 * 3600)
        })
    }
}
