//! One-shot and recurring timers
//!
//! Provides utilities for creating timers with cancellation support.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

/// A timer handle that can be used to cancel a timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    /// Create a new timer handle
    fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Cancel the timer
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A one-shot timer
pub struct Timer {
    handle: TimerHandle,
}

impl Timer {
    /// Create a new timer that fires after a duration
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # #[cfg(feature = "runtime")]
    /// # {
    /// use std::time::Duration;
    ///
    /// use oauthbroker_common::time::timer::Timer;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let timer = Timer::after(Duration::from_secs(1));
    ///     timer.wait(Duration::from_secs(1)).await;
    ///     println!("Timer fired!");
    /// }
    /// # }
    /// ```
    pub fn after(_duration: Duration) -> Self {
        Self { handle: TimerHandle::new() }
    }

    /// Get a handle to cancel the timer
    pub fn handle(&self) -> TimerHandle {
        self.handle.clone()
    }

    /// Wait for the timer to fire
    pub async fn wait(self, duration: Duration) {
        sleep(duration).await;
    }

    /// Check if the timer was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }
}

/// Create a one-shot timer
///
/// # Examples
///
/// ```no_run
/// # #[cfg(feature = "runtime")]
/// # {
/// use std::time::Duration;
///
/// use oauthbroker_common::time::timer::timeout;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = timeout(Duration::from_secs(5), || {
///         println!("Timeout!");
///     })
///     .await;
/// }
/// # }
/// ```
pub async fn timeout<F>(duration: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let handle = TimerHandle::new();
    let handle_clone = handle.clone();

    tokio::spawn(async move {
        sleep(duration).await;
        if !handle_clone.is_cancelled() {
            callback();
        }
    });

    handle
}

/// Create a recurring timer
///
/// # Examples
///
/// ```no_run
/// # #[cfg(feature = "runtime")]
/// # {
/// use std::time::Duration;
///
/// use oauthbroker_common::time::timer::recurring;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = recurring(Duration::from_secs(1), || {
///         println!("Tick!");
///     });
///
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     handle.cancel();
/// }
/// # }
/// ```
pub fn recurring<F>(duration: Duration, mut callback: F) -> TimerHandle
where
    F: FnMut() + Send + 'static,
{
    let handle = TimerHandle::new();
    let handle_clone = handle.clone();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(duration);
        interval.tick().await; // Skip first immediate tick

        while !handle_clone.is_cancelled() {
            interval.tick().await;
            if !handle_clone.is_cancelled() {
                callback();
            }
        }
    });

    handle
}
