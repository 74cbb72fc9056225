// Helper utilities for Arc<RwLock<T>> patterns and async state management
// Provides macros and utilities to simplify common async access patterns

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Type alias for shared state pattern
pub type SharedState<T> = Arc<RwLock<T>>;

/// Create a new shared state instance
pub fn shared_state<T>(value: T) -> SharedState<T> {
    Arc::new(RwLock::new(value))
}

/// Macro for reading from shared state with timeout
#[macro_export]
macro_rules! read_state {
    ($state:expr) => {
        $state.read().await
    };
    ($state:expr, timeout: $duration:expr) => {
        tokio::time::timeout($duration, $state.read())
            .await
            .map_err(|_| $crate::error::CommonError::Timeout)?
    };
}

/// Macro for writing to shared state with timeout
#[macro_export]
macro_rules! write_state {
    ($state:expr) => {
        $state.write().await
    };
    ($state:expr, timeout: $duration:expr) => {
        tokio::time::timeout($duration, $state.write())
            .await
            .map_err(|_| $crate::error::CommonError::Timeout)?
    };
}

/// Macro for safely updating state with a closure
#[macro_export]
macro_rules! update_state {
    ($state:expr, $updater:expr) => {{
        let mut guard = $state.write().await;
        $updater(&mut *guard)
    }};
    ($state:expr, $updater:expr, timeout: $duration:expr) => {{
        let mut guard = tokio::time::timeout($duration, $state.write())
            .await
            .map_err(|_| $crate::error::CommonError::Timeout)?;
        $updater(&mut *guard)
    }};
}

/// Macro for conditionally updating state
#[macro_export]
macro_rules! update_state_if {
    ($state:expr, $condition:expr, $updater:expr) => {{
        let mut guard = $state.write().await;
        if $condition(&*guard) {
            $updater(&mut *guard);
            true
        } else {
            false
        }
    }};
}

/// Macro for reading state and transforming the result
#[macro_export]
macro_rules! read_state_map {
    ($state:expr, $mapper:expr) => {{
        let guard = $state.read().await;
        $mapper(&*guard)
    }};
}

/// Macro for cloning data from state (useful for avoiding lifetime issues)
#[macro_export]
macro_rules! clone_from_state {
    ($state:expr, $field:ident) => {{
        let guard = $state.read().await;
        guard.$field.clone()
    }};
    ($state:expr, $mapper:expr) => {{
        let guard = $state.read().await;
        $mapper(&*guard).clone()
    }};
}

/// Type alias for a type-erased, thread-safe state value
type StateValue = Box<dyn std::any::Any + Send + Sync>;

/// State registry for storing multiple shared states by key
///
/// This is a simple container for type-erased shared states. For lifecycle
/// management of components with initialization/shutdown logic, use the
/// `AsyncManager` trait from the `manager` module instead.
#[derive(Debug)]
pub struct StateRegistry {
    states: std::collections::HashMap<String, StateValue>,
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRegistry {
    pub fn new() -> Self {
        Self { states: std::collections::HashMap::new() }
    }

    /// Register a shared state with a key
    pub fn register<T: Send + Sync + 'static>(&mut self, key: String, state: SharedState<T>) {
        self.states.insert(key, Box::new(state));
    }

    /// Get a shared state by key
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<&SharedState<T>> {
        self.states.get(key)?.downcast_ref()
    }
}

/// Async-safe state container with built-in lifecycle management
#[derive(Debug, Clone)]
pub struct ManagedState<T> {
    state: SharedState<T>,
    created_at: std::time::Instant,
    last_accessed: SharedState<std::time::Instant>,
}

impl<T> ManagedState<T> {
    pub fn new(value: T) -> Self {
        let now = std::time::Instant::now();
        Self { state: shared_state(value), created_at: now, last_accessed: shared_state(now) }
    }

    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, T> {
        self.update_access_time().await;
        self.state.read().await
    }

    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, T> {
        self.update_access_time().await;
        self.state.write().await
    }

    pub async fn try_read(&self) -> Option<tokio::sync::RwLockReadGuard<'_, T>> {
        self.update_access_time().await;
        self.state.try_read().ok()
    }

    pub async fn try_write(&self) -> Option<tokio::sync::RwLockWriteGuard<'_, T>> {
        self.update_access_time().await;
        self.state.try_write().ok()
    }

    async fn update_access_time(&self) {
        if let Ok(mut guard) = self.last_accessed.try_write() {
            *guard = std::time::Instant::now();
        }
    }

    pub fn created_at(&self) -> std::time::Instant {
        self.created_at
    }

    pub async fn last_accessed(&self) -> std::time::Instant {
        *self.last_accessed.read().await
    }

    pub async fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub async fn idle_time(&self) -> Duration {
        self.last_accessed().await.elapsed()
    }

    /// Get a clone of the underlying Arc for sharing across threads
    pub fn get_shared(&self) -> SharedState<T> {
        Arc::clone(&self.state)
    }

    /// Set a new value to the state
    pub async fn set(&mut self, value: T) {
        self.update_access_time().await;
        let mut guard = self.state.write().await;
        *guard = value;
    }

    /// Modify the state using a closure
    pub async fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.update_access_time().await;
        let mut guard = self.state.write().await;
        f(&mut *guard);
    }
}

impl<T: Clone> ManagedState<T> {
    /// Clone the current state value (useful for avoiding lifetime issues)
    pub async fn clone_value(&self) -> T {
        self.read().await.clone()
    }
}

/// Atomic counter with shared state
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: SharedState<u64>,
}

impl AtomicCounter {
    pub fn new(initial: u64) -> Self {
        Self { value: shared_state(initial) }
    }

    pub async fn increment(&self) -> u64 {
        let mut guard = self.value.write().await;
        *guard += 1;
        *guard
    }

    pub async fn decrement(&self) -> u64 {
        let mut guard = self.value.write().await;
        *guard = guard.saturating_sub(1);
        *guard
    }

    pub async fn get(&self) -> u64 {
        *self.value.read().await
    }

    pub async fn set(&self, value: u64) {
        *self.value.write().await = value;
    }

    pub async fn add(&self, delta: u64) -> u64 {
        let mut guard = self.value.write().await;
        *guard += delta;
        *guard
    }
}

/// Configuration for state access patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_concurrent_readers: Option<usize>,
    pub enable_metrics: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(10),
            max_concurrent_readers: None,
            enable_metrics: false,
        }
    }
}

/// Utility for safely sharing data across async contexts without lifetime
/// issues
#[derive(Debug, Clone)]
pub struct SafeShare<T> {
    data: Arc<T>,
}

impl<T> SafeShare<T> {
    pub fn new(data: T) -> Self {
        Self { data: Arc::new(data) }
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    pub fn clone_arc(&self) -> Arc<T> {
        Arc::clone(&self.data)
    }
}

impl<T: Clone> SafeShare<T> {
    pub fn clone_value(&self) -> T {
        (*self.data).clone()
    }
}

/// Builder pattern for creating complex shared state structures
pub struct StateBuilder<T> {
    initial_value: Option<T>,
    config: StateConfig,
}

impl<T> Default for StateBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateBuilder<T> {
    pub fn new() -> Self {
        Self { initial_value: None, config: StateConfig::default() }
    }

    pub fn with_initial_value(mut self, value: T) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn with_config(mut self, config: StateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn build(self) -> Option<ManagedState<T>> {
        self.initial_value.map(ManagedState::new)
    }
}

impl<T: Default> StateBuilder<T> {
    pub fn build_with_default(self) -> ManagedState<T> {
        ManagedState::new(self.initial_value.unwrap_or_default())
    }
}
