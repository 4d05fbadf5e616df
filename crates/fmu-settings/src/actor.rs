//! Acting user, host and clock for mutating operations
//!
//! Every change record carries who made it, where, and when. Those values
//! are captured from an [`Actor`] handed to the directory at open time
//! rather than read from process state at each write, so tests can run with
//! a deterministic identity and clock.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Source of timestamps for change records, locks and cache revisions.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that advances by a fixed step on every reading.
///
/// Readings are strictly increasing, which keeps changelog ordering
/// unambiguous in tests.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Start at `start` and advance one second per reading.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self::new(start, Duration::seconds(1))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let current = *next;
        *next = current + self.step;
        current
    }
}

/// Identity and clock used for every mutating operation on a directory.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: String,
    pub hostname: String,
    /// Process id recorded as lock owner
    pub pid: u32,
    clock: Arc<dyn Clock>,
}

impl Actor {
    /// Create an actor for the current process using the system clock.
    pub fn new(user: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            hostname: hostname.into(),
            pid: std::process::id(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Build an actor from the environment: `USER`/`USERNAME` and the system hostname.
    pub fn from_env() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());
        Self::new(user, hostname)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `hostname:pid`, the identity a lock is held under.
    pub fn lock_owner(&self) -> String {
        format!("{}:{}", self.hostname, self.pid)
    }
}
