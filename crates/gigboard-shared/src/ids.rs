//! Record identifiers.
//!
//! Every stored record is keyed by `"<prefix>_<unix-millis>"`. Ids come from
//! a monotonic generator: when two records are created within the same
//! millisecond the second one takes the next integer, so the format stays the
//! same while same-process collisions are ruled out.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::error::SharedError;

/// Prefix of the generated id, one per record family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    Gig,
    Application,
    Transaction,
    Conversation,
    Message,
    Notification,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gig => "gig",
            Self::Application => "app",
            Self::Transaction => "txn",
            Self::Conversation => "conv",
            Self::Message => "msg",
            Self::Notification => "notif",
        }
    }
}

impl std::fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic millisecond-based id source.
#[derive(Debug)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Current time in milliseconds, bumped past the last value handed out.
    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let candidate = if now > prev { now } else { prev + 1 };
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }

    pub fn next(&self, prefix: IdPrefix) -> String {
        format!("{}_{}", prefix.as_str(), self.next_millis())
    }

    /// Record an id minted elsewhere so later ids from this generator sort
    /// after it.
    pub fn observe(&self, id: &str) -> Result<(), SharedError> {
        let (_, millis) = split(id)?;
        self.last.fetch_max(millis, Ordering::AcqRel);
        Ok(())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_IDS: IdGenerator = IdGenerator::new();

/// Generate an id from the process-wide generator.
pub fn generate(prefix: IdPrefix) -> String {
    GLOBAL_IDS.next(prefix)
}

/// Feed an externally created id to the process-wide generator.
pub fn observe(id: &str) -> Result<(), SharedError> {
    GLOBAL_IDS.observe(id)
}

/// Split an id into its prefix and numeric part.
pub fn split(id: &str) -> Result<(&str, i64), SharedError> {
    let (prefix, number) = id
        .rsplit_once('_')
        .ok_or_else(|| SharedError::MalformedId(id.to_string()))?;
    if prefix.is_empty() {
        return Err(SharedError::MalformedId(id.to_string()));
    }
    let millis = number
        .parse::<i64>()
        .map_err(|_| SharedError::MalformedId(id.to_string()))?;
    Ok((prefix, millis))
}
