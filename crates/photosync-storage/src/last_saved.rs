//! Time of the most recent successful save.
//!
//! The storage writer owns the only [`LastSavedWriter`]; any number of
//! [`LastSavedReader`]s can observe it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

const UNSET: i64 = i64::MIN;

#[derive(Debug)]
pub struct LastSavedWriter {
    millis: Arc<AtomicI64>,
}

#[derive(Debug, Clone)]
pub struct LastSavedReader {
    millis: Arc<AtomicI64>,
}

/// Create a fresh writer/reader pair with no save recorded.
pub fn last_saved_state() -> (LastSavedWriter, LastSavedReader) {
    let millis = Arc::new(AtomicI64::new(UNSET));
    (
        LastSavedWriter {
            millis: Arc::clone(&millis),
        },
        LastSavedReader { millis },
    )
}

impl LastSavedWriter {
    /// Record a save. Concurrent or out-of-order calls keep the latest time.
    pub fn record(&self, at: DateTime<Utc>) {
        self.millis
            .fetch_max(at.timestamp_millis(), Ordering::AcqRel);
    }

    pub fn reader(&self) -> LastSavedReader {
        LastSavedReader {
            millis: Arc::clone(&self.millis),
        }
    }
}

impl LastSavedReader {
    pub fn get(&self) -> Option<DateTime<Utc>> {
        match self.millis.load(Ordering::Acquire) {
            UNSET => None,
            millis => DateTime::from_timestamp_millis(millis),
        }
    }
}
