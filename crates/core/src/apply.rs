//! Apply loop outcome types.
//!
//! The engine drives the per-item fixer; this module owns the report the
//! loop emits and the bookkeeping invariants around it (counters always
//! agree with `results`, a stopped report names the item it stopped at).
//! The caller can always tell exactly how far the loop got.

use serde::Serialize;

use crate::types::DbId;

/// How many times a single item is retried after a rate-limit signal
/// before the loop stops. Deliberately a fixed constant: partial progress
/// must stay bounded in time.
pub const RATE_LIMIT_MAX_RETRIES: u32 = 1;

/// Outcome of one item inside an apply loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// The field was changed.
    Updated,
    /// Nothing to do for this item (not an error).
    Skipped,
    /// Unexpected error; the loop stopped here.
    Failed,
    /// The daily quota ran out at this item; the loop stopped here.
    LimitReached,
    /// Throttled past the retry budget; the loop stopped here.
    RateLimited,
}

/// Why a loop stopped before covering the whole scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    Error,
    LimitReached,
    RateLimited,
}

/// Per-item record in an [`ApplyReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    pub product_id: DbId,
    pub status: ItemStatus,
    /// The field that was written, for UPDATED items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Error detail, for FAILED items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The full result of one apply pass. Partial progress is always visible:
/// every attempted item appears in `results`, and a stop names its reason
/// and position.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub total_affected: i64,
    pub attempted: i64,
    pub updated: i64,
    pub skipped: i64,
    pub limit_reached: bool,
    pub stopped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at_product_id: Option<DbId>,
    pub results: Vec<ItemResult>,
}

impl ApplyReport {
    /// Start a report for a scope of `total_affected` items.
    pub fn new(total_affected: i64) -> Self {
        Self {
            total_affected,
            attempted: 0,
            updated: 0,
            skipped: 0,
            limit_reached: false,
            stopped: false,
            failure_reason: None,
            stopped_at_product_id: None,
            results: Vec::new(),
        }
    }

    /// Record a successful field update.
    pub fn record_updated(&mut self, product_id: DbId, field: impl Into<String>) {
        self.attempted += 1;
        self.updated += 1;
        self.results.push(ItemResult {
            product_id,
            status: ItemStatus::Updated,
            field: Some(field.into()),
            message: None,
        });
    }

    /// Record a no-op item.
    pub fn record_skipped(&mut self, product_id: DbId) {
        self.attempted += 1;
        self.skipped += 1;
        self.results.push(ItemResult {
            product_id,
            status: ItemStatus::Skipped,
            field: None,
            message: None,
        });
    }

    /// Record an unexpected per-item error and stop the loop.
    pub fn stop_failed(&mut self, product_id: DbId, message: impl Into<String>) {
        self.attempted += 1;
        self.results.push(ItemResult {
            product_id,
            status: ItemStatus::Failed,
            field: None,
            message: Some(message.into()),
        });
        self.stopped = true;
        self.failure_reason = Some(FailureReason::Error);
        self.stopped_at_product_id = Some(product_id);
    }

    /// Record a quota-exhaustion stop. This is not a failure: the quota ran
    /// out, already-updated items stay counted.
    pub fn stop_limit_reached(&mut self, product_id: DbId) {
        self.attempted += 1;
        self.results.push(ItemResult {
            product_id,
            status: ItemStatus::LimitReached,
            field: None,
            message: None,
        });
        self.stopped = true;
        self.limit_reached = true;
        self.failure_reason = Some(FailureReason::LimitReached);
        self.stopped_at_product_id = Some(product_id);
    }

    /// Record a stop after the rate-limit retry budget ran out.
    pub fn stop_rate_limited(&mut self, product_id: DbId) {
        self.attempted += 1;
        self.results.push(ItemResult {
            product_id,
            status: ItemStatus::RateLimited,
            field: None,
            message: None,
        });
        self.stopped = true;
        self.failure_reason = Some(FailureReason::RateLimited);
        self.stopped_at_product_id = Some(product_id);
    }
}
