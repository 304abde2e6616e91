//! Event type names.
//!
//! Each constant matches a seeded `event_types.name` row. Publishing an
//! event whose name is missing from the lookup table fails loudly at
//! persist time, so new names must land in both places.

/// A playbook run was created and queued.
pub const RUN_QUEUED: &str = "run.queued";

/// A worker claimed a run and began executing.
pub const RUN_STARTED: &str = "run.started";

/// A run finished successfully.
pub const RUN_SUCCEEDED: &str = "run.succeeded";

/// A run finished with an error.
pub const RUN_FAILED: &str = "run.failed";

/// A run aborted because its scope or rules went stale.
pub const RUN_STALE: &str = "run.stale";

/// A preview or full draft was generated.
pub const DRAFT_CREATED: &str = "draft.created";

/// A full draft finished generating.
pub const DRAFT_READY: &str = "draft.ready";

/// An approval request was opened.
pub const APPROVAL_REQUESTED: &str = "approval.requested";

/// An approval request was approved.
pub const APPROVAL_APPROVED: &str = "approval.approved";

/// An approval request was rejected.
pub const APPROVAL_REJECTED: &str = "approval.rejected";

/// An approval was consumed by a completed apply.
pub const APPROVAL_CONSUMED: &str = "approval.consumed";

/// An apply pass finished and wrote product fields.
pub const PLAYBOOK_APPLIED: &str = "playbook.applied";
