//! Approval resource identity.
//!
//! Approvals do not point at a database row. They bind to a composite text
//! key naming the exact action they authorize, so the approval stops
//! matching the moment the underlying product set changes.

use crate::playbook::Playbook;

/// Resource type for playbook apply approvals.
pub const RESOURCE_TYPE_PLAYBOOK_APPLY: &str = "playbook_apply";

/// The composite key an apply approval binds to.
///
/// Includes the scope hash, so an approval granted for one product set can
/// never authorize an apply over a drifted one.
pub fn apply_resource_id(playbook: Playbook, scope_hash: &str) -> String {
    format!("{}:{scope_hash}", playbook.key())
}
