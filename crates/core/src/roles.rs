//! Project role names and the capability sets they grant.
//!
//! Role names must match the seed data in the `project_members.role` check
//! constraint. Capabilities are what API callers and the work queue use to
//! decide which actions to expose; the approval gate re-checks them on the
//! server side.

use serde::Serialize;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

/// All valid role values.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR, ROLE_VIEWER];

/// What a project member is allowed to do with playbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_apply: bool,
    pub can_approve: bool,
    pub can_generate_drafts: bool,
    pub can_request_approval: bool,
}

impl Capabilities {
    /// The empty capability set (unknown role, non-member).
    pub const NONE: Capabilities = Capabilities {
        can_apply: false,
        can_approve: false,
        can_generate_drafts: false,
        can_request_approval: false,
    };
}

/// Resolve the capability set for a role name.
///
/// Unknown roles resolve to [`Capabilities::NONE`]; resolution fails
/// closed, never open.
pub fn capabilities_for_role(role: &str) -> Capabilities {
    match role {
        ROLE_ADMIN => Capabilities {
            can_apply: true,
            can_approve: true,
            can_generate_drafts: true,
            can_request_approval: true,
        },
        ROLE_EDITOR => Capabilities {
            can_apply: true,
            can_approve: false,
            can_generate_drafts: true,
            can_request_approval: true,
        },
        ROLE_VIEWER => Capabilities::NONE,
        _ => Capabilities::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_capability() {
        let caps = capabilities_for_role(ROLE_ADMIN);
        assert!(caps.can_apply);
        assert!(caps.can_approve);
        assert!(caps.can_generate_drafts);
        assert!(caps.can_request_approval);
    }

    #[test]
    fn editor_cannot_approve() {
        let caps = capabilities_for_role(ROLE_EDITOR);
        assert!(caps.can_apply);
        assert!(!caps.can_approve);
        assert!(caps.can_generate_drafts);
        assert!(caps.can_request_approval);
    }

    #[test]
    fn viewer_has_nothing() {
        assert_eq!(capabilities_for_role(ROLE_VIEWER), Capabilities::NONE);
    }

    #[test]
    fn unknown_role_fails_closed() {
        assert_eq!(capabilities_for_role("superuser"), Capabilities::NONE);
        assert_eq!(capabilities_for_role(""), Capabilities::NONE);
    }
}
