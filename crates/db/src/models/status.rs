//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Reverse lookup from a stored status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Playbook run lifecycle status.
    ///
    /// QUEUED is the only claimable state; the other four are reached
    /// exclusively through the processor.
    RunStatus {
        Queued = 1,
        Running = 2,
        Succeeded = 3,
        Failed = 4,
        /// Terminal, not retryable as-is: scope or rules moved underneath
        /// the run. A fresh preview/draft cycle is required.
        Stale = 5,
    }
}

define_status_enum! {
    /// What a playbook run does when executed.
    RunType {
        PreviewGenerate = 1,
        DraftGenerate = 2,
        Apply = 3,
    }
}

define_status_enum! {
    /// Draft lifecycle status.
    DraftStatus {
        /// Preview sample only; full generation has not run.
        Partial = 1,
        Ready = 2,
        Failed = 3,
        /// Invalidated because the catalog or rules changed.
        Expired = 4,
    }
}

define_status_enum! {
    /// Approval request status.
    ApprovalStatus {
        PendingApproval = 1,
        Approved = 2,
        Rejected = 3,
    }
}

define_status_enum! {
    /// Catalog export freshness.
    ExportStatus {
        None = 1,
        Exported = 2,
        Stale = 3,
    }
}
