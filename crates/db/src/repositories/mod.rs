//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod approval_repo;
pub mod draft_repo;
pub mod event_repo;
pub mod export_repo;
pub mod issue_repo;
pub mod playbook_setting_repo;
pub mod product_repo;
pub mod project_repo;
pub mod run_repo;
pub mod usage_repo;
pub mod user_repo;

pub use approval_repo::ApprovalRepo;
pub use draft_repo::DraftRepo;
pub use event_repo::EventRepo;
pub use export_repo::ExportRepo;
pub use issue_repo::IssueRepo;
pub use playbook_setting_repo::PlaybookSettingRepo;
pub use product_repo::ProductRepo;
pub use project_repo::ProjectRepo;
pub use run_repo::RunRepo;
pub use usage_repo::UsageRepo;
pub use user_repo::UserRepo;
