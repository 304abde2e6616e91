//! Work queue derivation.
//!
//! A pure read-time projection: raw issue signals, the latest run/draft/
//! approval per playbook, and export state go in; ranked action bundles
//! come out. Nothing here is persisted and nothing here mutates, so the
//! same inputs always reproduce the same ordering. Callers load the rows,
//! map them into the snapshot types below, and call [`derive_queue`].

use std::cmp::Ordering;

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::issue::{ActionKey, IssueSeverity, ALL_ACTION_KEYS};
use crate::playbook::Playbook;
use crate::roles::Capabilities;
use crate::types::{DbId, Timestamp};

/// How long a completed apply keeps a bundle in the APPLIED state before
/// it falls back to the regular precedence.
pub const APPLIED_RECENCY_WINDOW_HOURS: i64 = 24;

/// Sort rank for the export bundle, after every action category.
const EXPORT_IMPACT_RANK: u8 = 6;

// ---------------------------------------------------------------------------
// Output vocabulary
// ---------------------------------------------------------------------------

/// Kind of work a bundle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleType {
    Playbook,
    IssueGroup,
    Export,
}

impl BundleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playbook => "playbook",
            Self::IssueGroup => "issue_group",
            Self::Export => "export",
        }
    }

    /// Parse the `bundle_type` query filter.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "playbook" => Ok(Self::Playbook),
            "issue_group" => Ok(Self::IssueGroup),
            "export" => Ok(Self::Export),
            other => Err(CoreError::Validation(format!(
                "unknown bundle type: {other}"
            ))),
        }
    }
}

/// Bundle health, folded from the worst open-issue severity present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Health {
    Critical,
    NeedsAttention,
    Healthy,
}

impl Health {
    /// Second sort key. Lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::NeedsAttention => 1,
            Self::Healthy => 2,
        }
    }

    fn from_worst_severity(worst: Option<IssueSeverity>) -> Self {
        match worst {
            Some(IssueSeverity::Critical) => Self::Critical,
            Some(IssueSeverity::Warning) => Self::NeedsAttention,
            _ => Self::Healthy,
        }
    }
}

/// Where a bundle sits in its lifecycle. Derived from draft/approval/run
/// state by fixed precedence, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleState {
    PendingApproval,
    Approved,
    DraftsReady,
    Previewed,
    Failed,
    Blocked,
    New,
    Applied,
}

impl BundleState {
    /// First sort key. Lower sorts first. `Failed` and `Blocked` share a
    /// tier; `Applied` sorts last because it needs no attention.
    pub fn priority(self) -> u8 {
        match self {
            Self::PendingApproval => 0,
            Self::Approved => 1,
            Self::DraftsReady => 2,
            Self::Previewed => 3,
            Self::Failed => 4,
            Self::Blocked => 4,
            Self::New => 5,
            Self::Applied => 6,
        }
    }
}

/// How acting on a bundle consumes AI quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiUsage {
    AiAssisted,
    Manual,
    None,
}

/// The requested queue view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueTab {
    #[default]
    All,
    Automations,
    Issues,
    Approvals,
}

impl QueueTab {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "all" => Ok(Self::All),
            "automations" => Ok(Self::Automations),
            "issues" => Ok(Self::Issues),
            "approvals" => Ok(Self::Approvals),
            other => Err(CoreError::Validation(format!("unknown tab: {other}"))),
        }
    }
}

/// Filters applied after derivation, before sorting.
#[derive(Debug, Clone, Default)]
pub struct QueueFilter {
    pub tab: QueueTab,
    pub bundle_type: Option<BundleType>,
    pub bundle_id: Option<String>,
}

/// The caller's identity as echoed back in the queue response, so the
/// client can decide which CTAs to render without a second round trip.
#[derive(Debug, Clone, Serialize)]
pub struct Viewer {
    pub role: String,
    pub capabilities: Capabilities,
}

/// Active approval request attached to a playbook bundle.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalSummary {
    pub id: DbId,
    pub status: ApprovalPhase,
    pub requested_by: DbId,
    pub updated_at: Timestamp,
}

/// Draft attached to a playbook bundle.
#[derive(Debug, Clone, Serialize)]
pub struct DraftSummary {
    pub id: DbId,
    pub status: DraftPhase,
    pub item_count: i64,
    pub updated_at: Timestamp,
}

/// One ranked unit of pending work.
#[derive(Debug, Clone, Serialize)]
pub struct ActionBundle {
    pub bundle_id: String,
    pub bundle_type: BundleType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_key: Option<ActionKey>,
    pub health: Health,
    pub state: BundleState,
    pub scope_type: &'static str,
    pub scope_count: i64,
    pub impact_rank: u8,
    pub ai_usage: AiUsage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<DraftSummary>,
}

// ---------------------------------------------------------------------------
// Input snapshots
// ---------------------------------------------------------------------------

/// One open issue row as the crawler recorded it.
#[derive(Debug, Clone)]
pub struct IssueSignal {
    pub category: String,
    pub severity: IssueSeverity,
    pub updated_at: Timestamp,
}

/// Terminal-or-not phase of the latest run for a playbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Queued,
    Running,
    Succeeded,
    Failed,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftPhase {
    Partial,
    Ready,
    Failed,
    Expired,
}

/// Phase of an active (unconsumed) approval request. Rejected and consumed
/// requests are not active and must not be passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalPhase {
    Pending,
    Approved,
}

#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct DraftSnapshot {
    pub id: DbId,
    pub phase: DraftPhase,
    pub item_count: i64,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ApprovalSnapshot {
    pub id: DbId,
    pub phase: ApprovalPhase,
    pub requested_by: DbId,
    pub updated_at: Timestamp,
}

/// Everything the derivation needs to place one playbook in the queue.
#[derive(Debug, Clone)]
pub struct PlaybookSignal {
    pub playbook: Playbook,
    /// Products currently matching the playbook predicate.
    pub affected_count: i64,
    pub run: Option<RunSnapshot>,
    pub draft: Option<DraftSnapshot>,
    pub approval: Option<ApprovalSnapshot>,
    /// The project's plan does not allow bulk automations.
    pub plan_blocked: bool,
    /// Finish time of the most recent successful apply.
    pub last_applied_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    None,
    Exported,
    Stale,
}

/// Catalog export/share-link state.
#[derive(Debug, Clone)]
pub struct ExportSignal {
    pub phase: ExportPhase,
    pub product_count: i64,
    pub updated_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the filtered, sorted queue for one project.
pub fn derive_queue(
    now: Timestamp,
    issues: &[IssueSignal],
    playbooks: &[PlaybookSignal],
    export: Option<&ExportSignal>,
    filter: &QueueFilter,
) -> Vec<ActionBundle> {
    let mut bundles = Vec::new();

    // Classify every issue exactly once; iterate the fixed key list so the
    // grouping order never depends on input order.
    let classified: Vec<(ActionKey, &IssueSignal)> = issues
        .iter()
        .map(|issue| (ActionKey::classify(&issue.category), issue))
        .collect();
    for key in ALL_ACTION_KEYS {
        let group: Vec<&IssueSignal> = classified
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, issue)| *issue)
            .collect();
        if group.is_empty() {
            continue;
        }
        bundles.push(issue_group_bundle(*key, &group));
    }

    for signal in playbooks {
        bundles.push(playbook_bundle(now, signal, &classified));
    }

    if let Some(signal) = export {
        bundles.push(export_bundle(signal));
    }

    bundles.retain(|bundle| matches_filter(bundle, filter));
    bundles.sort_by(bundle_order);
    bundles
}

fn issue_group_bundle(key: ActionKey, group: &[&IssueSignal]) -> ActionBundle {
    let worst = group.iter().map(|issue| issue.severity).max();
    let updated_at = group.iter().map(|issue| issue.updated_at).max();
    ActionBundle {
        bundle_id: format!("issues:{}", key.as_str()),
        bundle_type: BundleType::IssueGroup,
        title: key.label().to_string(),
        action_key: Some(key),
        health: Health::from_worst_severity(worst),
        state: BundleState::New,
        scope_type: "products",
        scope_count: group.len() as i64,
        impact_rank: key.impact_rank(),
        ai_usage: AiUsage::Manual,
        updated_at,
        approval: None,
        draft: None,
    }
}

fn playbook_bundle(
    now: Timestamp,
    signal: &PlaybookSignal,
    classified: &[(ActionKey, &IssueSignal)],
) -> ActionBundle {
    let key = signal.playbook.action_key();
    let worst = classified
        .iter()
        .filter(|(k, _)| *k == key)
        .map(|(_, issue)| issue.severity)
        .max();

    let updated_at = [
        signal.run.as_ref().map(|r| r.updated_at),
        signal.draft.as_ref().map(|d| d.updated_at),
        signal.approval.as_ref().map(|a| a.updated_at),
        signal.last_applied_at,
    ]
    .into_iter()
    .flatten()
    .max();

    ActionBundle {
        bundle_id: format!("playbook:{}", signal.playbook.key()),
        bundle_type: BundleType::Playbook,
        title: signal.playbook.label().to_string(),
        action_key: Some(key),
        health: Health::from_worst_severity(worst),
        state: playbook_state(now, signal),
        scope_type: "products",
        scope_count: signal.affected_count,
        impact_rank: key.impact_rank(),
        ai_usage: AiUsage::AiAssisted,
        updated_at,
        approval: signal.approval.as_ref().map(|a| ApprovalSummary {
            id: a.id,
            status: a.phase,
            requested_by: a.requested_by,
            updated_at: a.updated_at,
        }),
        draft: signal.draft.as_ref().map(|d| DraftSummary {
            id: d.id,
            status: d.phase,
            item_count: d.item_count,
            updated_at: d.updated_at,
        }),
    }
}

/// Fixed state precedence, with the time-boxed APPLIED override on top.
///
/// The override fires only when the apply finished inside the recency
/// window AND is newer than any draft/approval activity. A fresh draft or
/// a new approval request restarts the cycle even right after an apply.
fn playbook_state(now: Timestamp, signal: &PlaybookSignal) -> BundleState {
    if let Some(applied_at) = signal.last_applied_at {
        let fresh = now - applied_at <= Duration::hours(APPLIED_RECENCY_WINDOW_HOURS);
        let newest = signal
            .draft
            .as_ref()
            .map_or(true, |d| applied_at >= d.updated_at)
            && signal
                .approval
                .as_ref()
                .map_or(true, |a| applied_at >= a.updated_at);
        if fresh && newest {
            return BundleState::Applied;
        }
    }

    match signal.approval.as_ref().map(|a| a.phase) {
        Some(ApprovalPhase::Pending) => return BundleState::PendingApproval,
        Some(ApprovalPhase::Approved) => return BundleState::Approved,
        None => {}
    }
    match signal.draft.as_ref().map(|d| d.phase) {
        Some(DraftPhase::Ready) => return BundleState::DraftsReady,
        Some(DraftPhase::Partial) => return BundleState::Previewed,
        _ => {}
    }
    if matches!(
        signal.run.as_ref().map(|r| r.phase),
        Some(RunPhase::Failed | RunPhase::Stale)
    ) {
        return BundleState::Failed;
    }
    if signal.plan_blocked {
        return BundleState::Blocked;
    }
    BundleState::New
}

fn export_bundle(signal: &ExportSignal) -> ActionBundle {
    let (state, health) = match signal.phase {
        ExportPhase::None => (BundleState::New, Health::Healthy),
        ExportPhase::Exported => (BundleState::Applied, Health::Healthy),
        ExportPhase::Stale => (BundleState::New, Health::NeedsAttention),
    };
    ActionBundle {
        bundle_id: "export:catalog".to_string(),
        bundle_type: BundleType::Export,
        title: "Catalog export".to_string(),
        action_key: None,
        health,
        state,
        scope_type: "catalog",
        scope_count: signal.product_count,
        impact_rank: EXPORT_IMPACT_RANK,
        ai_usage: AiUsage::None,
        updated_at: signal.updated_at,
        approval: None,
        draft: None,
    }
}

fn matches_filter(bundle: &ActionBundle, filter: &QueueFilter) -> bool {
    let tab_ok = match filter.tab {
        QueueTab::All => true,
        QueueTab::Automations => {
            matches!(bundle.bundle_type, BundleType::Playbook | BundleType::Export)
        }
        QueueTab::Issues => bundle.bundle_type == BundleType::IssueGroup,
        QueueTab::Approvals => bundle.state == BundleState::PendingApproval,
    };
    tab_ok
        && filter
            .bundle_type
            .map_or(true, |t| bundle.bundle_type == t)
        && filter
            .bundle_id
            .as_deref()
            .map_or(true, |id| bundle.bundle_id == id)
}

/// Total-order comparator: state, health, impact rank, most recent first,
/// bundle id. The final key makes ties impossible, so the ordering is
/// fully deterministic.
fn bundle_order(a: &ActionBundle, b: &ActionBundle) -> Ordering {
    a.state
        .priority()
        .cmp(&b.state.priority())
        .then_with(|| a.health.priority().cmp(&b.health.priority()))
        .then_with(|| a.impact_rank.cmp(&b.impact_rank))
        .then_with(|| cmp_most_recent_first(a.updated_at, b.updated_at))
        .then_with(|| a.bundle_id.cmp(&b.bundle_id))
}

/// Newest first; bundles with no activity sort after all dated ones.
fn cmp_most_recent_first(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn issue(category: &str, severity: IssueSeverity, hour: u32) -> IssueSignal {
        IssueSignal {
            category: category.to_string(),
            severity,
            updated_at: at(hour),
        }
    }

    fn bare_playbook(playbook: Playbook) -> PlaybookSignal {
        PlaybookSignal {
            playbook,
            affected_count: 10,
            run: None,
            draft: None,
            approval: None,
            plan_blocked: false,
            last_applied_at: None,
        }
    }

    fn draft(phase: DraftPhase, hour: u32) -> DraftSnapshot {
        DraftSnapshot {
            id: 1,
            phase,
            item_count: 10,
            updated_at: at(hour),
        }
    }

    fn approval(phase: ApprovalPhase, hour: u32) -> ApprovalSnapshot {
        ApprovalSnapshot {
            id: 7,
            phase,
            requested_by: 2,
            updated_at: at(hour),
        }
    }

    #[test]
    fn issues_group_into_fixed_buckets_with_default() {
        let issues = vec![
            issue("missing product title", IssueSeverity::Critical, 1),
            issue("short title", IssueSeverity::Warning, 2),
            issue("seo meta absent", IssueSeverity::Warning, 3),
            issue("weird crawler thing", IssueSeverity::Info, 4),
        ];
        let bundles = derive_queue(at(12), &issues, &[], None, &QueueFilter::default());

        let ids: Vec<&str> = bundles.iter().map(|b| b.bundle_id.as_str()).collect();
        assert!(ids.contains(&"issues:missing_titles"));
        assert!(ids.contains(&"issues:missing_seo"));
        assert!(ids.contains(&"issues:other"));
        assert_eq!(bundles.len(), 3);

        let titles = bundles
            .iter()
            .find(|b| b.bundle_id == "issues:missing_titles")
            .unwrap();
        assert_eq!(titles.scope_count, 2);
        assert_eq!(titles.health, Health::Critical);
        assert_eq!(titles.updated_at, Some(at(2)));
        assert_eq!(titles.ai_usage, AiUsage::Manual);
    }

    #[test]
    fn empty_groups_produce_no_bundle() {
        let bundles = derive_queue(at(12), &[], &[], None, &QueueFilter::default());
        assert!(bundles.is_empty());
    }

    #[test]
    fn pending_approval_beats_ready_draft() {
        let mut signal = bare_playbook(Playbook::FillMissingTitles);
        signal.draft = Some(draft(DraftPhase::Ready, 3));
        signal.approval = Some(approval(ApprovalPhase::Pending, 4));
        assert_eq!(playbook_state(at(12), &signal), BundleState::PendingApproval);

        signal.approval = Some(approval(ApprovalPhase::Approved, 4));
        assert_eq!(playbook_state(at(12), &signal), BundleState::Approved);
    }

    #[test]
    fn draft_phases_map_to_ready_and_previewed() {
        let mut signal = bare_playbook(Playbook::FillMissingTitles);
        signal.draft = Some(draft(DraftPhase::Ready, 3));
        assert_eq!(playbook_state(at(12), &signal), BundleState::DraftsReady);

        signal.draft = Some(draft(DraftPhase::Partial, 3));
        assert_eq!(playbook_state(at(12), &signal), BundleState::Previewed);

        // Expired drafts no longer hold a state.
        signal.draft = Some(draft(DraftPhase::Expired, 3));
        assert_eq!(playbook_state(at(12), &signal), BundleState::New);
    }

    #[test]
    fn failed_run_and_blocked_plan_surface() {
        let mut signal = bare_playbook(Playbook::FillMissingTitles);
        signal.run = Some(RunSnapshot {
            phase: RunPhase::Stale,
            updated_at: at(3),
        });
        assert_eq!(playbook_state(at(12), &signal), BundleState::Failed);

        signal.run = None;
        signal.plan_blocked = true;
        assert_eq!(playbook_state(at(12), &signal), BundleState::Blocked);
    }

    #[test]
    fn applied_override_is_time_boxed() {
        let mut signal = bare_playbook(Playbook::FillMissingTitles);
        signal.draft = Some(draft(DraftPhase::Ready, 3));
        signal.last_applied_at = Some(at(5));

        // Apply at 05:00, viewed at 12:00: inside the window, newer than
        // the draft, so the override holds.
        assert_eq!(playbook_state(at(12), &signal), BundleState::Applied);

        // Viewed 25h later the override has lapsed.
        let next_day = at(5) + Duration::hours(25);
        assert_eq!(playbook_state(next_day, &signal), BundleState::DraftsReady);
    }

    #[test]
    fn newer_draft_activity_cancels_applied_override() {
        let mut signal = bare_playbook(Playbook::FillMissingTitles);
        signal.last_applied_at = Some(at(5));
        signal.draft = Some(draft(DraftPhase::Ready, 6));
        assert_eq!(playbook_state(at(12), &signal), BundleState::DraftsReady);

        let mut signal = bare_playbook(Playbook::FillMissingTitles);
        signal.last_applied_at = Some(at(5));
        signal.approval = Some(approval(ApprovalPhase::Pending, 6));
        assert_eq!(playbook_state(at(12), &signal), BundleState::PendingApproval);
    }

    #[test]
    fn ordering_is_deterministic_under_input_shuffle() {
        let issues_a = vec![
            issue("missing title", IssueSeverity::Warning, 1),
            issue("broken image", IssueSeverity::Critical, 2),
            issue("stale sync", IssueSeverity::Info, 3),
        ];
        let issues_b: Vec<IssueSignal> = issues_a.iter().rev().cloned().collect();

        let playbooks_a = vec![
            bare_playbook(Playbook::FillMissingTitles),
            bare_playbook(Playbook::FillMissingSeo),
            bare_playbook(Playbook::FillMissingDescriptions),
        ];
        let playbooks_b: Vec<PlaybookSignal> = playbooks_a.iter().rev().cloned().collect();

        let export = ExportSignal {
            phase: ExportPhase::Stale,
            product_count: 40,
            updated_at: Some(at(4)),
        };

        let first = derive_queue(
            at(12),
            &issues_a,
            &playbooks_a,
            Some(&export),
            &QueueFilter::default(),
        );
        let second = derive_queue(
            at(12),
            &issues_b,
            &playbooks_b,
            Some(&export),
            &QueueFilter::default(),
        );

        let first_ids: Vec<&str> = first.iter().map(|b| b.bundle_id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|b| b.bundle_id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn sort_ranks_state_before_health_before_impact() {
        let mut pending = bare_playbook(Playbook::FillMissingSeo);
        pending.approval = Some(approval(ApprovalPhase::Pending, 2));
        let playbooks = vec![bare_playbook(Playbook::FillMissingTitles), pending];

        // No open issues: every bundle is Healthy, so state decides.
        let bundles = derive_queue(at(12), &[], &playbooks, None, &QueueFilter::default());
        assert_eq!(bundles[0].bundle_id, "playbook:fill-missing-seo");
        assert_eq!(bundles[0].state, BundleState::PendingApproval);
        assert_eq!(bundles[1].bundle_id, "playbook:fill-missing-titles");
    }

    #[test]
    fn updated_at_none_sorts_after_dated_bundles() {
        assert_eq!(
            cmp_most_recent_first(Some(at(1)), None),
            Ordering::Less
        );
        assert_eq!(
            cmp_most_recent_first(None, Some(at(1))),
            Ordering::Greater
        );
        assert_eq!(
            cmp_most_recent_first(Some(at(2)), Some(at(1))),
            Ordering::Less
        );
    }

    #[test]
    fn tabs_filter_by_bundle_kind_and_state() {
        let issues = vec![issue("missing title", IssueSeverity::Warning, 1)];
        let mut pending = bare_playbook(Playbook::FillMissingTitles);
        pending.approval = Some(approval(ApprovalPhase::Pending, 2));
        let playbooks = vec![pending, bare_playbook(Playbook::FillMissingSeo)];
        let export = ExportSignal {
            phase: ExportPhase::None,
            product_count: 12,
            updated_at: None,
        };

        let tab = |tab: QueueTab| QueueFilter {
            tab,
            ..QueueFilter::default()
        };

        let all = derive_queue(at(12), &issues, &playbooks, Some(&export), &tab(QueueTab::All));
        assert_eq!(all.len(), 4);

        let automations = derive_queue(
            at(12),
            &issues,
            &playbooks,
            Some(&export),
            &tab(QueueTab::Automations),
        );
        assert!(automations
            .iter()
            .all(|b| b.bundle_type != BundleType::IssueGroup));
        assert_eq!(automations.len(), 3);

        let issues_tab = derive_queue(
            at(12),
            &issues,
            &playbooks,
            Some(&export),
            &tab(QueueTab::Issues),
        );
        assert_eq!(issues_tab.len(), 1);
        assert_eq!(issues_tab[0].bundle_type, BundleType::IssueGroup);

        let approvals = derive_queue(
            at(12),
            &issues,
            &playbooks,
            Some(&export),
            &tab(QueueTab::Approvals),
        );
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].state, BundleState::PendingApproval);
    }

    #[test]
    fn bundle_id_filter_narrows_to_one() {
        let playbooks = vec![
            bare_playbook(Playbook::FillMissingTitles),
            bare_playbook(Playbook::FillMissingSeo),
        ];
        let filter = QueueFilter {
            bundle_id: Some("playbook:fill-missing-seo".to_string()),
            ..QueueFilter::default()
        };
        let bundles = derive_queue(at(12), &[], &playbooks, None, &filter);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].bundle_id, "playbook:fill-missing-seo");
    }

    #[test]
    fn wire_casing_matches_contract() {
        assert_eq!(
            serde_json::to_string(&BundleState::PendingApproval).unwrap(),
            "\"PENDING_APPROVAL\""
        );
        assert_eq!(
            serde_json::to_string(&Health::NeedsAttention).unwrap(),
            "\"NEEDS_ATTENTION\""
        );
        assert_eq!(
            serde_json::to_string(&AiUsage::AiAssisted).unwrap(),
            "\"ai_assisted\""
        );
        assert_eq!(
            serde_json::to_string(&BundleType::IssueGroup).unwrap(),
            "\"issue_group\""
        );
    }
}
