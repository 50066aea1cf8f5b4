//! Issue and report types produced by a consistency run.

use serde::{Deserialize, Serialize};

use world_bible::EntityId;

/// How bad an issue is. Critical and high issues fail a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

/// Every kind of finding the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    InvalidEntity,
    UnknownEntityType,
    MissingEntity,
    MissingBidirectionalPair,
    DependencyCycle,
    OrphanedEntity,
    DuplicateNameConflictingType,
    PropertyContradiction,
    OrphanedReference,
    MissingGraphRelationship,
}

impl IssueKind {
    /// The severity every issue of this kind carries.
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::MissingEntity | IssueKind::DuplicateNameConflictingType => {
                Severity::Critical
            }
            IssueKind::InvalidEntity
            | IssueKind::UnknownEntityType
            | IssueKind::MissingBidirectionalPair
            | IssueKind::PropertyContradiction
            | IssueKind::OrphanedReference => Severity::High,
            IssueKind::DependencyCycle | IssueKind::MissingGraphRelationship => Severity::Medium,
            IssueKind::OrphanedEntity => Severity::Low,
        }
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Involved entities. The first one is the issue's primary entity.
    pub entities: Vec<EntityId>,
    /// Label of the relationship involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    /// Field path involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, entities: Vec<EntityId>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            entities,
            relationship: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn with_relationship(mut self, label: impl Into<String>) -> Self {
        self.relationship = Some(label.into());
        self
    }

    pub fn with_field(mut self, path: impl Into<String>) -> Self {
        self.field = Some(path.into());
        self
    }

    /// Entity the issue is filed under.
    pub fn primary_entity(&self) -> Option<&EntityId> {
        self.entities.first()
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

/// Counts over a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_entities: usize,
    pub valid_entities: usize,
    pub invalid_entities: usize,
    pub total_relationships: usize,
    pub total_issues: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub status: Status,
}

/// The result of one consistency run.
///
/// Contains no timestamps or other run-specific data, so the same inputs
/// serialize to the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: Summary,
    pub issues: Vec<Issue>,
    /// Records and relationship entries skipped while loading.
    pub load_errors: Vec<String>,
}

impl Report {
    /// Sort issues and compute the summary.
    ///
    /// Issues are ordered by primary entity, then kind, then message.
    pub fn new(
        mut issues: Vec<Issue>,
        total_entities: usize,
        valid_entities: usize,
        total_relationships: usize,
        load_errors: Vec<String>,
    ) -> Self {
        issues.sort_by(|a, b| {
            a.primary_entity()
                .cmp(&b.primary_entity())
                .then(a.kind.cmp(&b.kind))
                .then_with(|| a.message.cmp(&b.message))
        });

        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let status = if issues.iter().any(|i| i.severity.is_blocking()) {
            Status::Fail
        } else {
            Status::Pass
        };

        let summary = Summary {
            total_entities,
            valid_entities,
            invalid_entities: total_entities.saturating_sub(valid_entities),
            total_relationships,
            total_issues: issues.len(),
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
            status,
        };

        Self {
            summary,
            issues,
            load_errors,
        }
    }

    pub fn status(&self) -> Status {
        self.summary.status
    }

    pub fn passed(&self) -> bool {
        self.summary.status == Status::Pass
    }

    /// Process exit code for the run: 0 on pass, 2 when any critical issue
    /// was found, otherwise 1 on fail.
    pub fn exit_code(&self) -> i32 {
        match self.summary.status {
            Status::Pass => 0,
            Status::Fail if self.summary.critical > 0 => 2,
            Status::Fail => 1,
        }
    }

    /// Issues of one kind, in report order.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueKind, entity: &str, message: &str) -> Issue {
        Issue::new(kind, vec![EntityId::new(entity)], message)
    }

    #[test]
    fn test_severity_per_kind() {
        assert_eq!(IssueKind::DuplicateNameConflictingType.severity(), Severity::Critical);
        assert_eq!(IssueKind::MissingEntity.severity(), Severity::Critical);
        assert_eq!(IssueKind::OrphanedReference.severity(), Severity::High);
        assert_eq!(IssueKind::DependencyCycle.severity(), Severity::Medium);
        assert_eq!(IssueKind::OrphanedEntity.severity(), Severity::Low);
        assert!(Severity::High.is_blocking());
        assert!(!Severity::Medium.is_blocking());
    }

    #[test]
    fn test_report_sorts_issues() {
        let report = Report::new(
            vec![
                issue(IssueKind::OrphanedEntity, "location_b", "b"),
                issue(IssueKind::DependencyCycle, "event_a", "z"),
                issue(IssueKind::InvalidEntity, "location_b", "b"),
                issue(IssueKind::DependencyCycle, "event_a", "a"),
            ],
            2,
            1,
            0,
            Vec::new(),
        );

        let order: Vec<_> = report
            .issues
            .iter()
            .map(|i| (i.entities[0].as_str(), i.kind, i.message.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("event_a", IssueKind::DependencyCycle, "a"),
                ("event_a", IssueKind::DependencyCycle, "z"),
                ("location_b", IssueKind::InvalidEntity, "b"),
                ("location_b", IssueKind::OrphanedEntity, "b"),
            ]
        );
    }

    #[test]
    fn test_status_counts_only_blocking_issues() {
        let passing = Report::new(
            vec![
                issue(IssueKind::OrphanedEntity, "faction_x", "orphan"),
                issue(IssueKind::DependencyCycle, "event_a", "cycle"),
            ],
            1,
            1,
            0,
            Vec::new(),
        );
        assert!(passing.passed());
        assert_eq!(passing.exit_code(), 0);
        assert_eq!(passing.summary.medium, 1);
        assert_eq!(passing.summary.low, 1);

        let failing = Report::new(
            vec![issue(IssueKind::MissingEntity, "location_missing", "missing")],
            0,
            0,
            1,
            Vec::new(),
        );
        assert_eq!(failing.status(), Status::Fail);
        assert_eq!(failing.exit_code(), 2);
        assert_eq!(failing.issues_of(IssueKind::MissingEntity).count(), 1);

        let high_only = Report::new(
            vec![issue(IssueKind::OrphanedReference, "location_a", "dangling")],
            1,
            1,
            0,
            Vec::new(),
        );
        assert_eq!(high_only.status(), Status::Fail);
        assert_eq!(high_only.exit_code(), 1);
    }

    #[test]
    fn test_json_shape() {
        let report = Report::new(
            vec![issue(IssueKind::OrphanedEntity, "faction_x", "orphan").with_field("name")],
            1,
            1,
            0,
            Vec::new(),
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["summary"]["status"], "PASS");
        assert_eq!(value["summary"]["totalEntities"], 1);
        assert_eq!(value["issues"][0]["kind"], "orphaned-entity");
        assert_eq!(value["issues"][0]["severity"], "low");
        assert_eq!(value["issues"][0]["field"], "name");
        assert!(value["issues"][0].get("relationship").is_none());
    }
}
