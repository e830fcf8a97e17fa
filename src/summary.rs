//! Roll-up of classified files by role.
//!
//! Produces the per-role totals, key ratios against core code and a
//! breakdown of how much of the codebase was classified with high
//! confidence, by heuristics, or by explicit override.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::{FileRecord, Role, Signal, TestKind};

/// Records at or above this confidence count as auto-classified.
pub const HIGH_CONFIDENCE: f32 = 0.80;

/// Totals for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responsibility {
    pub role: Role,
    pub loc: usize,
    pub files: usize,
    /// LOC-weighted mean confidence.
    pub confidence: f32,
    /// Share of test LOC per test kind. Only filled for `Role::Test`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakdown: BTreeMap<TestKind, f32>,
}

/// LOC of selected roles relative to core LOC.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ratios {
    pub test_to_core: f32,
    pub infra_to_core: f32,
    pub docs_to_core: f32,
    pub generated_to_core: f32,
    pub config_to_core: f32,
}

/// Share of LOC by how it was classified.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub auto_classified: f32,
    pub heuristic: f32,
    #[serde(rename = "override")]
    pub override_: f32,
}

/// Everything the aggregator needs from a classified batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub files: usize,
    pub loc: usize,
    pub responsibilities: Vec<Responsibility>,
    pub ratios: Ratios,
    pub confidence: ConfidenceBreakdown,
}

#[derive(Default)]
struct RoleAccum {
    loc: usize,
    files: usize,
    confidence_sum: f64,
    sub_role_loc: BTreeMap<TestKind, usize>,
}

/// Per-role totals, largest first. Equal LOC falls back to role priority.
pub fn compute_responsibilities(records: &[FileRecord]) -> Vec<Responsibility> {
    let mut by_role: HashMap<Role, RoleAccum> = HashMap::new();

    for r in records {
        let acc = by_role.entry(r.role).or_default();
        acc.loc += r.loc;
        acc.files += 1;
        acc.confidence_sum += f64::from(r.confidence) * r.loc as f64;
        if r.role == Role::Test {
            if let Some(kind) = r.sub_role {
                *acc.sub_role_loc.entry(kind).or_insert(0) += r.loc;
            }
        }
    }

    let mut result: Vec<Responsibility> = by_role
        .into_iter()
        .map(|(role, acc)| {
            let confidence = if acc.loc > 0 {
                (acc.confidence_sum / acc.loc as f64) as f32
            } else {
                0.0
            };
            let breakdown = if role == Role::Test && acc.loc > 0 {
                acc.sub_role_loc
                    .into_iter()
                    .map(|(kind, loc)| (kind, loc as f32 / acc.loc as f32))
                    .collect()
            } else {
                BTreeMap::new()
            };
            Responsibility {
                role,
                loc: acc.loc,
                files: acc.files,
                confidence,
                breakdown,
            }
        })
        .collect();

    result.sort_by(|a, b| {
        b.loc
            .cmp(&a.loc)
            .then_with(|| a.role.priority().cmp(&b.role.priority()))
    });
    result
}

/// Ratios of other roles to core. A codebase without core LOC divides by 1.
pub fn compute_ratios(responsibilities: &[Responsibility]) -> Ratios {
    let loc_of = |role: Role| {
        responsibilities
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.loc)
            .unwrap_or(0)
    };
    let core = loc_of(Role::Core).max(1) as f32;

    Ratios {
        test_to_core: loc_of(Role::Test) as f32 / core,
        infra_to_core: loc_of(Role::Infra) as f32 / core,
        docs_to_core: loc_of(Role::Docs) as f32 / core,
        generated_to_core: loc_of(Role::Generated) as f32 / core,
        config_to_core: loc_of(Role::Config) as f32 / core,
    }
}

/// LOC shares: high confidence, explicit override, and everything else.
pub fn compute_confidence(records: &[FileRecord]) -> ConfidenceBreakdown {
    let mut total = 0usize;
    let mut high = 0usize;
    let mut overridden = 0usize;

    for r in records {
        total += r.loc;
        if r.confidence >= HIGH_CONFIDENCE {
            high += r.loc;
        }
        if r.has_signal(Signal::Override) {
            overridden += r.loc;
        }
    }

    if total == 0 {
        return ConfidenceBreakdown::default();
    }

    let total = total as f32;
    ConfidenceBreakdown {
        auto_classified: high as f32 / total,
        heuristic: (total - high as f32 - overridden as f32) / total,
        override_: overridden as f32 / total,
    }
}

/// Full roll-up of a classified batch.
pub fn summarize(records: &[FileRecord]) -> Summary {
    let responsibilities = compute_responsibilities(records);
    let ratios = compute_ratios(&responsibilities);
    Summary {
        files: records.len(),
        loc: records.iter().map(|r| r.loc).sum(),
        responsibilities,
        ratios,
        confidence: compute_confidence(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineMetrics;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn make_record(role: Role, loc: usize, confidence: f32) -> FileRecord {
        FileRecord {
            path: format!("{}.go", role),
            loc,
            lines: LineMetrics::default(),
            language: "Go".to_string(),
            role,
            sub_role: None,
            confidence,
            signals: vec![Signal::Path],
            embedded: None,
        }
    }

    #[test]
    fn test_responsibilities_totals_and_order() {
        let records = vec![
            make_record(Role::Core, 100, 0.3),
            make_record(Role::Core, 300, 0.7),
            make_record(Role::Docs, 50, 0.5),
            make_record(Role::Test, 200, 0.6),
        ];

        let resp = compute_responsibilities(&records);
        let roles: Vec<Role> = resp.iter().map(|r| r.role).collect();
        assert_eq!(roles, vec![Role::Core, Role::Test, Role::Docs]);

        assert_eq!(resp[0].loc, 400);
        assert_eq!(resp[0].files, 2);
        // (0.3*100 + 0.7*300) / 400
        assert!(approx(resp[0].confidence, 0.6));
    }

    #[test]
    fn test_responsibilities_equal_loc_uses_priority() {
        let records = vec![
            make_record(Role::Docs, 10, 0.5),
            make_record(Role::Vendor, 10, 0.5),
        ];
        let resp = compute_responsibilities(&records);
        assert_eq!(resp[0].role, Role::Vendor);
    }

    #[test]
    fn test_test_breakdown() {
        let mut unit = make_record(Role::Test, 75, 0.5);
        unit.sub_role = Some(TestKind::Unit);
        let mut e2e = make_record(Role::Test, 25, 0.5);
        e2e.sub_role = Some(TestKind::E2E);

        let resp = compute_responsibilities(&[unit, e2e]);
        assert_eq!(resp.len(), 1);
        assert!(approx(resp[0].breakdown[&TestKind::Unit], 0.75));
        assert!(approx(resp[0].breakdown[&TestKind::E2E], 0.25));
    }

    #[test]
    fn test_zero_loc_role() {
        let resp = compute_responsibilities(&[make_record(Role::Config, 0, 0.9)]);
        assert_eq!(resp[0].files, 1);
        assert_eq!(resp[0].confidence, 0.0);
    }

    #[test]
    fn test_ratios() {
        let records = vec![
            make_record(Role::Core, 200, 0.5),
            make_record(Role::Test, 100, 0.5),
            make_record(Role::Infra, 50, 0.5),
        ];
        let ratios = compute_ratios(&compute_responsibilities(&records));
        assert!(approx(ratios.test_to_core, 0.5));
        assert!(approx(ratios.infra_to_core, 0.25));
        assert_eq!(ratios.docs_to_core, 0.0);
    }

    #[test]
    fn test_ratios_without_core() {
        let records = vec![make_record(Role::Test, 40, 0.5)];
        let ratios = compute_ratios(&compute_responsibilities(&records));
        assert!(approx(ratios.test_to_core, 40.0));
    }

    #[test]
    fn test_confidence_breakdown() {
        let mut overridden = make_record(Role::Infra, 20, 0.25);
        overridden.signals = vec![Signal::Override];
        let records = vec![
            make_record(Role::Vendor, 50, 0.9),
            make_record(Role::Core, 30, 0.3),
            overridden,
        ];

        let conf = compute_confidence(&records);
        assert!(approx(conf.auto_classified, 0.5));
        assert!(approx(conf.override_, 0.2));
        assert!(approx(conf.heuristic, 0.3));
    }

    #[test]
    fn test_confidence_breakdown_empty() {
        assert_eq!(compute_confidence(&[]), ConfidenceBreakdown::default());
    }

    #[test]
    fn test_summarize() {
        let records = vec![
            make_record(Role::Core, 100, 0.3),
            make_record(Role::Test, 50, 0.9),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.loc, 150);
        assert_eq!(summary.responsibilities.len(), 2);
        assert!(approx(summary.ratios.test_to_core, 0.5));

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["confidence"].get("override").is_some());
    }
}
