//! Directory-neighbourhood correction.
//!
//! A weakly classified file sitting among confidently classified siblings
//! usually shares their role (`helpers.go` next to a dozen `*_test.go`
//! files). This pass adopts the dominant role of a directory for such files.
//!
//! All decisions are taken from a snapshot of the incoming verdicts before
//! anything is rewritten, so a correction never feeds into another vote and
//! running the pass twice changes nothing the second time.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::model::{FileRecord, Role, Signal};

/// Directories with fewer files are left alone.
pub const MIN_DIR_FILES: usize = 3;

/// Files at or above this confidence vote.
pub const VOTER_CONFIDENCE: f32 = 0.70;

/// A directory needs at least this many voters.
pub const MIN_VOTERS: usize = 2;

/// Share of the vote the leading role needs.
pub const DOMINANCE_RATIO: f32 = 0.70;

/// Files below this confidence are eligible for correction.
pub const CORRECTABLE_BELOW: f32 = 0.60;

/// Confidence added to a corrected file, capped at 1.0.
pub const NEIGHBORHOOD_BOOST: f32 = 0.40;

/// Parent directory of a path, as the grouping key.
fn parent_dir(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Leading role among the confident files of one directory, if it dominates.
fn dominant_role(records: &[FileRecord], members: &[usize]) -> Option<Role> {
    // Roles in the order their first voter appears, so ties go to the earliest.
    let mut votes: Vec<(Role, usize)> = Vec::new();
    for &i in members {
        let record = &records[i];
        if record.confidence < VOTER_CONFIDENCE {
            continue;
        }
        match votes.iter_mut().find(|(role, _)| *role == record.role) {
            Some((_, count)) => *count += 1,
            None => votes.push((record.role, 1)),
        }
    }

    let total: usize = votes.iter().map(|(_, c)| c).sum();
    if total < MIN_VOTERS {
        return None;
    }

    let mut leader: Option<(Role, usize)> = None;
    for &(role, count) in &votes {
        if leader.map_or(true, |(_, best)| count > best) {
            leader = Some((role, count));
        }
    }

    let (role, count) = leader?;
    if count as f32 / total as f32 >= DOMINANCE_RATIO {
        Some(role)
    } else {
        None
    }
}

/// Apply the neighbourhood correction to a finished batch.
///
/// Returns the number of records that changed role.
pub fn resolve_neighborhood(records: &mut [FileRecord]) -> usize {
    let mut by_dir: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        by_dir.entry(parent_dir(&record.path)).or_default().push(i);
    }

    // Decide everything against the untouched batch first.
    let mut corrections: Vec<(usize, Role)> = Vec::new();
    for (dir, members) in &by_dir {
        if members.len() < MIN_DIR_FILES {
            continue;
        }
        let Some(dominant) = dominant_role(records, members) else {
            continue;
        };

        let before = corrections.len();
        corrections.extend(
            members
                .iter()
                .copied()
                .filter(|&i| {
                    records[i].confidence < CORRECTABLE_BELOW && records[i].role != dominant
                })
                .map(|i| (i, dominant)),
        );
        let changed = corrections.len() - before;
        if changed > 0 {
            debug!("Neighborhood: {} file(s) in {:?} reassigned to {}", changed, dir, dominant);
        }
    }

    for &(i, role) in &corrections {
        let record = &mut records[i];
        record.role = role;
        record.confidence = (record.confidence + NEIGHBORHOOD_BOOST).min(1.0);
        record.signals.push(Signal::Neighborhood);
    }

    corrections.len()
}
