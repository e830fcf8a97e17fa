//! Classification engine: overrides, then heuristics, then resolution.

use rayon::prelude::*;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::config::OverrideRules;
use crate::model::{FileRecord, RawFile, Signal};

use super::neighborhood::resolve_neighborhood;
use super::rules::{
    apply_extension_rules, apply_filename_rules, apply_header_rules, apply_path_rules,
    EXTENSION_GATE, HEADER_GATE, HEADER_PROBE_BYTES,
};
use super::{Overrides, RoleScore, Verdict};

/// Weight given to a user override.
pub const OVERRIDE_WEIGHT: f32 = 1.0;

/// Settings for an `Engine`.
///
/// The zero value disables both optional passes; `Config` turns the
/// neighbourhood pass on by default.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub header_probe: bool,
    pub neighborhood: bool,
    pub overrides: OverrideRules,
}

/// Classifies files into roles.
///
/// Immutable once built, so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct Engine {
    overrides: Option<Overrides>,
    header_probe: bool,
    neighborhood: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let overrides = if options.overrides.is_empty() {
            None
        } else {
            Some(Overrides::new(&options.overrides))
        };
        Self {
            overrides,
            header_probe: options.header_probe,
            neighborhood: options.neighborhood,
        }
    }

    /// Toggle the header probe.
    pub fn header_probe(mut self, enabled: bool) -> Self {
        self.header_probe = enabled;
        self
    }

    /// Toggle the neighbourhood pass in `infer_batch`.
    pub fn neighborhood(mut self, enabled: bool) -> Self {
        self.neighborhood = enabled;
        self
    }

    pub fn overrides(&self) -> Option<&Overrides> {
        self.overrides.as_ref()
    }

    pub fn header_probe_enabled(&self) -> bool {
        self.header_probe
    }

    pub fn neighborhood_enabled(&self) -> bool {
        self.neighborhood
    }

    /// Classify one file, reading its header from disk if the probe is on.
    pub fn infer(&self, file: &RawFile) -> FileRecord {
        self.infer_with(file, || read_header(Path::new(&file.path), HEADER_PROBE_BYTES))
    }

    /// Classify one file using caller-supplied header bytes instead of disk.
    pub fn infer_with_header(&self, file: &RawFile, header: &[u8]) -> FileRecord {
        self.infer_with(file, || Ok(header.to_vec()))
    }

    fn infer_with<F>(&self, file: &RawFile, header: F) -> FileRecord
    where
        F: FnOnce() -> io::Result<Vec<u8>>,
    {
        let mut score = RoleScore::new();

        if let Some(hit) = self.overrides.as_ref().and_then(|o| o.matches(&file.path)) {
            score.add(hit.role, OVERRIDE_WEIGHT, Signal::Override);
            return build_record(file, score.resolve());
        }

        apply_path_rules(&file.path, &mut score);
        apply_filename_rules(&file.path, &mut score);

        if score.max_weight() < EXTENSION_GATE {
            apply_extension_rules(&file.path, &mut score);
        }

        if self.header_probe && score.max_weight() < HEADER_GATE {
            match header() {
                Ok(bytes) => apply_header_rules(&bytes, &mut score),
                Err(e) => debug!("Header probe skipped for {}: {}", file.path, e),
            }
        }

        build_record(file, score.resolve())
    }

    /// Classify a batch in parallel, then run the neighbourhood pass.
    ///
    /// Output order matches input order.
    pub fn infer_batch(&self, files: &[RawFile]) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = files.par_iter().map(|f| self.infer(f)).collect();

        if self.neighborhood {
            let corrected = resolve_neighborhood(&mut records);
            debug!(
                "Classified {} file(s), {} corrected by neighborhood",
                records.len(),
                corrected
            );
        } else {
            debug!("Classified {} file(s)", records.len());
        }

        records
    }
}

fn build_record(file: &RawFile, verdict: Verdict) -> FileRecord {
    FileRecord {
        path: file.path.clone(),
        loc: file.loc,
        lines: file.lines,
        language: file.language_hint.clone(),
        role: verdict.role,
        sub_role: verdict.sub_role,
        confidence: verdict.confidence,
        signals: verdict.signals,
        embedded: file.embedded.clone(),
    }
}

/// Read at most `max_bytes` from the start of a file.
pub fn read_header(path: &Path, max_bytes: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(max_bytes);
    File::open(path)?
        .take(max_bytes as u64)
        .read_to_end(&mut buf)?;
    Ok(buf)
}
