//! Core types shared by the classifier and its collaborators.
//!
//! `RawFile` is what the scanner hands us, `FileRecord` is what we hand to
//! the aggregator. Everything in between lives in `inference`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic role of a file within a codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Core,
    Test,
    Infra,
    Docs,
    Config,
    Generated,
    Vendor,
    Scripts,
    Examples,
    Deprecated,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 10] = [
        Role::Core,
        Role::Test,
        Role::Infra,
        Role::Docs,
        Role::Config,
        Role::Generated,
        Role::Vendor,
        Role::Scripts,
        Role::Examples,
        Role::Deprecated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Core => "core",
            Role::Test => "test",
            Role::Infra => "infra",
            Role::Docs => "docs",
            Role::Config => "config",
            Role::Generated => "generated",
            Role::Vendor => "vendor",
            Role::Scripts => "scripts",
            Role::Examples => "examples",
            Role::Deprecated => "deprecated",
        }
    }

    /// Tie-break rank used when two roles carry the same weight.
    /// Lower wins.
    pub fn priority(&self) -> u8 {
        match self {
            Role::Vendor => 1,
            Role::Generated => 2,
            Role::Test => 3,
            Role::Infra => 4,
            Role::Core => 5,
            Role::Docs => 6,
            Role::Config => 7,
            Role::Scripts => 8,
            Role::Examples => 9,
            Role::Deprecated => 10,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// Finer classification for test files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Unit,
    Integration,
    E2E,
    Fixture,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Unit => "unit",
            TestKind::Integration => "integration",
            TestKind::E2E => "e2e",
            TestKind::Fixture => "fixture",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unit" => Ok(TestKind::Unit),
            "integration" => Ok(TestKind::Integration),
            "e2e" => Ok(TestKind::E2E),
            "fixture" => Ok(TestKind::Fixture),
            _ => Err(format!("unknown test kind: {}", s)),
        }
    }
}

/// Evidence channel that contributed to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Override,
    Path,
    Filename,
    Extension,
    Header,
    Neighborhood,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Override => "override",
            Signal::Path => "path",
            Signal::Filename => "filename",
            Signal::Extension => "extension",
            Signal::Header => "header",
            Signal::Neighborhood => "neighborhood",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "override" => Ok(Signal::Override),
            "path" => Ok(Signal::Path),
            "filename" => Ok(Signal::Filename),
            "extension" => Ok(Signal::Extension),
            "header" => Ok(Signal::Header),
            "neighborhood" => Ok(Signal::Neighborhood),
            _ => Err(format!("unknown signal: {}", s)),
        }
    }
}

/// Line breakdown produced by the external counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineMetrics {
    pub total: usize,
    pub blanks: usize,
    pub comments: usize,
    pub code: usize,
}

/// A discovered file as reported by the scanner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFile {
    pub path: String,
    pub loc: usize,
    #[serde(default)]
    pub lines: LineMetrics,
    #[serde(default)]
    pub language_hint: String,
    /// Metrics for languages embedded in a container format (code blocks in
    /// Markdown and the like). Passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<BTreeMap<String, LineMetrics>>,
}

impl RawFile {
    /// Bare file with only a path and LOC, mostly useful in tests.
    pub fn new(path: impl Into<String>, loc: usize) -> Self {
        Self {
            path: path.into(),
            loc,
            ..Default::default()
        }
    }
}

/// A classified file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub loc: usize,
    pub lines: LineMetrics,
    pub language: String,
    pub role: Role,
    /// Only ever set when `role` is `Test`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_role: Option<TestKind>,
    /// Evidence strength in `[0, 1]`. Not a probability.
    pub confidence: f32,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<BTreeMap<String, LineMetrics>>,
}

impl FileRecord {
    pub fn has_signal(&self, signal: Signal) -> bool {
        self.signals.contains(&signal)
    }
}
