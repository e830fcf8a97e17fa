//! User-declared path → role overrides.
//!
//! Two pattern shapes are understood:
//!
//! - Plain globs (`*_test.go`, `scripts/*.sh`) are tried against the file
//!   name first, then against the whole path. `*` and `?` never cross `/`.
//! - Patterns with exactly one `**` split into a prefix and a suffix. The
//!   prefix is a raw string-prefix test, so `deploy/**` also accepts
//!   `deployment/x.go`. The suffix may match at any depth.
//!
//! A pattern that cannot be compiled, or that has more than one `**`, simply
//! never matches.

use globset::{GlobBuilder, GlobMatcher};
use tracing::{trace, warn};

use crate::config::OverrideRules;
use crate::model::Role;

/// The rule that claimed a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideMatch {
    pub role: Role,
    pub pattern: String,
}

#[derive(Debug, Clone)]
enum CompiledPattern {
    Glob(GlobMatcher),
    Doublestar {
        prefix: String,
        suffix: String,
        suffix_glob: Option<GlobMatcher>,
    },
    Never,
}

#[derive(Debug, Clone)]
struct OverrideRule {
    pattern: String,
    role: Role,
    compiled: CompiledPattern,
}

/// Ordered set of override rules. First declared match wins.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    rules: Vec<OverrideRule>,
}

impl Overrides {
    pub fn new(config: &OverrideRules) -> Self {
        let rules = config
            .iter()
            .flat_map(|(role, patterns)| {
                patterns.iter().map(move |pattern| OverrideRule {
                    pattern: pattern.clone(),
                    role: *role,
                    compiled: compile(pattern),
                })
            })
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule, in declaration order, whose pattern accepts `path`.
    pub fn matches(&self, path: &str) -> Option<OverrideMatch> {
        if self.rules.is_empty() {
            return None;
        }
        let path = to_slash(path);
        let found = self
            .rules
            .iter()
            .find(|rule| matches_compiled(&rule.compiled, &path))?;
        trace!("Override {} -> {} for {}", found.pattern, found.role, path);
        Some(OverrideMatch {
            role: found.role,
            pattern: found.pattern.clone(),
        })
    }
}

fn to_slash(s: &str) -> String {
    s.replace('\\', "/")
}

/// Compile a shell-style glob where wildcards stop at `/`.
fn plain_glob(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            warn!("Ignoring override pattern {:?}: {}", pattern, e);
            None
        }
    }
}

fn compile(pattern: &str) -> CompiledPattern {
    let pattern = to_slash(pattern);

    if pattern.contains("**") {
        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() != 2 {
            warn!("Ignoring override pattern {:?}: more than one `**`", pattern);
            return CompiledPattern::Never;
        }
        let prefix = parts[0].strip_suffix('/').unwrap_or(parts[0]).to_string();
        let suffix = parts[1].strip_prefix('/').unwrap_or(parts[1]).to_string();
        let suffix_glob = if suffix.is_empty() || suffix.starts_with('*') {
            None
        } else {
            plain_glob(&suffix)
        };
        return CompiledPattern::Doublestar {
            prefix,
            suffix,
            suffix_glob,
        };
    }

    match plain_glob(&pattern) {
        Some(glob) => CompiledPattern::Glob(glob),
        None => CompiledPattern::Never,
    }
}

fn matches_compiled(compiled: &CompiledPattern, path: &str) -> bool {
    match compiled {
        CompiledPattern::Glob(glob) => {
            let base = path.rsplit('/').next().unwrap_or(path);
            glob.is_match(base) || glob.is_match(path)
        }
        CompiledPattern::Doublestar {
            prefix,
            suffix,
            suffix_glob,
        } => {
            if !prefix.is_empty() && !path.starts_with(prefix.as_str()) {
                return false;
            }
            if suffix.is_empty() {
                return true;
            }
            path.ends_with(suffix.as_str()) || any_suffix(path, suffix, suffix_glob.as_ref())
        }
        CompiledPattern::Never => false,
    }
}

fn any_suffix(path: &str, suffix: &str, glob: Option<&GlobMatcher>) -> bool {
    if let Some(ext) = suffix.strip_prefix('*') {
        return path.ends_with(ext);
    }
    let Some(glob) = glob else {
        return false;
    };
    let components: Vec<&str> = path.split('/').collect();
    (0..components.len()).any(|i| glob.is_match(components[i..].join("/")))
}

/// Match a single pattern against a path, compiling it on the spot.
pub fn match_glob(pattern: &str, path: &str) -> bool {
    matches_compiled(&compile(pattern), &to_slash(path))
}

/// Match a `**` pattern. Anything without exactly one `**` is rejected.
pub fn match_doublestar(pattern: &str, path: &str) -> bool {
    let pattern = to_slash(pattern);
    if pattern.split("**").count() != 2 {
        return false;
    }
    matches_compiled(&compile(&pattern), &to_slash(path))
}

/// Does `pattern` accept `path` or any of its trailing component runs?
pub fn match_any_suffix(path: &str, pattern: &str) -> bool {
    let glob = if pattern.starts_with('*') {
        None
    } else {
        plain_glob(pattern)
    };
    any_suffix(&to_slash(path), pattern, glob.as_ref())
}
