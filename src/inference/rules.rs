//! Static heuristic tables.
//!
//! Weights are empirical. High-precision evidence (vendor directories,
//! generated-code banners) sits near the top of the range so it outvotes
//! weak hints like a bare `.yaml` extension.

use crate::model::{Role, Signal, TestKind};

use super::RoleScore;

/// Maximum number of bytes inspected by the header probe.
pub const HEADER_PROBE_BYTES: usize = 2048;

/// Extension rules only run while the best candidate is below this weight.
pub const EXTENSION_GATE: f32 = 0.50;

/// Header rules only run while the best candidate is below this weight.
pub const HEADER_GATE: f32 = 0.80;

/// Substring match against the lowercased full path.
#[derive(Debug, Clone, Copy)]
pub struct PathRule {
    pub fragment: &'static str,
    pub role: Role,
    pub weight: f32,
}

/// How a filename rule compares its pattern to the basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Prefix,
    Suffix,
    Contains,
}

/// Pattern match against the lowercased basename.
#[derive(Debug, Clone, Copy)]
pub struct FilenameRule {
    pub pattern: &'static str,
    pub mode: MatchMode,
    pub role: Role,
    pub sub_role: Option<TestKind>,
    pub weight: f32,
}

impl FilenameRule {
    fn matches(&self, filename: &str) -> bool {
        match self.mode {
            MatchMode::Prefix => filename.starts_with(self.pattern),
            MatchMode::Suffix => filename.ends_with(self.pattern),
            MatchMode::Contains => filename.contains(self.pattern),
        }
    }
}

/// Extension match, including compound suffixes such as `.pb.go`.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionRule {
    pub ext: &'static str,
    pub role: Role,
    pub weight: f32,
}

/// Case-sensitive substring match against the first bytes of a file.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    pub pattern: &'static str,
    pub role: Role,
    pub weight: f32,
}

const fn path(fragment: &'static str, role: Role, weight: f32) -> PathRule {
    PathRule {
        fragment,
        role,
        weight,
    }
}

const fn name(
    pattern: &'static str,
    mode: MatchMode,
    role: Role,
    sub_role: Option<TestKind>,
    weight: f32,
) -> FilenameRule {
    FilenameRule {
        pattern,
        mode,
        role,
        sub_role,
        weight,
    }
}

const fn ext(ext: &'static str, role: Role, weight: f32) -> ExtensionRule {
    ExtensionRule { ext, role, weight }
}

const fn header(pattern: &'static str, role: Role, weight: f32) -> HeaderRule {
    HeaderRule {
        pattern,
        role,
        weight,
    }
}

use MatchMode::{Contains, Prefix, Suffix};

pub static PATH_RULES: &[PathRule] = &[
    // Tests
    path("/test/", Role::Test, 0.60),
    path("/tests/", Role::Test, 0.60),
    path("/__tests__/", Role::Test, 0.60),
    path("/spec/", Role::Test, 0.55),
    path("/unit/", Role::Test, 0.60),
    path("/integration/", Role::Test, 0.65),
    path("/e2e/", Role::Test, 0.70),
    // Infra
    path("/infra/", Role::Infra, 0.65),
    path("/terraform/", Role::Infra, 0.65),
    path("/pulumi/", Role::Infra, 0.65),
    path("/helm/", Role::Infra, 0.65),
    path("/.github/workflows/", Role::Infra, 0.70),
    path("/.gitlab-ci/", Role::Infra, 0.70),
    path("/ci/", Role::Infra, 0.60),
    path("/deploy/", Role::Infra, 0.65),
    // Docs
    path("/docs/", Role::Docs, 0.65),
    path("/doc/", Role::Docs, 0.65),
    path("/site/", Role::Docs, 0.60),
    // Config
    path("/config/", Role::Config, 0.55),
    path("/configs/", Role::Config, 0.55),
    // Scripts
    path("/scripts/", Role::Scripts, 0.55),
    path("/tools/", Role::Scripts, 0.55),
    path("/bin/", Role::Scripts, 0.55),
    path("/hack/", Role::Scripts, 0.50),
    // Examples
    path("/examples/", Role::Examples, 0.55),
    path("/samples/", Role::Examples, 0.55),
    path("/demo/", Role::Examples, 0.55),
    // Vendored code
    path("/vendor/", Role::Vendor, 0.90),
    path("/third_party/", Role::Vendor, 0.90),
    path("/node_modules/", Role::Vendor, 0.95),
    // Build output and codegen
    path("/dist/", Role::Generated, 0.70),
    path("/build/", Role::Generated, 0.70),
    path("/gen/", Role::Generated, 0.80),
    path("/generated/", Role::Generated, 0.80),
    path("/pb/", Role::Generated, 0.80),
];

pub static FILENAME_RULES: &[FilenameRule] = &[
    // Tests
    name("_test.", Contains, Role::Test, Some(TestKind::Unit), 0.75),
    name(".spec.", Contains, Role::Test, Some(TestKind::Unit), 0.70),
    name(".test.", Contains, Role::Test, Some(TestKind::Unit), 0.70),
    name("_spec.", Contains, Role::Test, Some(TestKind::Unit), 0.70),
    name(".e2e.", Contains, Role::Test, Some(TestKind::E2E), 0.80),
    name("_e2e.", Contains, Role::Test, Some(TestKind::E2E), 0.80),
    name(".integration.", Contains, Role::Test, Some(TestKind::Integration), 0.80),
    name("_integration.", Contains, Role::Test, Some(TestKind::Integration), 0.80),
    name("_fixture.", Contains, Role::Test, Some(TestKind::Fixture), 0.60),
    name("_mock.", Contains, Role::Test, Some(TestKind::Fixture), 0.55),
    name("_stub.", Contains, Role::Test, Some(TestKind::Fixture), 0.55),
    name("_fake.", Contains, Role::Test, Some(TestKind::Fixture), 0.55),
    // Infra
    name("dockerfile", Prefix, Role::Infra, None, 0.85),
    name("docker-compose", Prefix, Role::Infra, None, 0.80),
    name("makefile", Prefix, Role::Infra, None, 0.65),
    name("taskfile", Prefix, Role::Infra, None, 0.65),
    name("justfile", Prefix, Role::Infra, None, 0.65),
    name(".tf", Suffix, Role::Infra, None, 0.90),
    name(".tfvars", Suffix, Role::Infra, None, 0.90),
    name("helmfile", Prefix, Role::Infra, None, 0.85),
    name(".hcl", Suffix, Role::Infra, None, 0.80),
    // Config
    name(".env", Prefix, Role::Config, None, 0.85),
    name("config.", Prefix, Role::Config, None, 0.60),
    name("settings.", Prefix, Role::Config, None, 0.60),
    name(".config.", Contains, Role::Config, None, 0.55),
    name(".conf", Suffix, Role::Config, None, 0.55),
    // Docs
    name("readme", Prefix, Role::Docs, None, 0.80),
    name("changelog", Prefix, Role::Docs, None, 0.75),
    name("contributing", Prefix, Role::Docs, None, 0.75),
    name("license", Prefix, Role::Docs, None, 0.70),
];

pub static EXTENSION_RULES: &[ExtensionRule] = &[
    // Docs
    ext(".md", Role::Docs, 0.20),
    ext(".mdx", Role::Docs, 0.20),
    ext(".rst", Role::Docs, 0.20),
    ext(".adoc", Role::Docs, 0.20),
    // Config, weak on purpose
    ext(".yaml", Role::Config, 0.15),
    ext(".yml", Role::Config, 0.15),
    ext(".toml", Role::Config, 0.15),
    ext(".json", Role::Config, 0.10),
    ext(".ini", Role::Config, 0.15),
    // Lockfiles and codegen
    ext(".lock", Role::Generated, 0.90),
    ext(".sum", Role::Generated, 0.85),
    ext(".pb.go", Role::Generated, 0.90),
    ext(".pb.ts", Role::Generated, 0.90),
    ext(".gen.go", Role::Generated, 0.85),
    // Interface definitions read like contracts
    ext(".proto", Role::Docs, 0.40),
];

pub static HEADER_RULES: &[HeaderRule] = &[
    // Codegen banners
    header("Code generated by", Role::Generated, 0.95),
    header("DO NOT EDIT", Role::Generated, 0.90),
    header("@generated", Role::Generated, 0.90),
    header("AUTO-GENERATED", Role::Generated, 0.85),
    header("This file was automatically generated", Role::Generated, 0.90),
    header("This file is auto-generated", Role::Generated, 0.90),
    // Infra
    header("terraform {", Role::Infra, 0.80),
    header("provider \"", Role::Infra, 0.75),
    // Test frameworks
    header("describe(", Role::Test, 0.60),
    header("test(", Role::Test, 0.60),
    header("func Test", Role::Test, 0.70),
    header("@Test", Role::Test, 0.65),
    header("#[test]", Role::Test, 0.70),
    header("def test_", Role::Test, 0.65),
    // Deprecation markers
    header("// Deprecated:", Role::Deprecated, 0.70),
    header("// DEPRECATED", Role::Deprecated, 0.65),
    header("@deprecated", Role::Deprecated, 0.70),
];

/// Lowercased final path component. Falls back to the whole path when there
/// is no usable file name.
pub(crate) fn basename(path: &str) -> String {
    let is_sep = |c: char| c == '/' || c == '\\';
    let trimmed = path.trim_end_matches(is_sep);
    let base = trimmed
        .rsplit(is_sep)
        .next()
        .filter(|b| !b.is_empty())
        .unwrap_or(trimmed);
    base.to_lowercase()
}

/// Lowercased extension of the final component, dot included.
fn extension(filename: &str) -> Option<&str> {
    filename.rfind('.').map(|i| &filename[i..])
}

pub fn apply_path_rules(path: &str, score: &mut RoleScore) {
    let lower = path.to_lowercase();
    for rule in PATH_RULES {
        if lower.contains(rule.fragment) {
            score.add(rule.role, rule.weight, Signal::Path);
        }
    }
}

pub fn apply_filename_rules(path: &str, score: &mut RoleScore) {
    let filename = basename(path);
    for rule in FILENAME_RULES {
        if rule.matches(&filename) {
            score.add_with_sub_role(rule.role, rule.sub_role, rule.weight, Signal::Filename);
        }
    }
}

pub fn apply_extension_rules(path: &str, score: &mut RoleScore) {
    let filename = basename(path);
    let ext = extension(&filename);
    for rule in EXTENSION_RULES {
        if ext == Some(rule.ext) || filename.ends_with(rule.ext) {
            score.add(rule.role, rule.weight, Signal::Extension);
        }
    }
}

/// Scan already-read header bytes. Invalid UTF-8 is replaced rather than
/// rejected so a binary prefix does not hide an ASCII banner.
pub fn apply_header_rules(header: &[u8], score: &mut RoleScore) {
    let content = String::from_utf8_lossy(header);
    for rule in HEADER_RULES {
        if content.contains(rule.pattern) {
            score.add(rule.role, rule.weight, Signal::Header);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_of(score: &RoleScore, role: Role) -> f32 {
        score.weight(role)
    }

    #[test]
    fn test_weights_within_empirical_range() {
        let weights = PATH_RULES
            .iter()
            .map(|r| r.weight)
            .chain(FILENAME_RULES.iter().map(|r| r.weight))
            .chain(EXTENSION_RULES.iter().map(|r| r.weight))
            .chain(HEADER_RULES.iter().map(|r| r.weight));
        for w in weights {
            assert!((0.10..=0.95).contains(&w), "weight {} out of range", w);
        }
    }

    #[test]
    fn test_sub_roles_only_on_test_rules() {
        for rule in FILENAME_RULES {
            if rule.sub_role.is_some() {
                assert_eq!(rule.role, Role::Test, "{} tags a sub-role", rule.pattern);
            }
        }
    }

    #[test]
    fn test_filename_patterns_are_lowercase() {
        for rule in FILENAME_RULES {
            assert_eq!(rule.pattern, rule.pattern.to_lowercase());
        }
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/project/src/Main.go"), "main.go");
        assert_eq!(basename("Dockerfile"), "dockerfile");
        assert_eq!(basename("C:\\src\\README.md"), "readme.md");
        assert_eq!(basename("dir/sub/"), "sub");
    }

    #[test]
    fn test_path_rules_accumulate() {
        let mut score = RoleScore::new();
        apply_path_rules("/repo/test/integration/db.go", &mut score);
        assert!((weight_of(&score, Role::Test) - 1.25).abs() < 1e-6);
        assert_eq!(score.signals(Role::Test), &[Signal::Path, Signal::Path]);
    }

    #[test]
    fn test_path_rules_are_case_insensitive() {
        let mut score = RoleScore::new();
        apply_path_rules("/Repo/Vendor/lib.c", &mut score);
        assert!((weight_of(&score, Role::Vendor) - 0.90).abs() < 1e-6);
    }

    #[test]
    fn test_filename_rules_tag_sub_role() {
        let mut score = RoleScore::new();
        apply_filename_rules("web/login_e2e.ts", &mut score);
        assert_eq!(score.sub_role(Role::Test), Some(TestKind::E2E));
    }

    #[test]
    fn test_filename_prefix_and_suffix() {
        let mut score = RoleScore::new();
        apply_filename_rules("Dockerfile.prod", &mut score);
        assert!((weight_of(&score, Role::Infra) - 0.85).abs() < 1e-6);

        let mut score = RoleScore::new();
        apply_filename_rules("infra/main.tf", &mut score);
        assert!((weight_of(&score, Role::Infra) - 0.90).abs() < 1e-6);

        let mut score = RoleScore::new();
        apply_filename_rules("app.conf.bak", &mut score);
        assert_eq!(weight_of(&score, Role::Config), 0.0);
    }

    #[test]
    fn test_extension_compound_suffix() {
        let mut score = RoleScore::new();
        apply_extension_rules("api/user.pb.go", &mut score);
        assert!((weight_of(&score, Role::Generated) - 0.90).abs() < 1e-6);
        assert_eq!(score.signals(Role::Generated), &[Signal::Extension]);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let mut score = RoleScore::new();
        apply_extension_rules("docs/GUIDE.MD", &mut score);
        assert!((weight_of(&score, Role::Docs) - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_extension_lockfiles() {
        let mut score = RoleScore::new();
        apply_extension_rules("Cargo.lock", &mut score);
        assert!((weight_of(&score, Role::Generated) - 0.90).abs() < 1e-6);

        let mut score = RoleScore::new();
        apply_extension_rules("go.sum", &mut score);
        assert!((weight_of(&score, Role::Generated) - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_header_rules_stack() {
        let mut score = RoleScore::new();
        apply_header_rules(
            b"// Code generated by protoc-gen-go. DO NOT EDIT.\npackage api\n",
            &mut score,
        );
        assert!((weight_of(&score, Role::Generated) - 1.85).abs() < 1e-6);
        assert_eq!(score.signals(Role::Generated).len(), 2);
    }

    #[test]
    fn test_header_rules_are_case_sensitive() {
        let mut score = RoleScore::new();
        apply_header_rules(b"// code generated by hand, do not edit lightly", &mut score);
        assert_eq!(score.max_weight(), 0.0);
    }

    #[test]
    fn test_header_rules_tolerate_invalid_utf8() {
        let mut score = RoleScore::new();
        apply_header_rules(b"\xff\xfe@generated\n", &mut score);
        assert!((weight_of(&score, Role::Generated) - 0.90).abs() < 1e-6);
    }
}
