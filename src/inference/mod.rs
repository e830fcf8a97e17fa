//! Role inference: rule tables, override matching, scoring and the
//! batch-level neighbourhood correction.

mod engine;
mod neighborhood;
mod overrides;
pub mod rules;
mod scoring;

pub use engine::{read_header, Engine, EngineOptions, OVERRIDE_WEIGHT};
pub use neighborhood::resolve_neighborhood;
pub use overrides::{match_any_suffix, match_doublestar, match_glob, OverrideMatch, Overrides};
pub use scoring::{RoleScore, Verdict, DEFAULT_CONFIDENCE};
