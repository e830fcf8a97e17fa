//! Rolemap - semantic role classification for source files.
//!
//! Every file in a codebase gets exactly one role (core, test, infra, docs,
//! config, generated, vendor, scripts, examples, deprecated) and a
//! confidence in `[0, 1]` derived from how much independent evidence backs
//! that role.
//!
//! # Architecture
//!
//! - `model`: input (`RawFile`) and output (`FileRecord`) types
//! - `inference`: rule tables, override matching, scoring, the
//!   classification engine and the directory-neighbourhood pass
//! - `config`: YAML/JSON configuration loading
//! - `summary`: per-role roll-up of a classified batch
//!
//! File discovery, line counting and rendering are left to the caller.
//!
//! ```no_run
//! use rolemap::{Config, Engine, RawFile};
//!
//! let config = Config::load_from_dir(".")?;
//! let engine = Engine::new(config.engine_options());
//! let records = engine.infer_batch(&[RawFile::new("src/main.rs", 120)]);
//! # Ok::<(), rolemap::ConfigError>(())
//! ```

pub mod config;
pub mod inference;
pub mod model;
pub mod summary;

pub use config::{Config, ConfigError, Options, OverrideRules};
pub use inference::{resolve_neighborhood, Engine, EngineOptions, OverrideMatch, Overrides, RoleScore};
pub use model::{FileRecord, LineMetrics, RawFile, Role, Signal, TestKind};
pub use summary::{summarize, Summary};
