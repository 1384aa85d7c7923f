//! Cleaning module.
//!
//! Turns the raw source rows into the cleaned record set:
//! - Staging: isolated working copy of the source
//! - Dedup: exact-duplicate removal
//! - Rules / Standardize: per-field normalization
//! - Nulls: blank normalization and same-company backfill
//! - Purge: drop rows with no layoff magnitude
//! - Pipeline: orchestration, options and end-to-end entry points

pub mod dedup;
pub mod nulls;
pub mod pipeline;
pub mod purge;
pub mod rules;
pub mod staging;
pub mod standardize;

pub use dedup::{remove_duplicates, DedupReport, DuplicateRow};
pub use nulls::{resolve_nulls, NullReport};
pub use pipeline::*;
pub use purge::{purge_unreliable, PurgeReport};
pub use rules::{default_rules, IndustryRule, IndustryRules};
pub use staging::{stage, StagingTable};
pub use standardize::{standardize, DateErrorPolicy, DateIssue, StandardizeReport, Standardizer};
