//! Structured diagnostics for parsing and evaluation.
//!
//! Warnings are advisory: they never abort a parse or an evaluation and are
//! never promoted to errors. A [`WarningCollector`] accumulates them subject
//! to a suppression policy; [`NoopWarnings`] drops everything.

mod collector;
mod warning;

pub use collector::{NoopWarnings, WarningCollector, WarningConfig, WarningSink};
pub use warning::{warning_metadata, Category, Severity, Warning, WarningInfo};
