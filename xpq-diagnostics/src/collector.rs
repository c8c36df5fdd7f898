use std::cell::RefCell;

use ahash::{HashSet, HashSetExt};

use crate::warning::{Category, Severity, Warning};

/// Configuration of a [`WarningCollector`].
pub struct WarningConfig {
    pub enabled: bool,
    /// Warnings below this severity are dropped.
    pub min_severity: Severity,
    pub suppress_codes: HashSet<String>,
    pub suppress_categories: HashSet<Category>,
    /// Collect each code at most once.
    pub emit_once: bool,
    /// Stop collecting once this many warnings have been recorded.
    pub max_warnings: Option<usize>,
    /// Observer invoked for every warning that passes the filters.
    #[allow(clippy::type_complexity)]
    pub handler: Option<Box<dyn Fn(&Warning)>>,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_severity: Severity::Info,
            suppress_codes: HashSet::new(),
            suppress_categories: HashSet::new(),
            emit_once: false,
            max_warnings: None,
            handler: None,
        }
    }
}

impl std::fmt::Debug for WarningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarningConfig")
            .field("enabled", &self.enabled)
            .field("min_severity", &self.min_severity)
            .field("suppress_codes", &self.suppress_codes)
            .field("suppress_categories", &self.suppress_categories)
            .field("emit_once", &self.emit_once)
            .field("max_warnings", &self.max_warnings)
            .field("handler", &self.handler.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Anything parse or evaluation can report warnings into.
pub trait WarningSink {
    fn emit(&self, code: &str, context: Option<&str>);
    fn emit_custom(&self, warning: Warning);
}

/// Accumulates warnings subject to the configured suppression policy.
///
/// `emit` is sequential within a single parse or evaluate call; the
/// collector is not observed externally until the call returns.
#[derive(Debug)]
pub struct WarningCollector {
    config: WarningConfig,
    warnings: RefCell<Vec<Warning>>,
    emitted_codes: RefCell<HashSet<String>>,
}

impl Default for WarningCollector {
    fn default() -> Self {
        Self::new(WarningConfig::default())
    }
}

impl WarningCollector {
    pub fn new(config: WarningConfig) -> Self {
        Self {
            config,
            warnings: RefCell::new(Vec::new()),
            emitted_codes: RefCell::new(HashSet::new()),
        }
    }

    fn accepts(&self, warning: &Warning) -> bool {
        if !self.config.enabled {
            return false;
        }
        if warning.severity < self.config.min_severity {
            return false;
        }
        if self.config.suppress_codes.contains(&warning.code) {
            return false;
        }
        if self.config.suppress_categories.contains(&warning.category) {
            return false;
        }
        if let Some(max) = self.config.max_warnings {
            if self.warnings.borrow().len() >= max {
                return false;
            }
        }
        if self.config.emit_once && self.emitted_codes.borrow().contains(&warning.code) {
            return false;
        }
        true
    }

    fn record(&self, warning: Warning) {
        if !self.accepts(&warning) {
            return;
        }
        if self.config.emit_once {
            self.emitted_codes.borrow_mut().insert(warning.code.clone());
        }
        if let Some(handler) = &self.config.handler {
            handler(&warning);
        }
        self.warnings.borrow_mut().push(warning);
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.warnings.borrow_mut().clear();
        self.emitted_codes.borrow_mut().clear();
    }

    pub fn warnings_by_severity(&self, severity: Severity) -> Vec<Warning> {
        self.warnings
            .borrow()
            .iter()
            .filter(|w| w.severity == severity)
            .cloned()
            .collect()
    }

    pub fn warnings_by_category(&self, category: Category) -> Vec<Warning> {
        self.warnings
            .borrow()
            .iter()
            .filter(|w| w.category == category)
            .cloned()
            .collect()
    }

    /// A plain-text report, one line per warning.
    pub fn format_report(&self) -> String {
        let warnings = self.warnings.borrow();
        let mut report = String::new();
        for warning in warnings.iter() {
            report.push_str(&format!(
                "[{}] {} ({}): {}",
                warning.severity, warning.code, warning.category, warning.message
            ));
            if let Some(context) = &warning.context {
                report.push_str(&format!(" -- {}", context));
            }
            if let Some(migration) = &warning.migration {
                report.push_str(&format!("\n    migration: {}", migration));
            }
            report.push('\n');
        }
        report
    }
}

impl WarningSink for WarningCollector {
    fn emit(&self, code: &str, context: Option<&str>) {
        self.record(Warning::from_code(code, context.map(|s| s.to_string())));
    }

    fn emit_custom(&self, warning: Warning) {
        self.record(warning);
    }
}

/// Drops every emission.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWarnings;

impl WarningSink for NoopWarnings {
    fn emit(&self, _code: &str, _context: Option<&str>) {}
    fn emit_custom(&self, _warning: Warning) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_reports() {
        let collector = WarningCollector::default();
        collector.emit("XPWD0001", Some("namespace::x"));
        collector.emit("XPWC0001", None);
        assert_eq!(collector.len(), 2);
        let report = collector.format_report();
        assert!(report.contains("XPWD0001"));
        assert!(report.contains("namespace::x"));
    }

    #[test]
    fn test_emit_once_suppresses_duplicates() {
        let collector = WarningCollector::new(WarningConfig {
            emit_once: true,
            ..WarningConfig::default()
        });
        collector.emit("XPWD0001", None);
        collector.emit("XPWD0001", None);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_min_severity_filter() {
        let collector = WarningCollector::new(WarningConfig {
            min_severity: Severity::Warning,
            ..WarningConfig::default()
        });
        // XPWT0001 is info-level
        collector.emit("XPWT0001", None);
        collector.emit("XPWC0001", None);
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.warnings()[0].code, "XPWC0001");
    }

    #[test]
    fn test_suppress_codes_and_categories() {
        let mut suppress_codes = HashSet::new();
        suppress_codes.insert("XPWC0001".to_string());
        let mut suppress_categories = HashSet::new();
        suppress_categories.insert(Category::Deprecation);
        let collector = WarningCollector::new(WarningConfig {
            suppress_codes,
            suppress_categories,
            ..WarningConfig::default()
        });
        collector.emit("XPWC0001", None);
        collector.emit("XPWD0001", None);
        collector.emit("XPWP0001", None);
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.warnings()[0].code, "XPWP0001");
    }

    #[test]
    fn test_max_warnings_cap() {
        let collector = WarningCollector::new(WarningConfig {
            max_warnings: Some(2),
            ..WarningConfig::default()
        });
        for _ in 0..5 {
            collector.emit("XPWB0001", None);
        }
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_handler_sees_accepted_warnings() {
        use std::cell::Cell;
        use std::rc::Rc;
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let collector = WarningCollector::new(WarningConfig {
            handler: Some(Box::new(move |_| seen.set(seen.get() + 1))),
            ..WarningConfig::default()
        });
        collector.emit("XPWD0001", None);
        collector.emit("XPWC0001", None);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_disabled_collector_drops_everything() {
        let collector = WarningCollector::new(WarningConfig {
            enabled: false,
            ..WarningConfig::default()
        });
        collector.emit("XPWD0001", None);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_filter_accessors() {
        let collector = WarningCollector::default();
        collector.emit("XPWD0001", None);
        collector.emit("XPWP0001", None);
        assert_eq!(
            collector.warnings_by_severity(Severity::Deprecation).len(),
            1
        );
        assert_eq!(
            collector.warnings_by_category(Category::Performance).len(),
            1
        );
    }
}
