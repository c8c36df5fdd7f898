use strum_macros::Display;

/// Severity of a warning, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Deprecation,
}

/// Coarse warning category used for suppression and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Deprecation,
    Compatibility,
    TypeCoercion,
    BehaviorChange,
    Performance,
}

/// A single collected warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Stable warning code (`XPWD0001`, `XPWC0001`, ...).
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    /// What the warning is about: the offending source fragment, function
    /// name, or similar.
    pub context: Option<String>,
    /// Suggested migration, when one exists.
    pub migration: Option<String>,
    /// Pointer into the XPath/XSLT specifications.
    pub spec_reference: Option<String>,
}

/// Metadata for a known warning code.
#[derive(Debug, Clone, Copy)]
pub struct WarningInfo {
    pub code: &'static str,
    pub message: &'static str,
    pub severity: Severity,
    pub category: Category,
    pub migration: Option<&'static str>,
    pub spec_reference: Option<&'static str>,
}

// Code families: XPWD deprecation, XPWC compatibility, XPWT type coercion,
// XPWB behavior change, XPWP performance.
const KNOWN_WARNINGS: &[WarningInfo] = &[
    WarningInfo {
        code: "XPWD0001",
        message: "The namespace axis is deprecated since XPath 2.0",
        severity: Severity::Deprecation,
        category: Category::Deprecation,
        migration: Some("Use fn:in-scope-prefixes and fn:namespace-uri-for-prefix instead"),
        spec_reference: Some("https://www.w3.org/TR/xpath20/#axes"),
    },
    WarningInfo {
        code: "XPWC0001",
        message: "XPath 1.0 compatibility mode changes comparison and conversion semantics",
        severity: Severity::Warning,
        category: Category::Compatibility,
        migration: Some("Port expressions to XPath 2.0 semantics and disable compatibility mode"),
        spec_reference: Some("https://www.w3.org/TR/xpath20/#id-backwards-compatibility"),
    },
    WarningInfo {
        code: "XPWT0001",
        message: "Untyped value is implicitly coerced to a number",
        severity: Severity::Info,
        category: Category::TypeCoercion,
        migration: None,
        spec_reference: Some("https://www.w3.org/TR/xpath-31/#id-arithmetic"),
    },
    WarningInfo {
        code: "XPWB0001",
        message: "Expression behavior differs between XPath versions",
        severity: Severity::Warning,
        category: Category::BehaviorChange,
        migration: None,
        spec_reference: None,
    },
    WarningInfo {
        code: "XPWP0001",
        message: "Expression requires free navigation and cannot be streamed",
        severity: Severity::Info,
        category: Category::Performance,
        migration: Some("Restructure the path to use only downward axes"),
        spec_reference: Some("https://www.w3.org/TR/xslt-30/#streamability"),
    },
];

/// Look up the metadata of a known warning code.
pub fn warning_metadata(code: &str) -> Option<&'static WarningInfo> {
    KNOWN_WARNINGS.iter().find(|info| info.code == code)
}

impl Warning {
    /// Build a warning from a code, synthesizing a placeholder message for
    /// codes the metadata table doesn't know.
    pub fn from_code(code: &str, context: Option<String>) -> Self {
        match warning_metadata(code) {
            Some(info) => Warning {
                code: info.code.to_string(),
                message: info.message.to_string(),
                severity: info.severity,
                category: info.category,
                context,
                migration: info.migration.map(|s| s.to_string()),
                spec_reference: info.spec_reference.map(|s| s.to_string()),
            },
            None => Warning {
                code: code.to_string(),
                message: format!("Unknown warning: {}", code),
                severity: Severity::Warning,
                category: Category::BehaviorChange,
                context,
                migration: None,
                spec_reference: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Deprecation);
    }

    #[test]
    fn test_known_code() {
        let warning = Warning::from_code("XPWD0001", Some("namespace::foo".to_string()));
        assert_eq!(warning.severity, Severity::Deprecation);
        assert_eq!(warning.category, Category::Deprecation);
        assert!(warning.migration.is_some());
    }

    #[test]
    fn test_unknown_code_still_collects() {
        let warning = Warning::from_code("XPWX9999", None);
        assert_eq!(warning.code, "XPWX9999");
        assert!(warning.message.contains("Unknown warning"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::TypeCoercion.to_string(), "type-coercion");
        assert_eq!(Severity::Deprecation.to_string(), "deprecation");
    }
}
