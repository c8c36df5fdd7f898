use std::fmt;

use crate::namespaces::NamespaceLookup;

/// A qualified XML name.
///
/// The prefix is retained for display purposes only; equality and hashing
/// look at the local name and namespace URI alone.
#[derive(Debug, Clone, Eq)]
pub struct Name {
    local: String,
    namespace: Option<String>,
    prefix: Option<String>,
}

impl std::hash::Hash for Name {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.local.hash(state);
        self.namespace.hash(state);
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl Name {
    pub fn new(local: String, namespace: Option<String>, prefix: Option<String>) -> Self {
        Name {
            local,
            namespace,
            prefix,
        }
    }

    /// Resolve a prefixed name against a namespace lookup. `None` if the
    /// prefix has no binding.
    pub fn prefixed(prefix: &str, local: &str, namespaces: impl NamespaceLookup) -> Option<Self> {
        let namespace = namespaces.by_prefix(prefix)?;
        Some(Name {
            local: local.to_string(),
            namespace: Some(namespace.to_string()),
            prefix: Some(prefix.to_string()),
        })
    }

    pub fn unprefixed(local: &str) -> Self {
        Name {
            local: local.to_string(),
            namespace: None,
            prefix: None,
        }
    }

    pub fn namespaced(uri: &str, local: &str) -> Self {
        Name {
            local: local.to_string(),
            namespace: Some(uri.to_string()),
            prefix: None,
        }
    }

    /// Place an unqualified name into a default namespace, if one is given.
    pub fn with_default_namespace(self, uri: Option<&str>) -> Self {
        if let Some(uri) = uri {
            if self.namespace.is_none() && !uri.is_empty() {
                return Name {
                    local: self.local,
                    namespace: Some(uri.to_string()),
                    prefix: None,
                };
            }
        }
        self
    }

    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn in_default_namespace(&self) -> bool {
        self.namespace.is_none() && self.prefix.is_none()
    }

    /// Clark notation: `{namespaceURI}localName`, or the bare local name
    /// when there is no namespace.
    pub fn clark(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.local),
            None => self.local.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => write!(f, "{}:{}", prefix, self.local),
            _ => write!(f, "{}", self.local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_ignores_prefix() {
        let a = Name::new("div".to_string(), Some("urn:x".to_string()), None);
        let b = Name::new(
            "div".to_string(),
            Some("urn:x".to_string()),
            Some("x".to_string()),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_clark() {
        let name = Name::namespaced("urn:x", "div");
        assert_eq!(name.clark(), "{urn:x}div");
        assert_eq!(Name::unprefixed("div").clark(), "div");
    }

    #[test]
    fn test_display_uses_prefix() {
        let name = Name::new(
            "sqrt".to_string(),
            Some("http://www.w3.org/2005/xpath-functions/math".to_string()),
            Some("math".to_string()),
        );
        assert_eq!(name.to_string(), "math:sqrt");
    }
}
