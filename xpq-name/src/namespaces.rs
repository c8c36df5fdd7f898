use ahash::{HashMap, HashMapExt};

pub const FN_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions";
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const MATH_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions/math";
pub const MAP_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions/map";
pub const ARRAY_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions/array";

const STATIC_NAMESPACES: [(&str, &str); 6] = [
    ("xs", XS_NAMESPACE),
    ("fn", FN_NAMESPACE),
    ("math", MATH_NAMESPACE),
    ("map", MAP_NAMESPACE),
    ("array", ARRAY_NAMESPACE),
    ("err", "http://www.w3.org/2005/xqt-errors"),
];

/// The statically known prefix to namespace URI bindings of an expression.
///
/// The `xml` prefix and the well-known XPath prefixes are always present.
#[derive(Debug, Clone)]
pub struct Namespaces {
    namespaces: HashMap<String, String>,
    default_element_namespace: Option<String>,
    default_function_namespace: String,
}

impl Namespaces {
    pub fn new(
        default_element_namespace: Option<String>,
        default_function_namespace: String,
    ) -> Self {
        let mut namespaces = HashMap::new();
        namespaces.insert("xml".to_string(), XML_NAMESPACE.to_string());
        for (prefix, uri) in STATIC_NAMESPACES {
            namespaces.insert(prefix.to_string(), uri.to_string());
        }
        Self {
            namespaces,
            default_element_namespace,
            default_function_namespace,
        }
    }

    pub fn add(&mut self, prefix: &str, uri: &str) {
        if prefix.is_empty() {
            self.default_element_namespace = Some(uri.to_string());
        } else {
            self.namespaces.insert(prefix.to_string(), uri.to_string());
        }
    }

    #[inline]
    pub fn default_element_namespace(&self) -> Option<&str> {
        self.default_element_namespace.as_deref()
    }

    #[inline]
    pub fn default_function_namespace(&self) -> &str {
        &self.default_function_namespace
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new(None, FN_NAMESPACE.to_string())
    }
}

pub trait NamespaceLookup {
    fn by_prefix(&self, prefix: &str) -> Option<&str>;
}

impl NamespaceLookup for Namespaces {
    fn by_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(|s| s.as_str())
    }
}

impl<T: NamespaceLookup> NamespaceLookup for &T {
    fn by_prefix(&self, prefix: &str) -> Option<&str> {
        (**self).by_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_prefixes() {
        let namespaces = Namespaces::default();
        assert_eq!(namespaces.by_prefix("xs"), Some(XS_NAMESPACE));
        assert_eq!(namespaces.by_prefix("xml"), Some(XML_NAMESPACE));
        assert_eq!(namespaces.by_prefix("nope"), None);
    }

    #[test]
    fn test_empty_prefix_sets_default() {
        let mut namespaces = Namespaces::default();
        namespaces.add("", "urn:default");
        assert_eq!(namespaces.default_element_namespace(), Some("urn:default"));
    }
}
