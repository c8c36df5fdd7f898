use ahash::AHashMap;

use xpq_ast::types::SequenceType;
use xpq_ast::{is_reserved_function_name, parse_xpath, ParserError, Version, XPath};
use xpq_name::{Name, Namespaces, XS_NAMESPACE};

use crate::error::{Error, Result};

pub const CODEPOINT_COLLATION: &str =
    "http://www.w3.org/2005/xpath-functions/collation/codepoint";

/// A registered function signature, consulted when validating calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: Name,
    pub min_args: usize,
    pub max_args: usize,
}

/// The statically known environment of an expression: namespaces,
/// collations, signatures, declared variable types and schema
/// declarations.
#[derive(Debug, Clone)]
pub struct StaticContext {
    namespaces: Namespaces,
    default_type_namespace: String,
    collations: Vec<String>,
    default_collation: String,
    function_signatures: AHashMap<Name, Vec<Signature>>,
    variable_types: AHashMap<Name, SequenceType>,
    context_item_type: Option<SequenceType>,
    schema_types: AHashMap<String, Name>,
    element_declarations: AHashMap<String, Name>,
    attribute_declarations: AHashMap<String, Name>,
}

impl Default for StaticContext {
    fn default() -> Self {
        Self {
            namespaces: Namespaces::default(),
            default_type_namespace: XS_NAMESPACE.to_string(),
            collations: vec![CODEPOINT_COLLATION.to_string()],
            default_collation: CODEPOINT_COLLATION.to_string(),
            function_signatures: AHashMap::new(),
            variable_types: AHashMap::new(),
            context_item_type: None,
            schema_types: AHashMap::new(),
            element_declarations: AHashMap::new(),
            attribute_declarations: AHashMap::new(),
        }
    }
}

impl StaticContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn default_type_namespace(&self) -> &str {
        &self.default_type_namespace
    }

    pub fn default_collation(&self) -> &str {
        &self.default_collation
    }

    pub fn collations(&self) -> &[String] {
        &self.collations
    }

    pub fn register_function_signature(&mut self, signature: Signature) {
        self.function_signatures
            .entry(signature.name.clone())
            .or_default()
            .push(signature);
    }

    pub fn function_signatures(&self, name: &Name) -> &[Signature] {
        self.function_signatures
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn register_variable_type(&mut self, name: Name, sequence_type: SequenceType) {
        self.variable_types.insert(name, sequence_type);
    }

    pub fn variable_type(&self, name: &Name) -> Option<&SequenceType> {
        self.variable_types.get(name)
    }

    pub fn context_item_type(&self) -> Option<&SequenceType> {
        self.context_item_type.as_ref()
    }

    pub fn is_reserved_function_name(&self, name: &str) -> bool {
        is_reserved_function_name(name)
    }

    pub fn element_declaration(&self, name: &str) -> Option<&Name> {
        self.element_declarations.get(name)
    }

    pub fn attribute_declaration(&self, name: &str) -> Option<&Name> {
        self.attribute_declarations.get(name)
    }

    pub fn schema_type(&self, name: &str) -> Option<&Name> {
        self.schema_types.get(name)
    }

    /// Consistency check; each finding is one message.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();
        for signatures in self.function_signatures.values() {
            for signature in signatures {
                if signature.max_args < signature.min_args {
                    findings.push(format!(
                        "function {}: maxArgs {} is less than minArgs {}",
                        signature.name, signature.max_args, signature.min_args
                    ));
                }
            }
        }
        if !self.collations.contains(&self.default_collation) {
            findings.push(format!(
                "default collation {} is not among the statically known collations",
                self.default_collation
            ));
        }
        findings
    }

    /// Populate the type namespace and declarations from a schema
    /// registry.
    pub fn apply_schema(&mut self, schema: &SchemaRegistry) {
        if let Some(target) = &schema.target_namespace {
            self.default_type_namespace = target.clone();
        }
        for (name, type_name) in &schema.types {
            self.schema_types.insert(name.clone(), type_name.clone());
        }
        for (name, type_name) in &schema.elements {
            self.element_declarations
                .insert(name.clone(), type_name.clone());
        }
        for (name, type_name) in &schema.attributes {
            self.attribute_declarations
                .insert(name.clone(), type_name.clone());
        }
    }

    /// Parse an expression under this context's namespaces.
    pub fn parse(&self, source: &str, version: Version) -> std::result::Result<XPath, ParserError> {
        parse_xpath(source, version, &self.namespaces)
    }
}

/// A structured schema: target namespace plus name → type declarations.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    pub target_namespace: Option<String>,
    pub types: Vec<(String, Name)>,
    pub elements: Vec<(String, Name)>,
    pub attributes: Vec<(String, Name)>,
}

impl SchemaRegistry {
    /// Extract `targetNamespace` and the top-level `element`/`attribute`
    /// declarations from a minimal XSD text.
    pub fn from_xsd(text: &str) -> Result<SchemaRegistry> {
        const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
        let document = roxmltree::Document::parse(text).map_err(|_| Error::FORG0001)?;
        let root = document.root_element();
        if root.tag_name().namespace() != Some(XSD_NS) || root.tag_name().name() != "schema" {
            return Err(Error::FORG0001);
        }
        let mut registry = SchemaRegistry {
            target_namespace: root.attribute("targetNamespace").map(|s| s.to_string()),
            ..SchemaRegistry::default()
        };
        for child in root.children().filter(|c| c.is_element()) {
            if child.tag_name().namespace() != Some(XSD_NS) {
                continue;
            }
            let name = match child.attribute("name") {
                Some(name) => name.to_string(),
                None => continue,
            };
            let type_name = child
                .attribute("type")
                .map(parse_type_name)
                .unwrap_or_else(|| Name::namespaced(XS_NAMESPACE, "anyType"));
            match child.tag_name().name() {
                "element" => registry.elements.push((name, type_name)),
                "attribute" => registry.attributes.push((name, type_name)),
                "simpleType" | "complexType" => {
                    registry.types.push((name.clone(), Name::unprefixed(&name)))
                }
                _ => {}
            }
        }
        Ok(registry)
    }
}

fn parse_type_name(raw: &str) -> Name {
    match raw.split_once(':') {
        Some((prefix, local)) if prefix == "xs" || prefix == "xsd" => {
            Name::new(
                local.to_string(),
                Some(XS_NAMESPACE.to_string()),
                Some(prefix.to_string()),
            )
        }
        Some((prefix, local)) => Name::new(local.to_string(), None, Some(prefix.to_string())),
        None => Name::unprefixed(raw),
    }
}

/// Builder over [`StaticContext`].
#[derive(Debug, Default)]
pub struct StaticContextBuilder {
    context: StaticContext,
}

impl StaticContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.context.namespaces.add(prefix, uri);
        self
    }

    pub fn collation(mut self, uri: &str) -> Self {
        self.context.collations.push(uri.to_string());
        self
    }

    pub fn default_collation(mut self, uri: &str) -> Self {
        self.context.default_collation = uri.to_string();
        self
    }

    pub fn function_signature(mut self, signature: Signature) -> Self {
        self.context.register_function_signature(signature);
        self
    }

    pub fn variable_type(mut self, name: Name, sequence_type: SequenceType) -> Self {
        self.context.register_variable_type(name, sequence_type);
        self
    }

    pub fn context_item_type(mut self, sequence_type: SequenceType) -> Self {
        self.context.context_item_type = Some(sequence_type);
        self
    }

    pub fn schema(mut self, registry: &SchemaRegistry) -> Self {
        self.context.apply_schema(registry);
        self
    }

    pub fn build(self) -> StaticContext {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flags_bad_signature_and_collation() {
        let mut context = StaticContext::new();
        context.register_function_signature(Signature {
            name: Name::namespaced("urn:ext", "broken"),
            min_args: 3,
            max_args: 1,
        });
        let findings = context.validate();
        assert_eq!(findings.len(), 1);

        let context = StaticContextBuilder::new()
            .default_collation("urn:unknown-collation")
            .build();
        assert_eq!(context.validate().len(), 1);
    }

    #[test]
    fn test_schema_import_from_xsd_text() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                       targetNamespace="urn:invoice">
                <xs:element name="invoice" type="xs:string"/>
                <xs:element name="count" type="xs:integer"/>
                <xs:attribute name="currency" type="xs:string"/>
                <xs:simpleType name="money"/>
            </xs:schema>
        "#;
        let registry = SchemaRegistry::from_xsd(xsd).unwrap();
        assert_eq!(registry.target_namespace.as_deref(), Some("urn:invoice"));
        assert_eq!(registry.elements.len(), 2);
        assert_eq!(registry.attributes.len(), 1);
        assert_eq!(registry.types.len(), 1);

        let mut context = StaticContext::new();
        context.apply_schema(&registry);
        assert_eq!(context.default_type_namespace(), "urn:invoice");
        assert_eq!(
            context.element_declaration("count").map(|n| n.local_name()),
            Some("integer")
        );
        assert!(context.attribute_declaration("currency").is_some());
    }

    #[test]
    fn test_schema_import_rejects_non_schema() {
        assert!(SchemaRegistry::from_xsd("<root/>").is_err());
        assert!(SchemaRegistry::from_xsd("not xml").is_err());
    }

    #[test]
    fn test_reserved_function_names() {
        let context = StaticContext::new();
        assert!(context.is_reserved_function_name("if"));
        assert!(!context.is_reserved_function_name("string"));
    }
}
