use std::rc::Rc;

use ahash::AHashMap;
use chrono::{DateTime, FixedOffset};

use xpq_name::Name;

use crate::annotations::TypeAnnotations;
use crate::error::{Error, Result};
use crate::function::{FunctionRegistry, Variables};
use crate::sequence::{Item, Sequence};
use crate::xml::Node;

use super::StaticContext;

/// The focus of evaluation: context item, position and size, all 1-based.
#[derive(Debug, Clone)]
pub struct Focus<N: Node> {
    pub item: Item<N>,
    pub position: usize,
    pub size: usize,
}

/// The dynamic context of one evaluation.
///
/// Derivation is copy-on-adjust: entering a predicate or an iteration
/// produces a new context sharing everything except the changed focus or
/// the extended variable environment. Shared parts are behind `Rc` and
/// treated as read-only for the duration of the evaluation.
#[derive(Debug)]
pub struct DynamicContext<N: Node> {
    static_context: Rc<StaticContext>,
    functions: Rc<FunctionRegistry<N>>,
    variables: Rc<Variables<N>>,
    focus: Option<Focus<N>>,
    current_date_time: DateTime<FixedOffset>,
    base_uri: Option<String>,
    documents: Rc<AHashMap<String, N>>,
    collections: Rc<AHashMap<String, Vec<N>>>,
    default_collection: Option<Rc<Vec<N>>>,
    annotations: Rc<TypeAnnotations>,
}

impl<N: Node> Clone for DynamicContext<N> {
    fn clone(&self) -> Self {
        Self {
            static_context: self.static_context.clone(),
            functions: self.functions.clone(),
            variables: self.variables.clone(),
            focus: self.focus.clone(),
            current_date_time: self.current_date_time,
            base_uri: self.base_uri.clone(),
            documents: self.documents.clone(),
            collections: self.collections.clone(),
            default_collection: self.default_collection.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

impl<N: Node> DynamicContext<N> {
    pub fn static_context(&self) -> &StaticContext {
        &self.static_context
    }

    pub fn functions(&self) -> &FunctionRegistry<N> {
        &self.functions
    }

    pub fn annotations(&self) -> &TypeAnnotations {
        &self.annotations
    }

    pub fn variable(&self, name: &Name) -> Result<Sequence<N>> {
        self.variables.get(name).cloned().ok_or(Error::XPDY0002)
    }

    pub fn focus(&self) -> Option<&Focus<N>> {
        self.focus.as_ref()
    }

    pub fn context_item(&self) -> Result<&Item<N>> {
        self.focus.as_ref().map(|f| &f.item).ok_or(Error::XPDY0002)
    }

    pub fn position(&self) -> Result<usize> {
        self.focus.as_ref().map(|f| f.position).ok_or(Error::XPDY0002)
    }

    pub fn size(&self) -> Result<usize> {
        self.focus.as_ref().map(|f| f.size).ok_or(Error::XPDY0002)
    }

    pub fn current_date_time(&self) -> DateTime<FixedOffset> {
        self.current_date_time
    }

    pub fn implicit_timezone(&self) -> FixedOffset {
        *self.current_date_time.offset()
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub fn document(&self, uri: &str) -> Option<&N> {
        self.documents.get(uri)
    }

    pub fn collection(&self, uri: &str) -> Option<&[N]> {
        self.collections.get(uri).map(|v| v.as_slice())
    }

    pub fn default_collection(&self) -> Option<&[N]> {
        self.default_collection.as_ref().map(|v| v.as_slice())
    }

    /// A derived context with a new focus.
    pub fn with_focus(&self, item: Item<N>, position: usize, size: usize) -> Self {
        let mut derived = self.clone();
        derived.focus = Some(Focus {
            item,
            position,
            size,
        });
        derived
    }

    /// A derived context with one more variable binding.
    pub fn with_variable(&self, name: Name, value: Sequence<N>) -> Self {
        let mut variables = (*self.variables).clone();
        variables.insert(name, value);
        let mut derived = self.clone();
        derived.variables = Rc::new(variables);
        derived
    }

    /// A derived context with a whole replacement variable environment,
    /// used when entering an inline function body.
    pub fn with_variables(&self, variables: Variables<N>) -> Self {
        let mut derived = self.clone();
        derived.variables = Rc::new(variables);
        derived
    }

    /// A derived context with no focus; inline function bodies start
    /// without a context item.
    pub fn without_focus(&self) -> Self {
        let mut derived = self.clone();
        derived.focus = None;
        derived
    }

    pub fn variables(&self) -> &Variables<N> {
        &self.variables
    }
}

/// Builds a [`DynamicContext`].
pub struct DynamicContextBuilder<N: Node> {
    static_context: Rc<StaticContext>,
    functions: Rc<FunctionRegistry<N>>,
    variables: Variables<N>,
    focus: Option<Focus<N>>,
    current_date_time: Option<DateTime<FixedOffset>>,
    base_uri: Option<String>,
    documents: AHashMap<String, N>,
    collections: AHashMap<String, Vec<N>>,
    default_collection: Option<Vec<N>>,
    annotations: Rc<TypeAnnotations>,
}

impl<N: Node> DynamicContextBuilder<N> {
    pub fn new(static_context: Rc<StaticContext>, functions: Rc<FunctionRegistry<N>>) -> Self {
        Self {
            static_context,
            functions,
            variables: Variables::default(),
            focus: None,
            current_date_time: None,
            base_uri: None,
            documents: AHashMap::new(),
            collections: AHashMap::new(),
            default_collection: None,
            annotations: Rc::new(TypeAnnotations::new()),
        }
    }

    pub fn context_item(mut self, item: Item<N>) -> Self {
        self.focus = Some(Focus {
            item,
            position: 1,
            size: 1,
        });
        self
    }

    pub fn context_node(self, node: N) -> Self {
        self.context_item(Item::Node(node))
    }

    pub fn variable(mut self, name: Name, value: Sequence<N>) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn current_date_time(mut self, value: DateTime<FixedOffset>) -> Self {
        self.current_date_time = Some(value);
        self
    }

    pub fn base_uri(mut self, uri: &str) -> Self {
        self.base_uri = Some(uri.to_string());
        self
    }

    pub fn document(mut self, uri: &str, root: N) -> Self {
        self.documents.insert(uri.to_string(), root);
        self
    }

    pub fn collection(mut self, uri: &str, nodes: Vec<N>) -> Self {
        self.collections.insert(uri.to_string(), nodes);
        self
    }

    pub fn default_collection(mut self, nodes: Vec<N>) -> Self {
        self.default_collection = Some(nodes);
        self
    }

    pub fn annotations(mut self, annotations: Rc<TypeAnnotations>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn build(self) -> DynamicContext<N> {
        DynamicContext {
            static_context: self.static_context,
            functions: self.functions,
            variables: Rc::new(self.variables),
            focus: self.focus,
            current_date_time: self
                .current_date_time
                .unwrap_or_else(|| chrono::Local::now().into()),
            base_uri: self.base_uri,
            documents: Rc::new(self.documents),
            collections: Rc::new(self.collections),
            default_collection: self.default_collection.map(Rc::new),
            annotations: self.annotations,
        }
    }
}
