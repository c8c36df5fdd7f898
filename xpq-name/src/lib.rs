mod name;
mod namespaces;

pub use name::Name;
pub use namespaces::{
    NamespaceLookup, Namespaces, ARRAY_NAMESPACE, FN_NAMESPACE, MAP_NAMESPACE, MATH_NAMESPACE,
    XML_NAMESPACE, XS_NAMESPACE,
};
