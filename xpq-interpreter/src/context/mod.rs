mod dynamic_context;
mod static_context;

pub use dynamic_context::{DynamicContext, DynamicContextBuilder, Focus};
pub use static_context::{SchemaRegistry, Signature, StaticContext, StaticContextBuilder};
