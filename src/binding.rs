//! Handler bindings: what the catalog hands to the route table.

use std::fmt;

use crate::method::Method;

/// Identity of an invocable unit: the owning type and its entry point.
///
/// Opaque to the route table; only the [`HandlerInvoker`](crate::HandlerInvoker)
/// knows how to turn one into a call.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HandlerRef {
    owner: String,
    entry_point: String,
}

impl HandlerRef {
    pub fn new(owner: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self { owner: owner.into(), entry_point: entry_point.into() }
    }

    pub fn owner(&self) -> &str { &self.owner }
    pub fn entry_point(&self) -> &str { &self.entry_point }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.entry_point)
    }
}

/// A route template paired with a verb and a handler.
///
/// Immutable once created. The declared parameter names are not stored here;
/// they come out of compiling the template (see [`Route::param_names`](crate::Route::param_names)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandlerBinding {
    template: String,
    verb: Method,
    handler: HandlerRef,
}

impl HandlerBinding {
    pub fn new(template: impl Into<String>, verb: Method, handler: HandlerRef) -> Self {
        Self { template: template.into(), verb, handler }
    }

    /// A `GET` binding, the verb used when metadata does not declare one.
    pub fn get(template: impl Into<String>, handler: HandlerRef) -> Self {
        Self::new(template, Method::Get, handler)
    }

    pub fn template(&self) -> &str { &self.template }
    pub fn verb(&self) -> Method { self.verb }
    pub fn handler(&self) -> &HandlerRef { &self.handler }
}
