//! The request context a handler sees.

use crate::method::Method;
use crate::pattern::Params;

/// One dispatched request: verb, routed path and the captured path parameters.
///
/// Parameters are made available here; they are not bound to handler
/// arguments automatically.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) verb: Method,
    pub(crate) path: String,
    pub(crate) params: Params,
}

impl Request {
    pub fn new(verb: Method, path: String, params: Params) -> Self {
        Self { verb, path, params }
    }

    pub fn verb(&self) -> Method { self.verb }
    pub fn path(&self) -> &str { &self.path }
    pub fn params(&self) -> &Params { &self.params }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}
