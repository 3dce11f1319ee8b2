//! Handler discovery and invocation seams.
//!
//! The route table does not care how bindings were found. Whatever produces
//! them (a static list, generated code, a plugin registry) implements
//! [`HandlerCatalog`]. Calling a bound handler goes through
//! [`HandlerInvoker`], so the table only ever holds [`HandlerRef`]s.
//!
//! [`Controllers`] is the built-in implementation of both: handlers grouped
//! by owner, declared next to their path and verb.
//!
//! ```rust
//! use frontal::{Controllers, Request};
//!
//! fn say_hello(_req: &Request) -> &'static str { "Hello world !" }
//! fn say_bye(_req: &Request) {}
//!
//! let controllers = Controllers::new().controller("Greeter", |c| {
//!     c.get("/hello", "say_hello", say_hello)
//!      .on_verb("", "/bye", "say_bye", say_bye)
//! });
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::binding::{HandlerBinding, HandlerRef};
use crate::error::{Failure, RegistrationError};
use crate::handler::{BoxedHandler, Handler, Reply};
use crate::method::Method;
use crate::request::Request;

/// A discovered binding, or the reason it could not be produced.
pub type Discovered = Result<HandlerBinding, RegistrationError>;

/// Enumerates handler bindings at startup.
pub trait HandlerCatalog {
    /// Every discovered binding, in registration order.
    fn bindings(&self) -> Vec<Discovered>;
}

/// Invokes the handler behind a [`HandlerRef`].
///
/// Shared read-only across concurrent dispatches.
pub trait HandlerInvoker: Send + Sync {
    fn invoke(&self, handler: &HandlerRef, req: &Request) -> Result<Option<Reply>, Failure>;
}

// ── Controllers ──────────────────────────────────────────────────────────────

/// A static handler catalog.
///
/// Built once, then handed to [`RouteTable::from_catalog`](crate::RouteTable::from_catalog)
/// and kept as the [`HandlerInvoker`].
///
/// Routes resolve by path alone. Binding one path under two verbs leaves
/// the later binding unreachable; branch on [`Request::verb`] inside a
/// single handler instead.
#[derive(Default)]
pub struct Controllers {
    discovered: Vec<Discovered>,
    handlers: HashMap<HandlerRef, BoxedHandler>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handlers of one owner.
    pub fn controller(self, owner: &str, declare: impl FnOnce(Scope) -> Scope) -> Self {
        declare(Scope { owner: owner.to_owned(), controllers: self }).controllers
    }

    /// Registers a handler under an explicit identity.
    pub fn on(self, verb: Method, path: &str, handler: HandlerRef, h: impl Handler) -> Self {
        self.add(Ok(verb), path, handler, h)
    }

    /// Registers a `GET` handler.
    pub fn get(self, path: &str, handler: HandlerRef, h: impl Handler) -> Self {
        self.on(Method::Get, path, handler, h)
    }

    /// Registers a handler whose verb comes from metadata as a string.
    ///
    /// An empty verb means `GET`. An unknown verb is reported as a discovery
    /// failure for this binding only.
    pub fn on_verb(self, verb: &str, path: &str, handler: HandlerRef, h: impl Handler) -> Self {
        let parsed = Method::from_declared(verb).map_err(|e| e.to_string());
        self.add(parsed, path, handler, h)
    }

    fn add(
        mut self,
        verb: Result<Method, String>,
        path: &str,
        handler: HandlerRef,
        h: impl Handler,
    ) -> Self {
        if self.handlers.contains_key(&handler) {
            self.discovered.push(Err(RegistrationError::Discovery {
                reason: format!("{handler} is already bound"),
                handler,
            }));
            return self;
        }

        match verb {
            Ok(verb) => {
                debug!(template = path, %verb, %handler, "handler discovered");
                self.handlers.insert(handler.clone(), h.into_boxed_handler());
                self.discovered.push(Ok(HandlerBinding::new(path, verb, handler)));
            }
            Err(reason) => {
                self.discovered.push(Err(RegistrationError::Discovery { handler, reason }));
            }
        }
        self
    }
}

impl HandlerCatalog for Controllers {
    fn bindings(&self) -> Vec<Discovered> {
        self.discovered.clone()
    }
}

impl HandlerInvoker for Controllers {
    fn invoke(&self, handler: &HandlerRef, req: &Request) -> Result<Option<Reply>, Failure> {
        match self.handlers.get(handler) {
            Some(h) => h.call(req),
            None => Err(Failure::unknown_handler(handler)),
        }
    }
}

/// The handlers of one owner, being declared. See [`Controllers::controller`].
pub struct Scope {
    owner: String,
    controllers: Controllers,
}

impl Scope {
    pub fn on(mut self, verb: Method, path: &str, entry_point: &str, h: impl Handler) -> Self {
        let handler = HandlerRef::new(self.owner.as_str(), entry_point);
        self.controllers = self.controllers.on(verb, path, handler, h);
        self
    }

    pub fn get(self, path: &str, entry_point: &str, h: impl Handler) -> Self {
        self.on(Method::Get, path, entry_point, h)
    }

    pub fn post(self, path: &str, entry_point: &str, h: impl Handler) -> Self {
        self.on(Method::Post, path, entry_point, h)
    }

    pub fn on_verb(mut self, verb: &str, path: &str, entry_point: &str, h: impl Handler) -> Self {
        let handler = HandlerRef::new(self.owner.as_str(), entry_point);
        self.controllers = self.controllers.on_verb(verb, path, handler, h);
        self
    }
}
