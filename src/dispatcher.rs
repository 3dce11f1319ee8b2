//! The front controller.
//!
//! Per request:
//!
//! ```text
//! Received → Resolving ─┬─ Matched → Invoking ─┬─ Rendered
//!                       │                      └─ Failed (InvocationError)
//!                       └─ Unmatched → Rendered (NotFoundPage)
//! ```
//!
//! Every request is handled exactly once, with no retries. A handler failure,
//! returned or panicked, ends that request only: it is caught here and
//! rendered, never propagated to the serving loop.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::catalog::HandlerInvoker;
use crate::error::Failure;
use crate::method::Method;
use crate::render::{render, Rendered};
use crate::request::Request;
use crate::route_table::{DispatchOutcome, RouteTable};

/// Owns the route table for the life of the process.
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable { &self.table }

    /// Resolves `path`, invokes the bound handler and classifies its result.
    ///
    /// The captured path parameters reach the handler through its
    /// [`Request`]; they are not bound to arguments.
    pub fn dispatch(&self, path: &str, verb: Method, invoker: &dyn HandlerInvoker) -> Rendered {
        let (route, params) = match self.table.resolve(path) {
            DispatchOutcome::Matched { route, params } => (route, params),
            DispatchOutcome::NotFound => {
                debug!(%verb, path, "no route matched");
                return Rendered::NotFoundPage {
                    path: path.to_owned(),
                    templates: self.table.templates().map(str::to_owned).collect(),
                };
            }
        };

        let handler = route.binding().handler();
        debug!(%verb, path, template = route.template(), %handler, ?params, "route matched");

        let req = Request::new(verb, path.to_owned(), params);
        let result = panic::catch_unwind(AssertUnwindSafe(|| invoker.invoke(handler, &req)))
            .unwrap_or_else(|payload| Err(Failure::from_panic(payload)));

        match result {
            Ok(reply) => render(reply, path, handler),
            Err(failure) => {
                error!(%verb, path, %handler, kind = %failure.kind, message = %failure.message, "handler failed");
                Rendered::InvocationError { path: path.to_owned(), failure }
            }
        }
    }
}
