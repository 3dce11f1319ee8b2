//! # frontal
//!
//! A minimal front controller. One entry point, every request.
//!
//! ## The contract
//!
//! Handlers are declared next to their path and verb. At startup the
//! declarations are compiled once into a [`RouteTable`]; from then on the
//! table is read-only and shared by every request without locks.
//!
//! Per request the [`Dispatcher`]:
//!
//! - resolves the path: an exact literal template wins, otherwise the first
//!   registered `{placeholder}` template that matches,
//! - invokes the handler with the captured parameters in its [`Request`],
//! - classifies what came back: text, a view with its model, any other
//!   value, or nothing at all.
//!
//! Nothing a request does can take the server down. Unmatched paths get a
//! page listing every registered route; failing (or panicking) handlers get
//! an error page with the failure's message and kind.
//!
//! What frontal does not do: authentication, sessions, content negotiation,
//! request bodies, middleware.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use frontal::{App, Controllers, ModelView, Request, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), frontal::Error> {
//!     let controllers = Controllers::new().controller("Greeter", |c| {
//!         c.get("/hello", "say_hello", say_hello)
//!          .get("/str/{str}", "echo", echo)
//!          .get("/welcome/{name}", "welcome", welcome)
//!     });
//!
//!     Server::bind("0.0.0.0:3000")?.serve(App::new(controllers)).await
//! }
//!
//! fn say_hello(_req: &Request) -> &'static str {
//!     "Hello world !"
//! }
//!
//! fn echo(req: &Request) -> Option<String> {
//!     req.param("str").map(str::to_owned)
//! }
//!
//! fn welcome(req: &Request) -> ModelView {
//!     ModelView::new("welcome").with("name", req.param("name").unwrap_or("stranger"))
//! }
//! ```

mod binding;
mod catalog;
mod config;
mod dispatcher;
mod error;
mod handler;
mod method;
mod pattern;
mod render;
mod request;
mod response;
mod route_table;
mod server;
mod status;

pub use binding::{HandlerBinding, HandlerRef};
pub use catalog::{Controllers, Discovered, HandlerCatalog, HandlerInvoker, Scope};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{Error, Failure, MalformedPattern, RegistrationError, RenderError};
pub use handler::{Handler, IntoReply, Model, ModelView, Reply};
pub use method::Method;
pub use pattern::{Params, PathPattern, Segment};
pub use render::{render, DebugViews, EMPTY_TEXT, Rendered, ViewResolver};
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuilder};
pub use route_table::{DispatchOutcome, Route, RouteTable};
pub use server::{App, Server};
pub use status::Status;
