//! Handler trait, return values and type erasure.
//!
//! # What a handler returns
//!
//! A handler is any `Fn(&Request) -> R` where `R: IntoReply`. The return
//! value is classified once, into a [`Reply`], by a fixed set of conversions:
//!
//! | Handler returns | Reply |
//! |---|---|
//! | `String`, `&'static str` | `Reply::Text(Some(..))` |
//! | `Option<String>` | `Reply::Text(..)`, `None` becomes a placeholder body |
//! | [`ModelView`] | `Reply::View` |
//! | `serde_json::Value`, [`Reply::object`] | `Reply::Object` |
//! | `()` | no reply: the no-content debug page |
//! | `Result<T, E>` | `T`'s reply, or a [`Failure`] classified by `E` |
//!
//! `E` is anything that converts into `Box<dyn Error + Send + Sync>`, so a
//! handler can use `?` on mixed error types and return the boxed error.
//!
//! # How handlers are stored
//!
//! The catalog holds handlers of different concrete types in one map, so each
//! one is boxed behind [`ErasedHandler`]:
//!
//! ```text
//! fn say_hello(req: &Request) -> String { … }    ← user writes this
//!        ↓ controllers.get("/hello", href, say_hello)
//! say_hello.into_boxed_handler()                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(say_hello))                  ← stored as BoxedHandler
//!        ↓
//! handler.call(&req)  at request time             ← one vtable dispatch
//! ```
//!
//! Dispatch never suspends, so handlers are plain synchronous functions.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Failure;
use crate::request::Request;

/// The opaque model carried by a view forward.
pub type Model = serde_json::Map<String, Value>;

// ── ModelView ────────────────────────────────────────────────────────────────

/// A named view plus the data it should be rendered with.
///
/// Resolution of the view name is left to a
/// [`ViewResolver`](crate::ViewResolver).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelView {
    view: String,
    model: Model,
}

impl ModelView {
    pub fn new(view: impl Into<String>) -> Self {
        Self { view: view.into(), model: Model::new() }
    }

    /// Adds one model entry. Returns `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.model.insert(key.into(), value.into());
        self
    }

    pub fn view(&self) -> &str { &self.view }
    pub fn model(&self) -> &Model { &self.model }

    pub(crate) fn into_parts(self) -> (String, Model) {
        (self.view, self.model)
    }
}

// ── Reply ────────────────────────────────────────────────────────────────────

/// A handler's return value, classified.
pub enum Reply {
    /// Plain text. `None` stands for an absent string.
    Text(Option<String>),
    View(ModelView),
    /// Anything else, rendered through its `Display` impl.
    Object(Box<dyn fmt::Display + Send>),
}

impl Reply {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(Some(body.into()))
    }

    pub fn object(value: impl fmt::Display + Send + 'static) -> Self {
        Self::Object(Box::new(value))
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::View(mv) => f.debug_tuple("View").field(mv).finish(),
            Self::Object(obj) => f.debug_tuple("Object").field(&obj.to_string()).finish(),
        }
    }
}

// ── IntoReply ────────────────────────────────────────────────────────────────

/// Conversion of a handler's return value.
///
/// `Ok(None)` means the handler produced nothing (a `()` handler).
pub trait IntoReply {
    fn into_reply(self) -> Result<Option<Reply>, Failure>;
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(None) }
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(Some(self)) }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(Some(Reply::Text(Some(self)))) }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(Some(Reply::text(self))) }
}

impl IntoReply for Option<String> {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(Some(Reply::Text(self))) }
}

impl IntoReply for ModelView {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(Some(Reply::View(self))) }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Option<Reply>, Failure> { Ok(Some(Reply::object(self))) }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn into_reply(self) -> Result<Option<Reply>, Failure> {
        match self {
            Ok(value) => value.into_reply(),
            Err(err) => Err(Failure::from_error(err)),
        }
    }
}

// ── Erasure ──────────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of
/// [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: &Request) -> Result<Option<Reply>, Failure>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid handler.
///
/// Sealed: satisfied automatically by any `Fn(&Request) -> impl IntoReply`
/// that is `Send + Sync + 'static`, and by nothing else.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(&Request) -> R + Send + Sync + 'static,
    R: IntoReply,
{
}

impl<F, R> Handler for F
where
    F: Fn(&Request) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(&Request) -> R,
    R: IntoReply,
{
    fn call(&self, req: &Request) -> Result<Option<Reply>, Failure> {
        (self.0)(req).into_reply()
    }
}
