//! Error taxonomy.
//!
//! Two kinds of failure live here and they travel very differently:
//!
//! - **Build-time** failures ([`MalformedPattern`], [`RegistrationError`]) are
//!   collected per binding while the [`RouteTable`](crate::RouteTable) is
//!   built. The faulty binding is excluded, the rest of the table serves.
//! - **Request-time** failures ([`Failure`], [`RenderError`]) are caught at the
//!   dispatcher boundary and turned into a diagnostic response. They never
//!   reach the serving loop.
//!
//! An unmatched path is not an error at all: it is
//! [`DispatchOutcome::NotFound`](crate::DispatchOutcome::NotFound).
//!
//! [`Error`] covers what is left: binding a socket, reading configuration.

use std::any::Any;
use std::error::Error as StdError;

use thiserror::Error;

use crate::binding::HandlerRef;

/// The error type returned by frontal's infrastructure operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid bind address `{0}`")]
    InvalidAddress(String),

    #[error("unknown http method `{0}`")]
    UnknownMethod(String),
}

/// A route template that cannot be compiled.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MalformedPattern {
    #[error("unmatched brace in segment `{segment}` of `{template}`")]
    UnmatchedBrace { template: String, segment: String },

    #[error("empty placeholder `{{}}` in `{template}`")]
    EmptyPlaceholder { template: String },

    #[error("placeholder `{name}` declared twice in `{template}`")]
    DuplicatePlaceholder { template: String, name: String },

    #[error("`{template}` does not compile to a matcher: {reason}")]
    Regex { template: String, reason: String },
}

impl MalformedPattern {
    /// The template that failed to compile.
    pub fn template(&self) -> &str {
        match self {
            Self::UnmatchedBrace { template, .. }
            | Self::EmptyPlaceholder { template }
            | Self::DuplicatePlaceholder { template, .. }
            | Self::Regex { template, .. } => template,
        }
    }
}

/// A single binding that could not be registered.
///
/// Reported once per binding; never aborts the table build.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RegistrationError {
    #[error("route `{template}` for {handler}: {source}")]
    Pattern {
        template: String,
        handler: HandlerRef,
        #[source]
        source: MalformedPattern,
    },

    #[error("discovery failed for {handler}: {reason}")]
    Discovery { handler: HandlerRef, reason: String },
}

impl RegistrationError {
    pub fn handler(&self) -> &HandlerRef {
        match self {
            Self::Pattern { handler, .. } | Self::Discovery { handler, .. } => handler,
        }
    }
}

/// A handler invocation that did not complete.
///
/// Carries the failure's message and a short classification (the error's
/// type name, `panic`, or `UnknownHandler`), which is what the controller
/// error page shows.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub message: String,
    pub kind: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into() }
    }

    /// Classifies an error by the unqualified name of its type.
    ///
    /// A boxed `dyn Error` has no static name; it is classified by the
    /// leading identifier of its `Debug` output instead, or `Error` when
    /// there is none.
    pub fn from_error<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let static_kind = short_type_name::<E>();
        let err = err.into();
        let kind = if static_kind == "Box" {
            debug_kind(err.as_ref())
        } else {
            static_kind.to_owned()
        };
        Self::new(kind, err.to_string())
    }

    /// Converts a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Self::new("panic", panic_message(payload, "handler panicked"))
    }

    pub(crate) fn unknown_handler(handler: &HandlerRef) -> Self {
        Self::new("UnknownHandler", format!("no handler instance for {handler}"))
    }
}

/// A handler result that could not be turned into a response.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RenderError {
    #[error("view `{0}` could not be resolved")]
    UnknownView(String),

    #[error("model for view `{view}` could not be serialized: {reason}")]
    Model { view: String, reason: String },

    #[error("view `{view}` panicked: {message}")]
    Panicked { view: String, message: String },
}

impl RenderError {
    pub(crate) fn from_panic(view: &str, payload: Box<dyn Any + Send>) -> Self {
        Self::Panicked {
            view: view.to_owned(),
            message: panic_message(payload, "view resolver panicked"),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>, fallback: &str) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        fallback.to_owned()
    }
}

/// `ParseIntError { kind: InvalidDigit }` → `ParseIntError`.
fn debug_kind(err: &(dyn StdError + Send + Sync)) -> String {
    let debug = format!("{err:?}");
    let ident: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() { "Error".to_owned() } else { ident }
}

/// `my_crate::module::ParseError<T>` → `ParseError`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct OutOfStock;

    impl fmt::Display for OutOfStock {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("nothing left")
        }
    }

    impl std::error::Error for OutOfStock {}

    #[test]
    fn failure_is_classified_by_type_name() {
        let failure = Failure::from_error(OutOfStock);
        assert_eq!(failure.kind, "OutOfStock");
        assert_eq!(failure.message, "nothing left");
    }

    #[test]
    fn boxed_errors_are_classified_by_their_own_type() {
        let parse = "x".parse::<u32>().unwrap_err();
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(parse.clone());
        let failure = Failure::from_error(boxed);
        assert_eq!(failure.kind, "ParseIntError");
        assert_eq!(failure.message, parse.to_string());

        let failure = Failure::from_error("out of paper");
        assert_eq!(failure.message, "out of paper");
    }

    #[test]
    fn boxed_string_errors_fall_back_to_a_generic_kind() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = "out of paper".into();
        assert_eq!(Failure::from_error(boxed), Failure::new("Error", "out of paper"));
    }

    #[test]
    fn view_panics_keep_their_message() {
        let err = RenderError::from_panic("cart", Box::new("template exploded"));
        assert_eq!(
            err,
            RenderError::Panicked { view: "cart".into(), message: "template exploded".into() }
        );
    }

    #[test]
    fn panic_payloads_keep_their_message() {
        let failure = Failure::from_panic(Box::new("boom"));
        assert_eq!(failure, Failure::new("panic", "boom"));

        let failure = Failure::from_panic(Box::new(String::from("bang")));
        assert_eq!(failure.message, "bang");

        let failure = Failure::from_panic(Box::new(42_u8));
        assert_eq!(failure.message, "handler panicked");
    }

    #[test]
    fn registration_error_names_the_handler() {
        let handler = HandlerRef::new("Shop", "list");
        let err = RegistrationError::Discovery {
            handler: handler.clone(),
            reason: "unknown verb `FETCH`".into(),
        };
        assert_eq!(err.handler(), &handler);
        assert_eq!(err.to_string(), "discovery failed for Shop.list: unknown verb `FETCH`");
    }
}
