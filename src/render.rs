//! Result rendering.
//!
//! Two steps, kept apart:
//!
//! 1. [`render`] classifies a handler's [`Reply`] into a [`Rendered`] value.
//!    Pure, never fails.
//! 2. [`Rendered::into_response`] turns that value into a [`Response`] at the
//!    serving boundary. This is where a view forward meets the
//!    [`ViewResolver`], and the only place a [`RenderError`] can occur. It
//!    becomes a generic `500` page, and so does a resolver that panics.
//!
//! The pages produced for the not-found listing, the void-handler debug view
//! and handler failures are development-mode diagnostics meant for a human
//! looking at a browser, not a machine-readable error contract.

use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::binding::HandlerRef;
use crate::error::{Failure, RenderError};
use crate::handler::{Model, Reply};
use crate::response::Response;
use crate::status::Status;

/// Body used when a handler returns an absent string.
pub const EMPTY_TEXT: &str = "(no content)";

/// What a request produced, before it becomes bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    /// Text returned by the handler, verbatim.
    TextBody(String),
    /// A named view with its model, for the [`ViewResolver`].
    ViewForward { view: String, model: Model },
    /// Any other value, through its `Display` impl.
    GenericBody(String),
    /// The handler returned nothing.
    NoContentDebug { path: String, handler: HandlerRef },
    /// No route matched; lists every registered template.
    NotFoundPage { path: String, templates: Vec<String> },
    /// The handler failed.
    InvocationError { path: String, failure: Failure },
}

/// Classifies a handler's return value.
///
/// `None` is a handler that returned nothing; `path` and `handler` are kept
/// for its debug page.
pub fn render(reply: Option<Reply>, path: &str, handler: &HandlerRef) -> Rendered {
    match reply {
        Some(Reply::Text(Some(text))) => Rendered::TextBody(text),
        Some(Reply::Text(None)) => Rendered::TextBody(EMPTY_TEXT.to_owned()),
        Some(Reply::View(mv)) => {
            let (view, model) = mv.into_parts();
            Rendered::ViewForward { view, model }
        }
        Some(Reply::Object(obj)) => Rendered::GenericBody(obj.to_string()),
        None => Rendered::NoContentDebug { path: path.to_owned(), handler: handler.clone() },
    }
}

impl Rendered {
    /// The status this outcome is served with.
    pub fn status(&self) -> Status {
        match self {
            Self::NotFoundPage { .. } => Status::NotFound,
            Self::InvocationError { .. } => Status::InternalServerError,
            _ => Status::Ok,
        }
    }

    pub fn into_response(self, views: &dyn ViewResolver) -> Response {
        let status = self.status();
        let body = match self {
            Self::TextBody(text) | Self::GenericBody(text) => text,
            Self::ViewForward { view, model } => {
                let resolved = panic::catch_unwind(AssertUnwindSafe(|| views.render(&view, &model)))
                    .unwrap_or_else(|payload| Err(RenderError::from_panic(&view, payload)));
                match resolved {
                    Ok(html) => html,
                    Err(err) => {
                        error!(view = %view, error = %err, "view forward failed");
                        return render_failure_page(&err);
                    }
                }
            }
            Self::NoContentDebug { path, handler } => debug_page(&path, &handler),
            Self::NotFoundPage { path, templates } => not_found_page(&path, &templates),
            Self::InvocationError { failure, .. } => controller_error_page(&failure),
        };
        Response::builder().status(status).html(body)
    }
}

// ── Views ────────────────────────────────────────────────────────────────────

/// Renders a named view with its model.
///
/// Stands in for whatever template engine the application uses.
pub trait ViewResolver: Send + Sync {
    fn render(&self, view: &str, model: &Model) -> Result<String, RenderError>;
}

/// Default resolver: shows the view name and the model as pretty JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugViews;

impl ViewResolver for DebugViews {
    fn render(&self, view: &str, model: &Model) -> Result<String, RenderError> {
        let json = serde_json::to_string_pretty(model).map_err(|e| RenderError::Model {
            view: view.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(page(
            "View",
            &format!(
                "<h1>View <code>{}</code></h1>\n<pre>{}</pre>",
                escape_html(view),
                escape_html(&json),
            ),
        ))
    }
}

// ── Pages ────────────────────────────────────────────────────────────────────

fn not_found_page(path: &str, templates: &[String]) -> String {
    let mut body = format!(
        "<h1>Route not found</h1>\n<p>No route matches <code>{}</code>.</p>\n",
        escape_html(path),
    );
    if !templates.is_empty() {
        body.push_str("<h3>Registered routes</h3>\n<ul>\n");
        for template in templates {
            let _ = writeln!(body, "<li><code>{}</code></li>", escape_html(template));
        }
        body.push_str("</ul>\n");
    }
    page("Route not found", &body)
}

fn debug_page(path: &str, handler: &HandlerRef) -> String {
    page(
        "Route matched",
        &format!(
            "<h1>Route matched</h1>\n\
             <p><b>Route:</b> <code>{}</code></p>\n\
             <p><b>Entry point:</b> <code>{}()</code></p>\n\
             <p><b>Owner:</b> <code>{}</code></p>\n\
             <p><i>The handler ran and returned nothing.</i></p>",
            escape_html(path),
            escape_html(handler.entry_point()),
            escape_html(handler.owner()),
        ),
    )
}

fn controller_error_page(failure: &Failure) -> String {
    page(
        "Handler error",
        &format!(
            "<h1>Handler error</h1>\n\
             <p><b>Message:</b> {}</p>\n\
             <p><b>Kind:</b> {}</p>",
            escape_html(&failure.message),
            escape_html(&failure.kind),
        ),
    )
}

fn render_failure_page(err: &RenderError) -> Response {
    Response::builder().status(Status::InternalServerError).html(page(
        "Render error",
        &format!(
            "<h1>Render error</h1>\n<p>The result could not be rendered: {}</p>",
            escape_html(&err.to_string()),
        ),
    ))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
