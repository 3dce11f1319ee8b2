//! The route table.
//!
//! Built once at startup, read-only afterwards. No interior mutability, so a
//! shared `&RouteTable` (or `Arc<RouteTable>`) needs no locking.
//!
//! Resolution is two-tier:
//!
//! 1. **Exact literal.** A template without placeholders is indexed by its
//!    string. A hit returns immediately with no parameters, whatever the
//!    registration order of any dynamic route that would also match.
//! 2. **Dynamic scan.** Otherwise templates with placeholders are tried in
//!    registration order; the first match wins.
//!
//! Two bindings with the same literal template are both kept; the index
//! points at the first one registered and the later one is logged as
//! shadowed. This holds across verbs too: `GET /x` registered before
//! `POST /x` makes the `POST` binding unreachable.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::binding::HandlerBinding;
use crate::catalog::HandlerCatalog;
use crate::error::RegistrationError;
use crate::pattern::{Params, PathPattern};

/// A compiled binding.
#[derive(Clone, Debug)]
pub struct Route {
    binding: HandlerBinding,
    pattern: PathPattern,
}

impl Route {
    pub fn binding(&self) -> &HandlerBinding { &self.binding }
    pub fn pattern(&self) -> &PathPattern { &self.pattern }
    pub fn template(&self) -> &str { self.binding.template() }

    /// Parameter names declared by the template, in order.
    pub fn param_names(&self) -> &[String] { self.pattern.param_names() }
}

/// Result of resolving one path.
#[derive(Debug)]
pub enum DispatchOutcome<'a> {
    Matched { route: &'a Route, params: Params },
    NotFound,
}

/// Every binding that compiled, in registration order.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    literal: HashMap<String, usize>,
    dynamic: Vec<usize>,
    rejected: Vec<RegistrationError>,
}

impl RouteTable {
    /// Compiles `bindings` in order.
    ///
    /// A binding whose template does not compile is left out and kept in
    /// [`rejected`](Self::rejected); the rest of the table is still built.
    pub fn build(bindings: impl IntoIterator<Item = HandlerBinding>) -> Self {
        Self::build_discovered(bindings.into_iter().map(Ok))
    }

    /// Builds from a catalog. Discovery failures land in
    /// [`rejected`](Self::rejected) next to pattern failures.
    pub fn from_catalog(catalog: &dyn HandlerCatalog) -> Self {
        Self::build_discovered(catalog.bindings())
    }

    fn build_discovered(
        discovered: impl IntoIterator<Item = Result<HandlerBinding, RegistrationError>>,
    ) -> Self {
        let mut table = Self::default();
        for entry in discovered {
            match entry.and_then(compile) {
                Ok(route) => table.insert(route),
                Err(err) => {
                    warn!(handler = %err.handler(), error = %err, "route rejected");
                    table.rejected.push(err);
                }
            }
        }
        info!(
            routes = table.routes.len(),
            rejected = table.rejected.len(),
            "route table built",
        );
        table
    }

    fn insert(&mut self, route: Route) {
        let idx = self.routes.len();
        info!(
            template = route.template(),
            verb = %route.binding.verb(),
            handler = %route.binding.handler(),
            "route registered",
        );

        if route.pattern.is_literal() {
            let template = route.template().to_owned();
            match self.literal.get(&template).copied() {
                Some(first) => {
                    let kept = &self.routes[first].binding;
                    warn!(
                        template = %template,
                        kept = %kept.handler(),
                        kept_verb = %kept.verb(),
                        shadowed = %route.binding.handler(),
                        shadowed_verb = %route.binding.verb(),
                        "{}",
                        shadow_reason(kept, &route.binding),
                    );
                }
                None => {
                    self.literal.insert(template, idx);
                }
            }
        } else {
            self.dynamic.push(idx);
        }
        self.routes.push(route);
    }

    pub fn resolve(&self, path: &str) -> DispatchOutcome<'_> {
        if let Some(&idx) = self.literal.get(path) {
            return DispatchOutcome::Matched { route: &self.routes[idx], params: Params::default() };
        }

        self.dynamic
            .iter()
            .map(|&idx| &self.routes[idx])
            .find(|route| route.pattern.matches(path))
            .map_or(DispatchOutcome::NotFound, |route| DispatchOutcome::Matched {
                route,
                params: route.pattern.extract(path),
            })
    }

    /// Every registered route, in registration order, duplicates included.
    pub fn routes(&self) -> &[Route] { &self.routes }

    /// Registered templates, in registration order. The diagnostic listing.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(Route::template)
    }

    /// Bindings excluded while building.
    pub fn rejected(&self) -> &[RegistrationError] { &self.rejected }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}

fn shadow_reason(kept: &HandlerBinding, shadowed: &HandlerBinding) -> &'static str {
    if kept.verb() == shadowed.verb() {
        "duplicate literal route, first registration wins"
    } else {
        "literal route unreachable: path already bound under another verb and resolution ignores the verb"
    }
}

fn compile(binding: HandlerBinding) -> Result<Route, RegistrationError> {
    match PathPattern::compile(binding.template()) {
        Ok(pattern) => Ok(Route { binding, pattern }),
        Err(source) => Err(RegistrationError::Pattern {
            template: binding.template().to_owned(),
            handler: binding.handler().clone(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::HandlerRef;
    use crate::error::MalformedPattern;
    use crate::method::Method;

    fn bind(template: &str, entry: &str) -> HandlerBinding {
        HandlerBinding::get(template, HandlerRef::new("Test", entry))
    }

    fn matched<'a>(table: &'a RouteTable, path: &str) -> (&'a str, Params) {
        match table.resolve(path) {
            DispatchOutcome::Matched { route, params } => {
                (route.binding().handler().entry_point(), params)
            }
            DispatchOutcome::NotFound => panic!("{path} should match"),
        }
    }

    #[test]
    fn hello_bye_registry() {
        let table = RouteTable::build([bind("/hello", "a"), bind("/bye", "b")]);

        let (entry, params) = matched(&table, "/hello");
        assert_eq!(entry, "a");
        assert!(params.is_empty());
        assert_eq!(matched(&table, "/bye").0, "b");
        assert!(matches!(table.resolve("/missing"), DispatchOutcome::NotFound));
    }

    #[test]
    fn empty_table_resolves_nothing() {
        let table = RouteTable::build(Vec::<HandlerBinding>::new());
        assert!(table.is_empty());
        assert!(matches!(table.resolve("/nonexistent"), DispatchOutcome::NotFound));
        assert_eq!(table.templates().count(), 0);
    }

    #[test]
    fn exact_literal_beats_earlier_dynamic_route() {
        let table = RouteTable::build([bind("/users/{id}", "dynamic"), bind("/users/me", "literal")]);

        assert_eq!(matched(&table, "/users/me").0, "literal");
        let (entry, params) = matched(&table, "/users/42");
        assert_eq!(entry, "dynamic");
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn first_registered_dynamic_route_wins() {
        let table = RouteTable::build([
            bind("/files/{name}", "first"),
            bind("/{dir}/{name}", "second"),
        ]);
        assert_eq!(matched(&table, "/files/a.txt").0, "first");
        assert_eq!(matched(&table, "/docs/a.txt").0, "second");

        let reversed = RouteTable::build([
            bind("/{dir}/{name}", "second"),
            bind("/files/{name}", "first"),
        ]);
        assert_eq!(matched(&reversed, "/files/a.txt").0, "second");
    }

    #[test]
    fn duplicate_literal_keeps_both_and_first_resolves() {
        let table = RouteTable::build([bind("/home", "old"), bind("/home", "new")]);

        assert_eq!(table.len(), 2);
        let entries: Vec<_> =
            table.routes().iter().map(|r| r.binding().handler().entry_point()).collect();
        assert_eq!(entries, ["old", "new"]);
        assert_eq!(matched(&table, "/home").0, "old");
        assert_eq!(table.templates().collect::<Vec<_>>(), ["/home", "/home"]);
    }

    #[test]
    fn same_path_under_another_verb_is_shadowed() {
        let get = bind("/x", "read");
        let post = HandlerBinding::new("/x", Method::Post, HandlerRef::new("Test", "write"));
        let table = RouteTable::build([get.clone(), post.clone()]);

        assert_eq!(matched(&table, "/x").0, "read");
        assert!(shadow_reason(&get, &post).contains("another verb"));
        assert!(shadow_reason(&get, &get).starts_with("duplicate literal route"));
    }

    #[test]
    fn malformed_bindings_are_excluded_not_fatal() {
        let table = RouteTable::build([
            bind("/ok", "ok"),
            bind("/bad/{", "bad"),
            bind("/str/{str}", "str"),
        ]);

        assert_eq!(table.templates().collect::<Vec<_>>(), ["/ok", "/str/{str}"]);
        assert_eq!(table.rejected().len(), 1);
        match &table.rejected()[0] {
            RegistrationError::Pattern { template, handler, source } => {
                assert_eq!(template, "/bad/{");
                assert_eq!(handler.entry_point(), "bad");
                assert!(matches!(source, MalformedPattern::UnmatchedBrace { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(matched(&table, "/str/hello").1.get("str"), Some("hello"));
        assert!(matches!(table.resolve("/str/hello/world"), DispatchOutcome::NotFound));
    }

    #[test]
    fn route_exposes_declared_params() {
        let table = RouteTable::build([bind("/shop/{shop}/item/{item}", "item")]);
        assert_eq!(table.routes()[0].param_names(), ["shop", "item"]);
    }
}
