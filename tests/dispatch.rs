//! End-to-end dispatch through the public API.

use std::fmt;
use std::sync::Arc;

use frontal::{
    App, Controllers, DispatchOutcome, Dispatcher, HandlerBinding, HandlerCatalog, HandlerInvoker,
    HandlerRef, Method, Model, ModelView, Reply, Rendered, RenderError, Request, RouteTable,
    ViewResolver,
};

#[derive(Debug)]
struct NotInStock;

impl fmt::Display for NotInStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("item 7 is not in stock")
    }
}

impl std::error::Error for NotInStock {}

fn shop() -> Controllers {
    Controllers::new()
        .controller("Greeter", |c| {
            c.get("/hello", "say_hello", |_: &Request| "Hello world !")
                .get("/bye", "say_bye", |_: &Request| ())
        })
        .controller("Shop", |c| {
            c.get("/items/{id}", "item", |req: &Request| {
                format!("item {}", req.param("id").unwrap_or("?"))
            })
            .get("/items/featured", "featured", |_: &Request| "featured")
            .get("/items/{id}/buy", "buy", |_: &Request| -> Result<String, NotInStock> {
                Err(NotInStock)
            })
            .get("/cart", "cart", |_: &Request| ModelView::new("cart").with("lines", 2))
        })
}

fn text(res: &frontal::Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

#[test]
fn table_built_from_catalog_resolves_both_tiers() {
    let table = RouteTable::from_catalog(&shop());

    match table.resolve("/items/featured") {
        DispatchOutcome::Matched { route, params } => {
            assert_eq!(route.binding().handler(), &HandlerRef::new("Shop", "featured"));
            assert!(params.is_empty());
        }
        DispatchOutcome::NotFound => panic!("literal route should win"),
    }

    match table.resolve("/items/9") {
        DispatchOutcome::Matched { route, params } => {
            assert_eq!(route.template(), "/items/{id}");
            assert_eq!(params.get("id"), Some("9"));
        }
        DispatchOutcome::NotFound => panic!("dynamic route should match"),
    }
}

#[test]
fn app_serves_every_outcome() {
    let app = App::new(shop());

    let res = app.handle("GET", "/hello");
    assert_eq!(res.status(), 200);
    assert_eq!(text(&res), "Hello world !");
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));

    assert_eq!(text(&app.handle("GET", "/items/3")), "item 3");

    let res = app.handle("GET", "/bye");
    assert_eq!(res.status(), 200);
    assert!(text(&res).contains("say_bye()"));

    let res = app.handle("GET", "/items/7/buy");
    assert_eq!(res.status(), 500);
    assert!(text(&res).contains("item 7 is not in stock"));
    assert!(text(&res).contains("NotInStock"));

    let res = app.handle("GET", "/cart");
    assert_eq!(res.status(), 200);
    assert!(text(&res).contains("cart"));

    let res = app.handle("GET", "/nowhere");
    assert_eq!(res.status(), 404);
    for template in ["/hello", "/bye", "/items/{id}", "/items/featured", "/items/{id}/buy", "/cart"] {
        assert!(text(&res).contains(template), "listing misses {template}");
    }
}

struct Templates;

impl ViewResolver for Templates {
    fn render(&self, view: &str, model: &Model) -> Result<String, RenderError> {
        match view {
            "cart" => Ok(format!("<p>{} lines</p>", model["lines"])),
            other => Err(RenderError::UnknownView(other.to_owned())),
        }
    }
}

#[test]
fn custom_views_receive_the_model() {
    let app = App::new(shop()).with_views(Templates);
    assert_eq!(text(&app.handle("GET", "/cart")), "<p>2 lines</p>");
}

struct BrokenTemplates;

impl ViewResolver for BrokenTemplates {
    fn render(&self, _view: &str, _model: &Model) -> Result<String, RenderError> {
        panic!("template engine crashed")
    }
}

#[test]
fn panicking_views_are_answered_with_500() {
    let app = App::new(shop()).with_views(BrokenTemplates);
    let res = app.handle("GET", "/cart");
    assert_eq!(res.status(), 500);
    assert!(text(&res).contains("Render error"));

    // The app keeps serving afterwards.
    assert_eq!(app.handle("GET", "/hello").status(), 200);
}

fn restock(req: &Request) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let count: u32 = req.param("count").unwrap_or_default().parse()?;
    if count > 100 {
        return Err(NotInStock.into());
    }
    Ok(format!("restocked {count}"))
}

#[test]
fn handlers_returning_boxed_errors_are_classified() {
    let app = App::new(Controllers::new().controller("Shop", |c| c.get("/restock/{count}", "restock", restock)));

    assert_eq!(text(&app.handle("GET", "/restock/5")), "restocked 5");

    let res = app.handle("GET", "/restock/many");
    assert_eq!(res.status(), 500);
    assert!(text(&res).contains("ParseIntError"));

    let res = app.handle("GET", "/restock/500");
    assert_eq!(res.status(), 500);
    assert!(text(&res).contains("NotInStock"));
    assert!(text(&res).contains("item 7 is not in stock"));
}

// A catalog and an invoker that are separate values, as produced by code
// generation rather than by `Controllers`.
struct Generated;

impl HandlerCatalog for Generated {
    fn bindings(&self) -> Vec<frontal::Discovered> {
        vec![
            Ok(HandlerBinding::get("/ping", HandlerRef::new("Health", "ping"))),
            Ok(HandlerBinding::new("/echo/{word}", Method::Post, HandlerRef::new("Echo", "echo"))),
            Ok(HandlerBinding::get("/ghost", HandlerRef::new("Ghost", "boo"))),
        ]
    }
}

impl HandlerInvoker for Generated {
    fn invoke(&self, handler: &HandlerRef, req: &Request) -> Result<Option<Reply>, frontal::Failure> {
        match (handler.owner(), handler.entry_point()) {
            ("Health", "ping") => Ok(Some(Reply::text("pong"))),
            ("Echo", "echo") => Ok(Some(Reply::object(format!(
                "{} {}",
                req.verb(),
                req.param("word").unwrap_or_default()
            )))),
            _ => Err(frontal::Failure::new("UnknownHandler", handler.to_string())),
        }
    }
}

#[test]
fn dispatcher_works_with_any_catalog_and_invoker() {
    let dispatcher = Dispatcher::new(RouteTable::from_catalog(&Generated));

    assert_eq!(dispatcher.dispatch("/ping", Method::Get, &Generated), Rendered::TextBody("pong".into()));
    assert_eq!(
        dispatcher.dispatch("/echo/hi", Method::Post, &Generated),
        Rendered::GenericBody("POST hi".into())
    );
    assert!(matches!(
        dispatcher.dispatch("/ghost", Method::Get, &Generated),
        Rendered::InvocationError { failure, .. } if failure.kind == "UnknownHandler"
    ));
}

#[test]
fn app_can_be_assembled_from_parts() {
    let app = App::from_parts(Dispatcher::new(RouteTable::from_catalog(&Generated)), Arc::new(Generated));
    assert_eq!(text(&app.handle("GET", "/ping")), "pong");
}

#[test]
fn shared_table_is_readable_from_many_threads() {
    let app = Arc::new(App::new(shop()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let app = Arc::clone(&app);
            std::thread::spawn(move || {
                let res = app.handle("GET", &format!("/items/{i}"));
                (res.status(), text(&res).to_owned())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), (200, format!("item {i}")));
    }
}
