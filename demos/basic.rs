//! Minimal frontal example: one controller, every kind of return value.
//!
//! Run with:
//!   cargo run --example basic
//!   cargo run --example basic -- frontal.toml   # bind / context_path from TOML
//!
//! Try:
//!   curl http://localhost:3000/hello          # text
//!   curl http://localhost:3000/bye            # void handler, debug page
//!   curl http://localhost:3000/str/world      # path parameter
//!   curl http://localhost:3000/welcome/ana    # view forward
//!   curl http://localhost:3000/stock/0        # handler failure, 500 page
//!   curl http://localhost:3000/nowhere        # route listing, 404

use std::path::Path;

use frontal::{App, Config, Controllers, ModelView, Request, Server};

#[derive(Debug)]
struct EmptyShelf(u32);

impl std::fmt::Display for EmptyShelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shelf {} is empty", self.0)
    }
}

impl std::error::Error for EmptyShelf {}

#[tokio::main]
async fn main() -> Result<(), frontal::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let controllers = Controllers::new().controller("Controller", |c| {
        c.get("/hello", "say_hello", say_hello)
            .get("/bye", "say_bye", say_bye)
            .get("/str/{str}", "echo", echo)
            .get("/welcome/{name}", "welcome", welcome)
            .get("/stock/{shelf}", "stock", stock)
    });

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::default(),
    };

    Server::from_config(&config)?
        .serve(App::new(controllers).with_config(config))
        .await
}

fn say_hello(_req: &Request) -> &'static str {
    "Hello world !"
}

fn say_bye(_req: &Request) {
    tracing::info!("Bye world !");
}

fn echo(req: &Request) -> Option<String> {
    req.param("str").map(str::to_owned)
}

fn welcome(req: &Request) -> ModelView {
    ModelView::new("welcome").with("name", req.param("name").unwrap_or("stranger"))
}

fn stock(req: &Request) -> Result<serde_json::Value, EmptyShelf> {
    let shelf: u32 = req.param("shelf").and_then(|s| s.parse().ok()).unwrap_or(0);
    if shelf == 0 {
        return Err(EmptyShelf(shelf));
    }
    Ok(serde_json::json!({ "shelf": shelf, "items": shelf * 3 }))
}
