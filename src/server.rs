//! Serving boundary and graceful shutdown.
//!
//! [`App`] is everything a request needs: the dispatcher (and its route
//! table), the handler invoker and the view resolver. All of it is immutable
//! once built, so it sits behind one `Arc` shared by every connection task.
//!
//! [`Server`] owns the socket. On **SIGTERM** or Ctrl-C it stops accepting,
//! lets every in-flight connection finish, then returns.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::catalog::{HandlerCatalog, HandlerInvoker};
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::method::Method;
use crate::render::{DebugViews, ViewResolver};
use crate::response::Response;
use crate::route_table::RouteTable;
use crate::status::Status;

/// A built application.
pub struct App {
    dispatcher: Dispatcher,
    invoker: Arc<dyn HandlerInvoker>,
    views: Arc<dyn ViewResolver>,
    config: Config,
}

impl App {
    /// Builds the route table from `catalog` and keeps it as the invoker.
    pub fn new<C>(catalog: C) -> Self
    where
        C: HandlerCatalog + HandlerInvoker + 'static,
    {
        let table = RouteTable::from_catalog(&catalog);
        Self::from_parts(Dispatcher::new(table), Arc::new(catalog))
    }

    /// Assembles an app whose catalog and invoker are separate.
    pub fn from_parts(dispatcher: Dispatcher, invoker: Arc<dyn HandlerInvoker>) -> Self {
        Self {
            dispatcher,
            invoker,
            views: Arc::new(DebugViews),
            config: Config::default(),
        }
    }

    /// Replaces the default [`DebugViews`] resolver.
    pub fn with_views(mut self, views: impl ViewResolver + 'static) -> Self {
        self.views = Arc::new(views);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher { &self.dispatcher }
    pub fn config(&self) -> &Config { &self.config }

    /// Handles one request end to end. Never fails.
    ///
    /// A method outside the known verbs is answered with `405` before
    /// routing.
    pub fn handle(&self, method: &str, uri_path: &str) -> Response {
        let verb: Method = match method.parse() {
            Ok(verb) => verb,
            Err(err) => {
                debug!(method, path = uri_path, "rejecting request: {err}");
                return Response::builder()
                    .status(Status::MethodNotAllowed)
                    .text(err.to_string());
            }
        };
        let path = self.config.route_path(uri_path);
        self.dispatcher
            .dispatch(path, verb, self.invoker.as_ref())
            .into_response(self.views.as_ref())
    }
}

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr: SocketAddr = addr.parse().map_err(|_| Error::InvalidAddress(addr.to_owned()))?;
        Ok(Self { addr })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self { addr: config.bind_addr()? })
    }

    /// Accepts connections and dispatches them through `app` until a
    /// shutdown signal arrives and in-flight requests have drained.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let app = Arc::new(app);

        info!(
            addr = %self.addr,
            routes = app.dispatcher.table().len(),
            context_path = %app.config.context_path,
            "frontal listening",
        );

        let mut tasks = tokio::task::JoinSet::new();
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a SIGTERM stops accepting at once.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { serve_request(&app, req) }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set does not grow on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("frontal stopped");
        Ok(())
    }
}

/// The body is never read.
fn serve_request(
    app: &App,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let response = app.handle(req.method().as_str(), req.uri().path());
    Ok(response.into_http())
}

/// Resolves on the first SIGTERM or Ctrl-C (Ctrl-C only off Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Controllers;
    use crate::request::Request;

    fn app() -> App {
        App::new(Controllers::new().controller("Greeter", |c| {
            c.get("/hello", "say_hello", |_: &Request| "Hello world !")
        }))
    }

    #[test]
    fn handles_known_routes() {
        let res = app().handle("GET", "/hello");
        assert_eq!(res.status(), 200);
        assert_eq!(res.body(), b"Hello world !");
    }

    #[test]
    fn unknown_method_is_405() {
        let res = app().handle("BREW", "/hello");
        assert_eq!(res.status(), 405);
    }

    #[test]
    fn context_path_is_stripped_before_routing() {
        let app = app().with_config(Config { context_path: "/app".into(), ..Config::default() });
        assert_eq!(app.handle("GET", "/app/hello").status(), 200);
        assert_eq!(app.handle("GET", "/app/missing").status(), 404);
    }

    #[test]
    fn invalid_bind_address_is_an_error() {
        assert!(matches!(Server::bind("not an address"), Err(Error::InvalidAddress(_))));
        assert!(Server::bind("127.0.0.1:0").is_ok());
    }
}
