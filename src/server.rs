//! HTTP listener and dispatch.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{Error, Req, Res, Result};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type BoxedHandler<S> = Arc<dyn Fn(Req, Arc<S>) -> BoxFuture<Result<Res>> + Send + Sync>;

/// GET-routed HTTP application over shared state `S`.
pub struct App<S> {
    routes: Vec<(String, BoxedHandler<S>)>,
    state: Arc<S>,
    router: Option<matchit::Router<BoxedHandler<S>>>,
}

impl<S: Send + Sync + 'static> App<S> {
    /// Create an application around shared state.
    ///
    /// State is shared across handlers via `Arc<S>`.
    pub fn new(state: S) -> Self {
        Self {
            routes: Vec::new(),
            state: Arc::new(state),
            router: None,
        }
    }

    /// Register a GET route.
    pub fn get<H, Fut>(&mut self, path: &str, handler: H)
    where
        H: Fn(Req, Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res>> + Send + 'static,
    {
        let handler: BoxedHandler<S> = Arc::new(move |req, state| Box::pin(handler(req, state)));
        self.routes.push((path.to_string(), handler));
    }

    /// Get the number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Check if a route exists at the given path.
    pub fn has_route(&self, path: &str) -> bool {
        self.routes.iter().any(|(p, _)| p == path)
    }

    fn build_router(&mut self) {
        let mut router = matchit::Router::new();
        for (path, handler) in self.routes.drain(..) {
            router.insert(path, handler).ok();
        }
        self.router = Some(router);
    }

    /// Start the HTTP server.
    ///
    /// Implements graceful shutdown on SIGTERM/SIGINT signals.
    /// In-flight requests complete before the server terminates.
    pub async fn listen(mut self, addr: SocketAddr) -> Result<()> {
        self.build_router();
        let app = Arc::new(self);
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "listening");

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            let _ = shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        });

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let io = TokioIo::new(stream);
                            let app = Arc::clone(&app);
                            let mut shutdown_rx = shutdown_rx.clone();

                            tokio::task::spawn(async move {
                                let conn = http1::Builder::new()
                                    .serve_connection(
                                        io,
                                        service_fn(move |req| {
                                            let app = Arc::clone(&app);
                                            async move { app.handle_request(req).await }
                                        }),
                                    );

                                let mut conn = std::pin::pin!(conn);

                                tokio::select! {
                                    result = conn.as_mut() => {
                                        let _ = result;
                                    }
                                    _ = shutdown_rx.changed() => {
                                        conn.as_mut().graceful_shutdown();
                                        let _ = conn.await;
                                    }
                                }
                            });
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }

        tracing::info!("shutting down");
        Ok(())
    }

    async fn handle_request(
        &self,
        req: Request<Incoming>,
    ) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let res = self.dispatch(req, &method, &path).await;

        tracing::info!(
            %request_id,
            %method,
            %path,
            status = res.status_code().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );

        Ok(res.into_hyper())
    }

    async fn dispatch(&self, req: Request<Incoming>, method: &Method, path: &str) -> Res {
        let Some(router) = &self.router else {
            return Error::internal("Router not initialized").into_res();
        };

        match router.at(path) {
            Ok(matched) => {
                if *method != Method::GET {
                    return Error::method_not_allowed(format!(
                        "Method {} not allowed. Allowed methods: GET",
                        method
                    ))
                    .into_res()
                    .header("Allow", "GET");
                }

                let handler = matched.value;
                match handler(Req::from_hyper(req), Arc::clone(&self.state)).await {
                    Ok(res) => res,
                    Err(err) => err.into_res(),
                }
            }
            Err(_) => Error::not_found("Route not found").into_res(),
        }
    }
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok_handler(_req: Req, _state: Arc<()>) -> Result<Res> {
        Ok(Res::text("ok"))
    }

    #[test]
    fn registers_routes() {
        let mut app = App::new(());
        app.get("/", ok_handler);
        app.get("/api/search", ok_handler);
        assert_eq!(app.route_count(), 2);
        assert!(app.has_route("/api/search"));
        assert!(!app.has_route("/api/missing"));
    }
}
