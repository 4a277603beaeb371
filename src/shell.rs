//! Client Shell Server
//!
//! Serves the built single-page client. Every request goes through one
//! decision:
//!
//! 1. A path under a proxy prefix is forwarded to the backend, unless the
//!    request is a browser navigation to a known page (`/upload-items`
//!    and `/items/:id` are both pages and API prefixes).
//! 2. A known page gets `index.html` and the client router takes over.
//! 3. Anything else is looked up as a static asset in the client build.
//! 4. Unmatched navigations get `index.html` with status 404 so the client
//!    renders its not-found page; other requests get a JSON 404.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use tower::util::ServiceExt;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::api::{shutdown_signal, ApiError, ApiResult};
use crate::config::{Config, ShellConfig};
use crate::proxy::{ProxyError, ProxyForwarder, ProxyMap};
use crate::routing::RouteTable;

/// The single application handle: route table, proxy map and client build
pub struct Shell {
    routes: RouteTable,
    proxy: ProxyMap,
    forwarder: ProxyForwarder,
    client_dir: PathBuf,
}

impl Shell {
    pub fn new(
        routes: RouteTable,
        proxy: ProxyMap,
        forwarder: ProxyForwarder,
        client_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            routes,
            proxy,
            forwarder,
            client_dir: client_dir.into(),
        }
    }

    /// Development shell: standard routes plus the configured proxy map
    pub fn development(config: &Config) -> Result<Self, ProxyError> {
        let proxy = config.proxy.to_map()?;
        let forwarder = ProxyForwarder::new(
            config.proxy.upstream_timeout_secs.map(Duration::from_secs),
            config.api.max_upload_bytes,
        )?;

        Ok(Self::new(
            RouteTable::standard(),
            proxy,
            forwarder,
            &config.shell.client_dir,
        ))
    }

    /// Production shell: the backend serves the client itself, no proxy
    pub fn production(client_dir: impl Into<PathBuf>) -> Result<Self, ProxyError> {
        let forwarder = ProxyForwarder::new(None, 0)?;
        Ok(Self::new(
            RouteTable::standard(),
            ProxyMap::disabled(),
            forwarder,
            client_dir,
        ))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn proxy(&self) -> &ProxyMap {
        &self.proxy
    }

    pub fn client_dir(&self) -> &Path {
        &self.client_dir
    }

    /// `index.html` with the given status
    async fn index(&self, status: StatusCode) -> ApiResult<Response> {
        let path = self.client_dir.join("index.html");
        let html = tokio::fs::read(&path).await.map_err(|e| {
            ApiError::Internal(format!(
                "Client build not found at {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok((
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response())
    }
}

/// Whether a request is a browser document navigation
pub fn is_navigation<B>(req: &Request<B>) -> bool {
    let method = req.method();
    if method != Method::GET && method != Method::HEAD {
        return false;
    }
    req.headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Router answering every path through the shell decision
pub fn build_router(shell: Arc<Shell>) -> Router {
    Router::new().fallback(handle).with_state(shell)
}

async fn handle(State(shell): State<Arc<Shell>>, req: Request) -> Response {
    match dispatch(&shell, req).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn dispatch(shell: &Shell, req: Request) -> ApiResult<Response> {
    let path = req.uri().path().to_string();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let navigation = is_navigation(&req);
    let route = shell.routes.resolve(&path);

    if let Some(target) = shell.proxy.rewrite(&path_and_query) {
        if !(navigation && route.is_some()) {
            return Ok(shell.forwarder.forward(target, req).await?);
        }
    }

    let readable = req.method() == Method::GET || req.method() == Method::HEAD;

    if let Some(matched) = route.filter(|_| readable) {
        tracing::debug!(path = %path, page = %matched.page, "Serving client shell");
        return shell.index(StatusCode::OK).await;
    }

    if readable {
        let response = match ServeDir::new(&shell.client_dir).oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        if response.status() != StatusCode::NOT_FOUND {
            return Ok(response.map(Body::new));
        }
    }

    if navigation {
        tracing::debug!(path = %path, "No route for navigation");
        return shell.index(StatusCode::NOT_FOUND).await;
    }

    Err(ApiError::NotFound(path))
}

/// Middleware answering page navigations with the client shell before
/// the API routes see them. Used when the backend serves the client.
pub async fn serve_navigations(
    State(shell): State<Arc<Shell>>,
    req: Request,
    next: Next,
) -> Response {
    if is_navigation(&req) && shell.routes.resolve(req.uri().path()).is_some() {
        return match shell.index(StatusCode::OK).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        };
    }
    next.run(req).await
}

/// Run the development shell server
pub async fn serve(shell: Shell, config: &ShellConfig) -> Result<(), ApiError> {
    for entry in shell.proxy.entries() {
        tracing::info!(prefix = %entry.prefix(), origin = %entry.origin_str(), "Proxy route");
    }
    tracing::info!(
        routes = shell.routes.len(),
        client_dir = %shell.client_dir.display(),
        "Client shell ready"
    );

    let router = build_router(Arc::new(shell)).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Assayer shell listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Assayer shell shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyEntry;
    use axum::{body::to_bytes, routing::post, Json};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const INDEX: &str = "<!doctype html><div id=\"app\"></div>";

    fn client_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        dir
    }

    fn shell_with(proxy: ProxyMap, dir: &TempDir) -> Router {
        let forwarder = ProxyForwarder::new(Some(Duration::from_secs(5)), 1024 * 1024).unwrap();
        build_router(Arc::new(Shell::new(
            RouteTable::standard(),
            proxy,
            forwarder,
            dir.path(),
        )))
    }

    fn navigate(uri: &str) -> Request {
        Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Start a stand-in backend that echoes what it received
    async fn spawn_backend() -> String {
        let app = Router::new()
            .route(
                "/edit-csv",
                post(|body: String| async move { Json(json!({ "path": "/edit-csv", "body": body })) }),
            )
            .fallback(|req: Request| async move {
                let pq = req.uri().path_and_query().map(|p| p.to_string()).unwrap_or_default();
                let header_value = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                Json(json!({
                    "path": pq,
                    "method": req.method().as_str(),
                    "content_type": header_value("content-type"),
                    "host": header_value("host"),
                    "connection": header_value("connection"),
                    "operator": header_value("x-operator"),
                }))
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_pages_get_client_shell() {
        let dir = client_dir();
        let app = shell_with(ProxyMap::disabled(), &dir);

        for uri in ["/", "/calculate", "/item-list", "/items/42", "/login", "/csv"] {
            let response = app.clone().oneshot(navigate(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
            assert_eq!(body_string(response).await, INDEX);
        }
    }

    #[tokio::test]
    async fn test_unknown_navigation_is_404_shell() {
        let dir = client_dir();
        let app = shell_with(ProxyMap::disabled(), &dir);

        let response = app.oneshot(navigate("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, INDEX);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let dir = client_dir();
        let app = shell_with(ProxyMap::disabled(), &dir);

        let response = app
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_static_assets_served() {
        let dir = client_dir();
        let app = shell_with(ProxyMap::disabled(), &dir);

        let response = app
            .oneshot(Request::builder().uri("/assets/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_api_requests_are_proxied() {
        let backend = spawn_backend().await;
        let dir = client_dir();
        let app = shell_with(ProxyMap::development(&backend).unwrap(), &dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/items/42?full=1")
                    .header(header::ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["path"], "/items/42?full=1");
        assert_eq!(body["method"], "GET");
    }

    #[tokio::test]
    async fn test_csv_save_reaches_backend_edit_csv() {
        let backend = spawn_backend().await;
        let dir = client_dir();
        let app = shell_with(ProxyMap::development(&backend).unwrap(), &dir);

        // the editor page loads from the shell
        let page = app.clone().oneshot(navigate("/csv")).await.unwrap();
        assert_eq!(page.status(), StatusCode::OK);

        // saving posts to /edit-csv, which the proxy forwards
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/edit-csv")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"columns":["a"],"rows":[["1"]]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["path"], "/edit-csv");
        assert_eq!(body["body"], r#"{"columns":["a"],"rows":[["1"]]}"#);
    }

    #[tokio::test]
    async fn test_every_client_call_reaches_backend() {
        let backend = spawn_backend().await;
        let dir = client_dir();
        let app = shell_with(ProxyMap::development(&backend).unwrap(), &dir);

        // each request the browser client makes, as fetch sends it
        let calls = [
            ("POST", "/check-weights"),
            ("POST", "/calculate-fixed"),
            ("POST", "/upload-items"),
            ("GET", "/items"),
            ("GET", "/items/3"),
            ("POST", "/edit-csv"),
        ];

        for (method, uri) in calls {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .header(header::ACCEPT, "*/*")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{} {}", method, uri);
            let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
            assert_eq!(body["path"], uri);
        }
    }

    #[tokio::test]
    async fn test_forwarded_headers() {
        let backend = spawn_backend().await;
        let dir = client_dir();
        let app = shell_with(ProxyMap::development(&backend).unwrap(), &dir);

        let content_type = "multipart/form-data; boundary=----assayer7MA4YWxk";
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload-items")
                    .header(header::HOST, "localhost:5173")
                    .header(header::CONNECTION, "keep-alive")
                    .header(header::CONTENT_TYPE, content_type)
                    .header("x-operator", "hana")
                    .body(Body::from("------assayer7MA4YWxk--\r\n"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["method"], "POST");
        assert_eq!(body["content_type"], content_type);
        assert_eq!(body["operator"], "hana");
        assert!(body["connection"].is_null());
        // the backend sees its own authority, not the shell's
        assert_eq!(body["host"], backend.trim_start_matches("http://"));
    }

    #[tokio::test]
    async fn test_oversized_proxied_body_is_413() {
        let dir = client_dir();
        let map = ProxyMap::development("http://127.0.0.1:9").unwrap();
        let forwarder = ProxyForwarder::new(None, 16).unwrap();
        let app = build_router(Arc::new(Shell::new(
            RouteTable::standard(),
            map,
            forwarder,
            dir.path(),
        )));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/edit-csv")
                    .body(Body::from(vec![b'x'; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_navigation_to_overlapping_page_not_proxied() {
        let backend = spawn_backend().await;
        let dir = client_dir();
        let app = shell_with(ProxyMap::development(&backend).unwrap(), &dir);

        for uri in ["/upload-items", "/items/7"] {
            let response = app.clone().oneshot(navigate(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, INDEX, "uri {}", uri);
        }
    }

    #[tokio::test]
    async fn test_navigation_under_prefix_without_page_is_proxied() {
        let backend = spawn_backend().await;
        let dir = client_dir();
        let app = shell_with(ProxyMap::development(&backend).unwrap(), &dir);

        let response = app.oneshot(navigate("/items")).await.unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["path"], "/items");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_bad_gateway() {
        let dir = client_dir();
        let map = ProxyMap::new(vec![ProxyEntry::new("/items", "http://127.0.0.1:9").unwrap()]).unwrap();
        let app = shell_with(map, &dir);

        let response = app
            .oneshot(Request::builder().uri("/items").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_is_navigation() {
        assert!(is_navigation(&navigate("/csv")));
        let post = Request::builder()
            .method("POST")
            .uri("/csv")
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();
        assert!(!is_navigation(&post));
        let fetch = Request::builder().uri("/csv").body(Body::empty()).unwrap();
        assert!(!is_navigation(&fetch));
    }
}
