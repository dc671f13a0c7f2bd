//! JSON-RPC over HTTP.
//!
//! Calls are `POST`ed as JSON-RPC bodies. Requests are filtered by the
//! `Host` header against a whitelist, and cross-origin browsers are served
//! according to a CORS origin list.

use crate::{RpcModule, RpcResult, RpcServer};
use hyper::body::HttpBody;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE, HOST, ORIGIN, VARY,
};
use hyper::server::conn::Http;
use hyper::service::service_fn;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Maximum accepted request body, in bytes.
pub const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

const WILDCARD: &str = "*";

/// HTTP front end for an [`RpcServer`] registry.
pub struct HttpServer {
    rpc: RpcServer,
    white_hosts: Vec<String>,
    cors: Vec<String>,
}

impl HttpServer {
    pub fn new(white_hosts: Vec<String>, cors: Vec<String>) -> Self {
        Self {
            rpc: RpcServer::new(),
            white_hosts: white_hosts
                .into_iter()
                .map(|host| host.trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
            cors: cors
                .into_iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        }
    }

    pub fn register_name(&mut self, namespace: &str, module: Arc<dyn RpcModule>) -> RpcResult<()> {
        self.rpc.register_name(namespace, module)
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.rpc.namespaces()
    }

    /// Serves HTTP on `listener` until `cancel` fires.
    ///
    /// Cancellation closes the listener and drops every open connection,
    /// including requests still being received or dispatched.
    pub async fn serve(self, listener: TcpListener, cancel: CancellationToken) {
        let shared = Arc::new(self);

        loop {
            let (stream, addr) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!(target: "seele::rpc", error = %err, "http rpc accept failed");
                        continue;
                    }
                },
                _ = cancel.cancelled() => break,
            };

            let shared = shared.clone();
            let conn_cancel = cancel.child_token();
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let shared = shared.clone();
                    async move { Ok::<_, Infallible>(shared.handle_request(req).await) }
                });
                let conn = Http::new().serve_connection(stream, service);
                tokio::select! {
                    result = conn => {
                        if let Err(err) = result {
                            debug!(target: "seele::rpc", addr = %addr, error = %err, "http rpc connection failed");
                        }
                    }
                    _ = conn_cancel.cancelled() => {
                        debug!(target: "seele::rpc", addr = %addr, "http rpc connection dropped on shutdown");
                    }
                }
            });
        }
        debug!(target: "seele::rpc", "http rpc listener closed");
    }

    async fn handle_request(&self, req: Request<Body>) -> Response<Body> {
        let host = req.headers().get(HOST).and_then(|value| value.to_str().ok());
        if !self.host_allowed(host) {
            warn!(target: "seele::rpc", host = ?host, "rejecting http rpc request from unlisted host");
            return text_response(StatusCode::FORBIDDEN, "invalid host specified");
        }

        let cors_origin = self.allowed_origin(req.headers().get(ORIGIN));

        if req.method() == Method::OPTIONS {
            let mut resp = Response::new(Body::empty());
            *resp.status_mut() = StatusCode::NO_CONTENT;
            return with_cors(resp, cors_origin);
        }

        if req.method() != Method::POST {
            return with_cors(
                text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
                cors_origin,
            );
        }

        let declared_len = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok());
        if declared_len.map_or(false, |len| len > MAX_BODY_SIZE) {
            return with_cors(
                text_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large"),
                cors_origin,
            );
        }

        let body = match read_limited(req.into_body(), MAX_BODY_SIZE).await {
            Ok(body) => body,
            Err(BodyError::TooLarge) => {
                return with_cors(
                    text_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large"),
                    cors_origin,
                );
            }
            Err(BodyError::Read(err)) => {
                debug!(target: "seele::rpc", error = %err, "failed to read http rpc body");
                return with_cors(
                    text_response(StatusCode::BAD_REQUEST, "unreadable request body"),
                    cors_origin,
                );
            }
        };

        let resp = match self.rpc.handle_bytes(&body) {
            Some(reply) => {
                let mut resp = Response::new(Body::from(reply));
                resp.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                resp
            }
            None => {
                let mut resp = Response::new(Body::empty());
                *resp.status_mut() = StatusCode::NO_CONTENT;
                resp
            }
        };
        with_cors(resp, cors_origin)
    }

    fn host_allowed(&self, host: Option<&str>) -> bool {
        let Some(host) = host else {
            return true;
        };
        let name = strip_port(host.trim());
        if name.parse::<IpAddr>().is_ok() {
            return true;
        }
        let name = name.to_ascii_lowercase();
        self.white_hosts
            .iter()
            .any(|allowed| allowed == WILDCARD || *allowed == name)
    }

    fn allowed_origin(&self, origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        let origin = origin?;
        let text = origin.to_str().ok()?;
        self.cors
            .iter()
            .any(|allowed| allowed == WILDCARD || allowed.eq_ignore_ascii_case(text))
            .then(|| origin.clone())
    }
}

enum BodyError {
    TooLarge,
    Read(hyper::Error),
}

/// Collects `body`, giving up as soon as more than `limit` bytes arrive.
async fn read_limited(mut body: Body, limit: usize) -> Result<Vec<u8>, BodyError> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(BodyError::Read)?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut resp = Response::new(Body::from(body));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    resp
}

fn with_cors(mut resp: Response<Body>, origin: Option<HeaderValue>) -> Response<Body> {
    if let Some(origin) = origin {
        let headers = resp.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MethodSet;
    use hyper::body::Bytes;
    use hyper::Client;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::task::JoinHandle;

    fn http_server(hosts: &[&str], cors: &[&str]) -> HttpServer {
        let mut server = HttpServer::new(
            hosts.iter().map(|h| h.to_string()).collect(),
            cors.iter().map(|c| c.to_string()).collect(),
        );
        server
            .register_name(
                "chain",
                MethodSet::new(())
                    .method("height", |_: &(), _: ()| Ok::<_, String>(12u64))
                    .into_module(),
            )
            .expect("register");
        server
    }

    async fn spawn_server(server: HttpServer) -> (SocketAddr, CancellationToken, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let cancel = CancellationToken::new();
        let task = tokio::spawn(server.serve(listener, cancel.clone()));
        (addr, cancel, task)
    }

    fn post(addr: SocketAddr, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("http://{}/", addr))
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN, "http://wallet.example")
            .body(Body::from(body))
            .expect("request")
    }

    async fn raw_exchange(addr: SocketAddr, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request).await.expect("write");
        let mut buf = vec![0u8; 1024];
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .expect("reply in time")
            .expect("read");
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[test]
    fn strip_port_handles_names_and_addresses() {
        assert_eq!(strip_port("localhost:8080"), "localhost");
        assert_eq!(strip_port("localhost"), "localhost");
        assert_eq!(strip_port("[::1]:8080"), "::1");
        assert_eq!(strip_port("::1"), "::1");
    }

    #[test]
    fn host_whitelist() {
        let server = http_server(&["Localhost"], &[]);
        assert!(server.host_allowed(None));
        assert!(server.host_allowed(Some("localhost:65027")));
        assert!(server.host_allowed(Some("127.0.0.1:65027")));
        assert!(server.host_allowed(Some("[::1]:65027")));
        assert!(!server.host_allowed(Some("evil.example:65027")));

        let open = http_server(&["*"], &[]);
        assert!(open.host_allowed(Some("evil.example")));
    }

    #[test]
    fn cors_origin_matching() {
        let origin = HeaderValue::from_static("http://wallet.example");
        assert!(http_server(&[], &[]).allowed_origin(Some(&origin)).is_none());
        assert_eq!(
            http_server(&[], &["http://wallet.example"]).allowed_origin(Some(&origin)),
            Some(origin.clone())
        );
        assert_eq!(http_server(&[], &["*"]).allowed_origin(Some(&origin)), Some(origin.clone()));
        assert!(http_server(&[], &["http://other"]).allowed_origin(Some(&origin)).is_none());
        assert!(http_server(&[], &["*"]).allowed_origin(None).is_none());
    }

    #[tokio::test]
    async fn serves_posted_calls_until_cancelled() {
        let (addr, cancel, task) = spawn_server(http_server(&["localhost"], &["*"])).await;

        let client = Client::new();
        let resp = client
            .request(post(addr, r#"{"jsonrpc":"2.0","id":1,"method":"chain.height","params":[]}"#))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://wallet.example"))
        );
        let body = hyper::body::to_bytes(resp.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["result"], json!(12));

        let get = Request::builder()
            .method(Method::GET)
            .uri(format!("http://{}/", addr))
            .body(Body::empty())
            .expect("request");
        let resp = client.request(get).await.expect("response");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let forbidden = Request::builder()
            .method(Method::POST)
            .uri(format!("http://{}/", addr))
            .header(HOST, "evil.example")
            .body(Body::from("{}"))
            .expect("request");
        let resp = client.request(forbidden).await.expect("response");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        cancel.cancel();
        task.await.expect("join");
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn preflight_answers_with_cors_headers() {
        let (addr, cancel, task) = spawn_server(http_server(&["localhost"], &["http://wallet.example"])).await;

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri(format!("http://{}/", addr))
            .header(ORIGIN, "http://wallet.example")
            .body(Body::empty())
            .expect("request");
        let resp = Client::new().request(preflight).await.expect("response");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://wallet.example"))
        );
        assert_eq!(
            resp.headers().get(ACCESS_CONTROL_ALLOW_METHODS),
            Some(&HeaderValue::from_static("POST, OPTIONS"))
        );

        cancel.cancel();
        task.await.expect("join");
    }

    #[tokio::test]
    async fn empty_cors_list_sends_no_cors_headers() {
        let (addr, cancel, task) = spawn_server(http_server(&["localhost"], &[])).await;

        let resp = Client::new()
            .request(post(addr, r#"{"id":1,"method":"chain.height"}"#))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .keys()
                .all(|name| !name.as_str().starts_with("access-control-")),
            "unexpected cors headers: {:?}",
            resp.headers()
        );

        cancel.cancel();
        task.await.expect("join");
    }

    #[tokio::test]
    async fn notifications_get_an_empty_response() {
        let (addr, cancel, task) = spawn_server(http_server(&["localhost"], &[])).await;

        let resp = Client::new()
            .request(post(addr, r#"{"jsonrpc":"2.0","method":"chain.height"}"#))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        cancel.cancel();
        task.await.expect("join");
    }

    #[tokio::test]
    async fn declared_oversized_body_is_rejected_before_reading() {
        let (addr, cancel, task) = spawn_server(http_server(&["localhost"], &[])).await;

        let request = format!(
            "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n",
            MAX_BODY_SIZE + 1
        );
        let reply = raw_exchange(addr, request.as_bytes()).await;
        assert!(reply.starts_with("HTTP/1.1 413"), "{reply}");

        cancel.cancel();
        task.await.expect("join");
    }

    #[tokio::test]
    async fn streamed_body_stops_at_the_limit() {
        let (mut sender, body) = Body::channel();
        let feeder = tokio::spawn(async move {
            let mut sent = 0usize;
            for _ in 0..64 {
                if sender.send_data(Bytes::from(vec![b' '; 1024 * 1024])).await.is_err() {
                    break;
                }
                sent += 1;
            }
            sent
        });

        let result = read_limited(body, MAX_BODY_SIZE).await;
        assert!(matches!(result, Err(BodyError::TooLarge)));

        let sent = feeder.await.expect("join");
        assert!(sent < 64, "whole stream was consumed ({sent} chunks)");
    }

    #[tokio::test]
    async fn small_bodies_are_collected_whole() {
        let (mut sender, body) = Body::channel();
        tokio::spawn(async move {
            for part in ["{\"id\":1,", "\"method\":\"chain.height\"}"] {
                let _ = sender.send_data(Bytes::from(part)).await;
            }
        });
        let collected = read_limited(body, MAX_BODY_SIZE).await;
        assert!(matches!(collected, Ok(ref bytes) if bytes.starts_with(b"{\"id\":1,")));
    }

    #[tokio::test]
    async fn cancel_drops_requests_with_a_stalled_body() {
        let (addr, cancel, task) = spawn_server(http_server(&["localhost"], &[])).await;

        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream
            .write_all(b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100\r\n\r\n{")
            .await
            .expect("write");
        tokio::time::sleep(Duration::from_millis(50)).await;

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("server exits while the body is pending")
            .expect("join");

        let mut buf = [0u8; 64];
        let read = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .expect("connection closed");
        assert!(matches!(read, Ok(0) | Err(_)), "{read:?}");
    }
}
