//! The router served on a real TCP listener.

use crate::common::{TestData, init_logging};
use lazy_rest::store::InMemoryStore;
use lazy_rest::{Envelope, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// Send one HTTP/1.1 request and return the status code and body.
async fn request(addr: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.expect("write request");

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.expect("read response");
    let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status line");
    (status, body.to_string())
}

#[tokio::test]
async fn test_serve_round_trip() {
    init_logging();
    let mut router = Router::new();
    router
        .add_service("test", Arc::new(InMemoryStore::<TestData>::new()))
        .expect("store conforms");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(router.serve_with_shutdown(listener, shutdown.clone().cancelled_owned()));

    let (status, body) = request(addr, "POST", "/test/new", r#"{"Name":"wire"}"#).await;
    assert_eq!(status, 200);
    let envelope: Envelope<i64> = serde_json::from_str(&body).expect("envelope");
    assert_eq!(envelope.data, Some(1));

    let (status, body) = request(addr, "GET", "/test/get/1", "").await;
    assert_eq!(status, 200);
    let envelope: Envelope<TestData> = serde_json::from_str(&body).expect("envelope");
    assert_eq!(envelope.data, Some(TestData { id: 1, name: "wire".to_string() }));

    let (status, body) = request(addr, "GET", "/test/get/x1", "").await;
    assert_eq!(status, 400);
    assert_eq!(body, "Invalid ID\n");

    shutdown.cancel();
    server
        .await
        .expect("server task")
        .expect("server shut down cleanly");
}
