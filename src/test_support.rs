// src/test_support.rs
// =============================================================================
// Tiny HTTP/1.1 album site for tests.
//
// /albums/<id> serves a page linking two images, /img/<name> serves the
// image bytes. Every response is delayed and sent with `Connection: close`,
// and the server tracks how many connections were open at the same time.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct TestServer {
    /// e.g. "http://127.0.0.1:12345" (no trailing slash)
    pub base_url: String,
    open: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

impl TestServer {
    /// Binds a random local port and serves until the runtime shuts down.
    pub async fn start(delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let server = Self {
            base_url: base_url.clone(),
            open: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(AtomicUsize::new(0)),
        };

        let open = Arc::clone(&server.open);
        let peak = Arc::clone(&server.peak);
        let requests = Arc::clone(&server.requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let now = open.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                let open = Arc::clone(&open);
                let requests = Arc::clone(&requests);
                let base_url = base_url.clone();
                tokio::spawn(async move {
                    handle(stream, &base_url, delay, &requests).await;
                    open.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        server
    }

    /// Most connections that were open at once.
    pub fn peak_connections(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn handle(mut stream: TcpStream, base_url: &str, delay: Duration, requests: &AtomicUsize) {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    requests.fetch_add(1, Ordering::SeqCst);

    tokio::time::sleep(delay).await;

    let (status, body) = if let Some(id) = path.strip_prefix("/albums/") {
        let page = format!(
            r#"<html><body><img src="{0}/img/{1}-1.png"><img class="x" src="{0}/img/{1}-2.png"></body></html>"#,
            base_url, id
        );
        ("200 OK", page.into_bytes())
    } else if let Some(name) = path.strip_prefix("/img/") {
        ("200 OK", format!("image {}", name).into_bytes())
    } else {
        ("404 Not Found", Vec::new())
    };

    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    if stream.write_all(head.as_bytes()).await.is_err() || stream.write_all(&body).await.is_err() {
        return;
    }
    let _ = stream.shutdown().await;
}
