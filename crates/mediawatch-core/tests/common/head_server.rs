//! Minimal HTTP/1.1 server that answers HEAD with a switchable status for integration tests.
//!
//! Every request is counted. The status can be flipped while the server runs to
//! simulate a source that comes back after an outage.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct HeadServer {
    pub url: String,
    status: Arc<AtomicU32>,
    heads: Arc<AtomicUsize>,
}

impl HeadServer {
    /// Status returned to subsequent HEAD requests.
    pub fn set_status(&self, status: u32) {
        self.status.store(status, Ordering::SeqCst);
    }

    /// Number of HEAD requests seen so far.
    pub fn head_count(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread answering HEAD with `status`.
pub fn start(status: u32) -> HeadServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let server = HeadServer {
        url: format!("http://127.0.0.1:{}/movie.mp4", port),
        status: Arc::new(AtomicU32::new(status)),
        heads: Arc::new(AtomicUsize::new(0)),
    };
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let shared = shared.clone();
            thread::spawn(move || handle(stream, &shared));
        }
    });
    server
}

fn handle(mut stream: std::net::TcpStream, server: &HeadServer) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 4096];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    server.heads.fetch_add(1, Ordering::SeqCst);
    let status = server.status.load(Ordering::SeqCst);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 1024\r\nConnection: close\r\n\r\n",
        status,
        reason(status)
    );
    let _ = stream.write_all(response.as_bytes());
}

fn reason(status: u32) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
