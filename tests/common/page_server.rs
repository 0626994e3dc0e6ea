//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of paths. HEAD answers with the headers only; GET
//! answers with the body. Every request is logged so tests can assert on
//! which resources were actually fetched.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Resource {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    /// Content-Length announced on HEAD; defaults to the body length.
    pub declared_length: Option<u64>,
}

impl Resource {
    pub fn html(body: &str) -> Self {
        Self::new("text/html; charset=utf-8", body.as_bytes().to_vec())
    }

    pub fn new(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: content_type.to_string(),
            body,
            declared_length: None,
        }
    }

    pub fn declared(mut self, length: u64) -> Self {
        self.declared_length = Some(length);
        self
    }
}

pub struct PageServer {
    pub base: String,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl PageServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    /// (method, path) of every request served so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|(m, _)| m == "GET")
            .map(|(_, p)| p)
            .collect()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }
}

/// Starts a server in a background thread. Unknown paths get 404.
pub fn start(routes: HashMap<String, Resource>) -> PageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &log));
        }
    });
    PageServer {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Resource>,
    log: &Mutex<Vec<(String, String)>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("/").to_string();
    log.lock().unwrap().push((method.clone(), path.clone()));

    let resource = match routes.get(&path) {
        Some(r) => r,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    };

    let reason = if resource.status == 200 { "OK" } else { "Error" };
    if method.eq_ignore_ascii_case("HEAD") {
        let length = resource
            .declared_length
            .unwrap_or(resource.body.len() as u64);
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            resource.status, reason, resource.content_type, length
        );
        let _ = stream.write_all(head.as_bytes());
        return;
    }
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        resource.status,
        reason,
        resource.content_type,
        resource.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&resource.body);
}
