//! HTTP response handlers.

use crate::utils::mime::{self, types};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a static file.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Respond with the site's `404.html` when present, plain text otherwise.
pub fn respond_not_found(request: Request, output: &Path) -> Result<()> {
    let custom_404 = output.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let content_type = if has_custom { types::HTML } else { types::PLAIN };
        return send_head(request, 404, content_type);
    }

    if has_custom
        && let Ok(body) = fs::read(&custom_404)
    {
        return send_body(request, 404, types::HTML, body);
    }

    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything but GET and HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = Response::from_data(b"405 Method Not Allowed".to_vec())
        .with_status_code(StatusCode(405))
        .with_header(make_header("Content-Type", types::PLAIN))
        .with_header(make_header("Allow", "GET, HEAD"));
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 while shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-cache"));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-cache"));
    request.respond(response)?;
    Ok(())
}

/// Header from static ASCII parts; these never fail to parse.
fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use tiny_http::Server;

    /// Send `raw` to a throwaway server, answer with `respond`, and return
    /// the raw response text.
    fn exchange(raw: &str, respond: impl FnOnce(Request) -> Result<()>) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let raw = raw.to_string();
        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(raw.as_bytes()).unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        });

        respond(server.recv().unwrap()).unwrap();
        client.join().unwrap()
    }

    fn request(method: &str, url: &str) -> String {
        format!("{method} {url} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map_or("", |(_, body)| body)
    }

    fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
        response.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[test]
    fn test_file_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.css");
        fs::write(&path, "a{}").unwrap();

        let response = exchange(&request("GET", "/main.css"), |req| respond_file(req, &path));
        assert!(response.starts_with("HTTP/1.1 200"));
        assert_eq!(header(&response, "Content-Type"), Some(types::CSS));
        assert_eq!(body(&response), "a{}");
    }

    #[test]
    fn test_head_has_no_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "<p>hi</p>").unwrap();

        let response = exchange(&request("HEAD", "/"), |req| respond_file(req, &path));
        assert!(response.starts_with("HTTP/1.1 200"));
        assert_eq!(header(&response, "Content-Type"), Some(types::HTML));
        assert_eq!(body(&response), "");
    }

    #[test]
    fn test_custom_not_found_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("404.html"), "<h1>lost</h1>").unwrap();

        let response = exchange(&request("GET", "/nope"), |req| {
            respond_not_found(req, dir.path())
        });
        assert!(response.starts_with("HTTP/1.1 404"));
        assert_eq!(header(&response, "Content-Type"), Some(types::HTML));
        assert_eq!(body(&response), "<h1>lost</h1>");
    }

    #[test]
    fn test_plain_not_found_without_page() {
        let dir = tempfile::tempdir().unwrap();

        let response = exchange(&request("GET", "/nope"), |req| {
            respond_not_found(req, dir.path())
        });
        assert!(response.starts_with("HTTP/1.1 404"));
        assert_eq!(header(&response, "Content-Type"), Some(types::PLAIN));
        assert_eq!(body(&response), "404 Not Found");

        let response = exchange(&request("HEAD", "/nope"), |req| {
            respond_not_found(req, dir.path())
        });
        assert!(response.starts_with("HTTP/1.1 404"));
        assert_eq!(body(&response), "");
    }

    #[test]
    fn test_method_not_allowed() {
        let response = exchange(&request("POST", "/"), respond_method_not_allowed);
        assert!(response.starts_with("HTTP/1.1 405"));
        assert_eq!(header(&response, "Allow"), Some("GET, HEAD"));
        assert_eq!(body(&response), "405 Method Not Allowed");
    }
}
