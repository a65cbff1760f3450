//! HTTP transport tests against a one-shot local server.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpListener},
    thread::{self, JoinHandle},
};

use krug_driver::{
    Error, HttpTransport, StageClient, Transport,
    api::{CompilationUnit, CompilerError, RequestEnvelope, ResponseEnvelope},
};

/// A request as the server saw it.
struct Received {
    request_line: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Serve exactly one request with `status` and `body`, then hang up.
fn serve_once(status: &'static str, body: Vec<u8>) -> (SocketAddr, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0;
        let mut content_type = None;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                match name.to_ascii_lowercase().as_str() {
                    "content-length" => content_length = value.trim().parse().unwrap(),
                    "content-type" => content_type = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }

        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();

        Received {
            request_line: request_line.trim_end().to_string(),
            content_type,
            body: request_body,
        }
    });

    (addr, handle)
}

#[test]
fn test_stage_call_over_http() {
    let response = ResponseEnvelope::new(
        rmp_serde::to_vec_named(&vec!["fn", "main"]).unwrap(),
        vec![CompilerError::warning("unused function 'main'").span(3, 7)],
    );
    let (addr, server) = serve_once("200 OK", serde_json::to_vec(&response).unwrap());

    let transport = HttpTransport::new(None).unwrap();
    let mut client = StageClient::new(transport, addr.to_string());
    let unit = CompilationUnit::new("a.krug", "fn main() {}");

    let resp = client.call("/front/lex", &unit).unwrap();
    let received = server.join().unwrap();

    assert_eq!(received.request_line, "POST /front/lex HTTP/1.1");
    assert_eq!(received.content_type.as_deref(), Some("application/json"));

    let envelope: RequestEnvelope = serde_json::from_slice(&received.body).unwrap();
    let sent: CompilationUnit = rmp_serde::from_slice(&envelope.data).unwrap();
    assert_eq!(sent, unit);

    assert_eq!(resp.url, format!("http://{addr}/front/lex"));
    assert_eq!(resp.decode::<Vec<String>>().unwrap(), vec!["fn", "main"]);
    assert_eq!(resp.diagnostics.len(), 1);
    assert_eq!(resp.diagnostics[0].spans().collect::<Vec<_>>(), vec![(3, 7)]);
}

#[test]
fn test_non_success_status() {
    let (addr, server) = serve_once("500 Internal Server Error", b"{}".to_vec());

    let mut transport = HttpTransport::new(None).unwrap();
    let url = format!("http://{addr}/ir/build");
    let err = transport.post(&url, b"{\"Data\":\"\"}".to_vec()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(*err, Error::Status { status: 500, .. }));
}

#[test]
fn test_malformed_response_body() {
    let (addr, server) = serve_once("200 OK", b"not json".to_vec());

    let mut client = StageClient::new(HttpTransport::new(None).unwrap(), addr.to_string());
    let err = client.call("/mid/build_scope", &()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(*err, Error::Envelope { .. }));
}

#[test]
fn test_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mut client = StageClient::new(HttpTransport::new(None).unwrap(), addr.to_string());
    let err = client.call("/front/lex", &()).unwrap_err();

    assert!(matches!(*err, Error::Transport { .. }));
}
