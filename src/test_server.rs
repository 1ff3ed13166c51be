//! One-shot HTTP listener for driving the real clients in tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

/// Answer a single request with a canned response.
///
/// Returns the listener's origin and a handle resolving to the raw request.
pub async fn serve_once(status: &str, content_type: &str, body: &str) -> (Url, JoinHandle<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let origin = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
  let response = format!(
    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
    status,
    content_type,
    body.len(),
    body
  );

  let handle = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    let request = read_request(&mut socket).await;
    socket.write_all(response.as_bytes()).await.unwrap();
    let _ = socket.shutdown().await;
    request
  });

  (origin, handle)
}

/// Read the head and, going by Content-Length, the body
async fn read_request(socket: &mut TcpStream) -> String {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];

  loop {
    let n = socket.read(&mut chunk).await.unwrap();
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);

    let text = String::from_utf8_lossy(&buf);
    if let Some(end) = text.find("\r\n\r\n") {
      let length = text[..end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
      if buf.len() >= end + 4 + length {
        break;
      }
    }
  }

  String::from_utf8_lossy(&buf).into_owned()
}
