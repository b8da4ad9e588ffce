//! Loopback HTTP responders for client and backend tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct CapturedRequest {
    pub request_line: String,
    pub body: serde_json::Value,
}

async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text = std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut content_length = 0_usize;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let name = parts.next().unwrap_or_default();
        let value = parts.next().unwrap_or_default().trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = [0_u8; 1024];
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    let body = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|err| err.to_string())?
    };
    Ok(CapturedRequest { request_line, body })
}

/// Answer exactly one request with `status` and `body`, handing back what was sent.
pub async fn serve_once(
    status: u16,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<Result<CapturedRequest, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let captured = read_http_request(&mut stream).await?;
        respond(&mut stream, status, body)
            .await
            .map_err(|err| err.to_string())?;
        Ok(captured)
    });

    (format!("http://{}", addr), server)
}

/// Answer every connection with the same JSON body until the test ends.
pub async fn serve_forever(status: u16, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                // Answer even when the body is not JSON
                let _ = read_http_request(&mut stream).await;
                let _ = respond(&mut stream, status, body).await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn respond(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_once_captures_json_body() {
        let (base, server) = serve_once(201, r#"{"ok":true}"#).await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .json(&serde_json::json!({"message": "hi"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(response.text().await.unwrap(), r#"{"ok":true}"#);

        let captured = server.await.unwrap().unwrap();
        assert_eq!(captured.request_line, "POST /api/chat HTTP/1.1");
        assert_eq!(captured.body["message"], "hi");
    }

    #[tokio::test]
    async fn test_serve_forever_answers_repeated_requests() {
        let base = serve_forever(200, "{}").await;
        let client = reqwest::Client::new();
        for _ in 0..3 {
            let response = client.get(format!("{}/api/status", base)).send().await.unwrap();
            assert!(response.status().is_success());
            assert_eq!(response.text().await.unwrap(), "{}");
        }
        // Bodies that are not JSON still get an answer
        let response = client
            .post(format!("{}/api/chat", base))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
