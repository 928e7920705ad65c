//! HTTP server for the question-answering endpoint
//! Simple HTTP server using tokio and basic HTTP handling
//!
//! Routes:
//! - `GET  /health`    liveness
//! - `POST /ask`       `{"q": "..."}` -> answer payload
//! - `GET  /debug/sql` latest recorded plan, or a placeholder note

use samarth::{AnswerPayload, Planner};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const MAX_REQUEST_BYTES: usize = 1_000_000;

#[derive(Deserialize)]
struct AskRequest {
    q: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let planner = Arc::new(Planner::from_env());
    let bind = std::env::var("SAMARTH_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    info!("Clean data: {}", planner.config().clean_dir.display());
    info!("Manifest: {}", planner.config().manifest_path.display());

    let listener = TcpListener::bind(&bind).await?;
    info!("Server listening on {}", bind);

    loop {
        let (stream, addr) = listener.accept().await?;
        debug!("New connection from: {}", addr);
        tokio::spawn(handle_connection(stream, Arc::clone(&planner)));
    }
}

async fn handle_connection(mut stream: TcpStream, planner: Arc<Planner>) {
    use tokio::time::{timeout, Duration};

    let mut buffer = Vec::new();
    let mut temp_buf = [0; 8192];

    let read_result = timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut temp_buf).await {
                Ok(0) => break,
                Ok(n) => {
                    buffer.extend_from_slice(&temp_buf[..n]);
                    if let Ok(s) = std::str::from_utf8(&buffer) {
                        if let Some(headers_end) = s.find("\r\n\r\n") {
                            let body_len = extract_content_length(s).unwrap_or(0);
                            if buffer.len() >= headers_end + 4 + body_len {
                                break;
                            }
                        }
                    }
                    if buffer.len() > MAX_REQUEST_BYTES {
                        break;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    })
    .await;

    match read_result {
        Err(_) => {
            warn!("Request read timeout");
            return;
        }
        Ok(Err(e)) => {
            warn!("Failed to read from stream: {}", e);
            return;
        }
        Ok(Ok(())) => {}
    }
    if buffer.is_empty() {
        return;
    }

    let request = String::from_utf8_lossy(&buffer).to_string();
    let response = handle_request(&request, planner).await;
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        warn!("Failed to write response: {}", e);
    }
}

fn extract_content_length(request: &str) -> Option<usize> {
    for line in request.lines() {
        if line.to_lowercase().starts_with("content-length:") {
            if let Some(value) = line.split(':').nth(1) {
                return value.trim().parse().ok();
            }
        }
    }
    None
}

fn request_body(request: &str) -> &str {
    match request.find("\r\n\r\n") {
        Some(idx) => request[idx + 4..].trim(),
        None => "",
    }
}

async fn handle_request(request: &str, planner: Arc<Planner>) -> String {
    let request_line = request.lines().next().unwrap_or_default();
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return create_response(400, "Bad Request", "{}");
    }

    let method = parts[0];
    let path = parts[1].split('?').next().unwrap_or("/");
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    debug!("Request: {} {}", method, path);

    match (method, path) {
        ("GET", "/health") => create_response(200, "OK", r#"{"status":"ok"}"#),
        ("GET", "/debug/sql") => {
            let body = planner.recorder().debug_view().to_string();
            create_response(200, "OK", &body)
        }
        ("POST", "/ask") => {
            let ask: AskRequest = match serde_json::from_str(request_body(request)) {
                Ok(ask) => ask,
                Err(e) => {
                    let error_json = serde_json::json!({ "error": format!("Invalid JSON: {}", e) });
                    return create_response(400, "Bad Request", &error_json.to_string());
                }
            };

            // The planner reads parquet synchronously
            let payload = tokio::task::spawn_blocking(move || planner.answer_or_degrade(&ask.q))
                .await
                .unwrap_or_else(|e| {
                    error!("Planner task failed: {}", e);
                    AnswerPayload::error(e)
                });

            match serde_json::to_string(&payload) {
                Ok(body) => create_response(200, "OK", &body),
                Err(e) => {
                    let error_json = serde_json::json!({ "error": e.to_string() });
                    create_response(500, "Internal Server Error", &error_json.to_string())
                }
            }
        }
        ("OPTIONS", _) => create_response(204, "No Content", ""),
        _ => create_response(404, "Not Found", r#"{"error":"Not found"}"#),
    }
}

fn create_response(status: u16, status_text: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        status,
        status_text,
        body.len(),
        body
    )
}
