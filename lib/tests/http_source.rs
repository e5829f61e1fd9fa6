use std::time::Duration;

use btcdata::metrics::INFO_PATH;
use btcdata::nethash::NetHashSource;
use btcdata::{ChainMetrics, ClientConfig, DataSource, HttpSource, Resolver, Unavailable};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serves `response` to every connection and reports each raw request
async fn serve(response: String) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), rx)
}

/// Accepts connections and never answers
async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}")
}

fn config() -> ClientConfig {
    ClientConfig {
        user_agent: "btcdata-test/1".to_string(),
        timeout: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn success_envelope_yields_inner_data() {
    let body = json!({"status": "success", "data": {"blocks": 42}}).to_string();
    let (url, mut requests) = serve(http_response("200 OK", &body)).await;
    let source = HttpSource::new(url, &config()).unwrap();

    assert_eq!(source.fetch(INFO_PATH).await, Ok(json!({"blocks": 42})));

    let request = requests.recv().await.unwrap();
    assert!(request.starts_with("GET /api/v2/get_info/BTC HTTP/1.1"));
    assert!(request.to_lowercase().contains("user-agent: btcdata-test/1"));
}

#[tokio::test]
async fn failed_envelope_is_unavailable() {
    let body = json!({"status": "fail", "data": {"network": "not supported"}}).to_string();
    let (url, _requests) = serve(http_response("200 OK", &body)).await;
    let source = HttpSource::new(url, &config()).unwrap();

    assert_eq!(source.fetch(INFO_PATH).await, Err(Unavailable));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let body = json!({"status": "success", "data": {}}).to_string();
    let (url, _requests) = serve(http_response("500 Internal Server Error", &body)).await;
    let source = HttpSource::new(url, &config()).unwrap();

    assert_eq!(source.fetch(INFO_PATH).await, Err(Unavailable));
}

#[tokio::test]
async fn malformed_json_is_unavailable() {
    let (url, _requests) = serve(http_response("200 OK", "{\"status\": \"succ")).await;
    let source = HttpSource::new(url, &config()).unwrap();

    assert_eq!(source.fetch(INFO_PATH).await, Err(Unavailable));
}

#[tokio::test]
async fn slow_source_times_out() {
    let source = HttpSource::new(serve_silence().await, &config()).unwrap();

    let started = std::time::Instant::now();
    assert_eq!(source.fetch(INFO_PATH).await, Err(Unavailable));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = HttpSource::new(format!("http://{addr}"), &config()).unwrap();

    assert_eq!(source.fetch(INFO_PATH).await, Err(Unavailable));
}

#[tokio::test]
async fn resolver_falls_back_to_the_next_explorer() {
    let (broken, _r1) = serve(http_response("503 Service Unavailable", "")).await;
    let body = json!({
        "status": "success",
        "data": {
            "blocks": 840_000,
            "mining_difficulty": "86388558925171.02",
            "hashrate": "618364748286549300000",
        }
    })
    .to_string();
    let (working, _r2) = serve(http_response("200 OK", &body)).await;

    let resolver = Resolver::from_urls([broken, working], &config()).unwrap();
    let snapshot = ChainMetrics::new(resolver, None)
        .current_snapshot()
        .await
        .unwrap();

    assert_eq!(snapshot.block_height, 840_000);
}

#[tokio::test]
async fn nethash_estimate_parses_plain_text() {
    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 13\r\nConnection: close\r\n\r\n598443871.75\n";
    let (url, _requests) = serve(response.to_string()).await;
    let source = NetHashSource::new(format!("{url}/speed-3D.txt"), &config()).unwrap();

    let resolver = Resolver::new(vec![]);
    let metrics = ChainMetrics::new(resolver, Some(source));

    assert_eq!(metrics.nethash_estimate().await, Ok(598_443_871.75));
}
