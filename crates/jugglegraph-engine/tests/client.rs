use std::sync::{Arc, Mutex};
use std::time::Duration;

use jugglegraph_engine::{EngineClient, EngineConfig, EngineError, RetryPolicy};
use jugglegraph_state::JugglingState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serves `responses` in order, one per connection, and records each request
/// line.
async fn serve(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let line = read_request_line(&mut socket).await;
            seen.lock().unwrap().push(line);
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{addr}"), requests)
}

async fn read_request_line(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|window| window == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn response(status: &str, extra_headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status}\r\n");
    for (name, value) in extra_headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ));
    out
}

fn json_ok(body: &str) -> String {
    response("200 OK", &[("Content-Type", "application/json")], body)
}

fn client(base_url: &str, max_retries: u32) -> EngineClient {
    let config = EngineConfig::new(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        });
    EngineClient::new(config).unwrap()
}

#[tokio::test]
async fn fetches_compact_graph() {
    let (url, requests) = serve(vec![json_ok(
        r#"{"nodes":[7,11],"edges":[{"from":7,"to":11,"throw_height":4}],
            "ground_state":7,"num_nodes":2,"num_edges":1,"max_height":4,"num_props":3}"#,
    )])
    .await;

    let graph = client(&url, 0).graph(3, 4).await.unwrap();
    assert_eq!(graph.ground_state, JugglingState::ground(3));
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges[0].throw_height, 4);

    let requests = requests.lock().unwrap();
    let line = &requests[0];
    assert!(
        line.starts_with("GET /api/v1/state-notation/graph?"),
        "{line}"
    );
    assert!(line.contains("num_props=3"));
    assert!(line.contains("max_height=4"));
    assert!(line.contains("compact=true"));
}

#[tokio::test]
async fn fetches_throws_for_state() {
    let (url, requests) = serve(vec![json_ok(
        r#"{"throws":[{"height":3,"destination":7},{"height":4,"destination":11}],
            "state":7,"max_height":4,"num_throws":2}"#,
    )])
    .await;

    let throws = client(&url, 0)
        .throws(JugglingState::from_bits(7), 4)
        .await
        .unwrap();
    assert_eq!(throws.num_throws, 2);
    assert_eq!(throws.destination_for(3), Some(JugglingState::from_bits(7)));

    let line = requests.lock().unwrap()[0].clone();
    assert!(
        line.starts_with("GET /api/v1/state-notation/throws?"),
        "{line}"
    );
    assert!(line.contains("state=7"));
}

#[tokio::test]
async fn fetches_table_and_config() {
    let (url, _) = serve(vec![
        json_ok(
            r#"{"states":[3,5],"cells":[[2,3],[null,1]],"ground_state":3,
                "num_states":2,"max_height":3,"num_props":2}"#,
        ),
        json_ok(r#"{"max_max_height":12}"#),
    ])
    .await;
    let client = client(&url, 0);

    let table = client.table(2, 3).await.unwrap();
    assert_eq!(table.cells[1], vec![None, Some(1)]);
    assert_eq!(table.ground_state, JugglingState::ground(2));

    let config = client.server_config().await.unwrap();
    assert_eq!(config.max_max_height, 12);
}

#[tokio::test]
async fn rate_limit_is_reported_without_retry() {
    let (url, requests) = serve(vec![
        response("429 Too Many Requests", &[("Retry-After", "30")], ""),
        json_ok(r#"{"max_max_height":12}"#),
    ])
    .await;

    let err = client(&url, 3).server_config().await.unwrap_err();
    assert!(matches!(err, EngineError::RateLimited { retry_after_secs: 30 }));
    assert_eq!(
        err.to_string(),
        "Too many requests. Please try again in 30 seconds."
    );
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn server_error_is_retried() {
    let (url, requests) = serve(vec![
        response("500 Internal Server Error", &[], "boom"),
        json_ok(r#"{"max_max_height":12}"#),
    ])
    .await;

    let config = client(&url, 3).server_config().await.unwrap();
    assert_eq!(config.max_max_height, 12);
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn retries_give_up_with_last_error() {
    let failure = response("503 Service Unavailable", &[], "");
    let (url, requests) = serve(vec![failure.clone(), failure.clone(), failure]).await;

    let err = client(&url, 2).server_config().await.unwrap_err();
    match err {
        EngineError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Request failed with status 503");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn client_error_uses_json_message() {
    let (url, requests) = serve(vec![
        response(
            "400 Bad Request",
            &[("Content-Type", "application/json")],
            r#"{"error":"state does not fit max_height"}"#,
        ),
        json_ok(r#"{"max_max_height":12}"#),
    ])
    .await;

    let err = client(&url, 3)
        .throws(JugglingState::from_bits(7), 4)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "state does not fit max_height");
    assert_eq!(err.status(), Some(400));
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (url, _) = serve(vec![json_ok("not json")]).await;
    let err = client(&url, 0).server_config().await.unwrap_err();
    assert!(matches!(err, EngineError::Decode(_)));
}

#[tokio::test]
async fn invalid_requests_never_reach_the_engine() {
    // Nothing listens here; a request that got sent would fail as Network.
    let client = client("http://127.0.0.1:9", 0);

    let err = client.graph(4, 3).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)), "{err:?}");

    let err = client.graph(0, 3).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)), "{err:?}");

    let err = client.table(3, 65).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)), "{err:?}");

    let err = client
        .throws(JugglingState::from_bits(0b10_0000), 5)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)), "{err:?}");
}
