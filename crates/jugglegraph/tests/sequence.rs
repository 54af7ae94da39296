use std::sync::{Arc, Mutex};
use std::time::Duration;

use jugglegraph::runner::{LayoutRunner, apply_token, run_sequence};
use jugglegraph::session::{BuildSession, BuildToken, parse_sequence};
use jugglegraph_engine::{EngineClient, EngineConfig, RetryPolicy};
use jugglegraph_state::{JugglingState, LabelFlags};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const G: JugglingState = JugglingState::from_bits(0b00111);

/// Answers one throws request per connection with the next body in
/// `bodies`, recording each request line.
async fn serve(bodies: Vec<&'static str>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        for body in bodies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|window| window == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let line = String::from_utf8_lossy(&buf)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            seen.lock().unwrap().push(line);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{addr}"), requests)
}

fn client(base_url: &str) -> EngineClient {
    let config = EngineConfig::new(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy::none());
    EngineClient::new(config).unwrap()
}

const FROM_GROUND: &str = r#"{"throws":[{"height":3,"destination":7},{"height":4,"destination":11}],
    "state":7,"max_height":5,"num_throws":2}"#;
const FROM_A: &str = r#"{"throws":[{"height":4,"destination":13}],
    "state":11,"max_height":5,"num_throws":1}"#;
const FROM_B: &str = r#"{"throws":[{"height":1,"destination":7}],
    "state":13,"max_height":5,"num_throws":1}"#;

#[tokio::test(flavor = "current_thread")]
async fn sequence_builds_loop_and_lays_out_on_one_thread() {
    let (url, requests) = serve(vec![FROM_GROUND, FROM_A, FROM_A, FROM_B]).await;
    let client = client(&url);
    let mut session = BuildSession::new(3, 5).unwrap();
    let runner = LayoutRunner::spawn().unwrap();
    let tokens = parse_sequence("4 4 u 4 1 q 3").unwrap();

    let layout = run_sequence(&client, &mut session, &runner, &tokens, LabelFlags::PLAIN)
        .await
        .unwrap();

    assert_eq!(session.builder().siteswap(), "4 4 1");
    assert_eq!(session.current_state(), G);
    assert_eq!(Some(layout.request_id), runner.requested_id());
    assert_eq!(layout.nodes.len(), 3);
    assert_eq!(layout.edges.len(), 3);
    let current = layout.node_for_state(G).expect("ground node");
    assert!(current.is_current);
    assert_eq!(current.id, "00111");

    // Nothing after `q` reaches the engine.
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 4);
    assert!(requests[1].contains("state=11"), "{}", requests[1]);
}

#[tokio::test(flavor = "current_thread")]
async fn empty_sequence_lays_out_ground_state() {
    let client = client("http://127.0.0.1:9");
    let mut session = BuildSession::new(3, 5).unwrap();
    let runner = LayoutRunner::spawn().unwrap();

    let layout = run_sequence(&client, &mut session, &runner, &[], LabelFlags::PLAIN)
        .await
        .unwrap();
    assert_eq!(layout.nodes.len(), 1);
    assert!(layout.edges.is_empty());
    assert!(layout.node_for_state(G).is_some_and(|node| node.is_base));
}

#[tokio::test(flavor = "current_thread")]
async fn undo_without_steps_reports_no_change() {
    // Undo and reset never contact the engine.
    let client = client("http://127.0.0.1:9");
    let mut session = BuildSession::new(3, 5).unwrap();
    let flags = LabelFlags::PLAIN;

    let undone = apply_token(&client, &mut session, BuildToken::Undo, flags)
        .await
        .unwrap();
    assert!(!undone);
    let shown = apply_token(&client, &mut session, BuildToken::Show, flags)
        .await
        .unwrap();
    assert!(!shown);
    let reset = apply_token(&client, &mut session, BuildToken::Reset, flags)
        .await
        .unwrap();
    assert!(reset);
}

#[tokio::test(flavor = "current_thread")]
async fn unavailable_throw_stops_the_sequence() {
    let (url, _) = serve(vec![FROM_GROUND]).await;
    let client = client(&url);
    let mut session = BuildSession::new(3, 5).unwrap();
    let runner = LayoutRunner::spawn().unwrap();
    let tokens = [BuildToken::Throw(5), BuildToken::Throw(3)];

    let err = run_sequence(&client, &mut session, &runner, &tokens, LabelFlags::PLAIN)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("available: 3 4"), "{err:#}");
    assert_eq!(session.current_state(), G);
}
