use std::time::Duration;

use srs_testgen::synthesis::{GeminiClient, SynthesisConfig};
use srs_testgen_core::contract::{SynthesisError, Synthesizer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn config(api_key: Option<&str>, base_url: &str) -> SynthesisConfig {
    SynthesisConfig {
        api_key: api_key.map(str::to_owned),
        model: "gemini-1.5-flash".to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(2),
    }
}

/// Serves exactly one HTTP response on a local port and hands back the raw request.
async fn one_shot_server(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1beta/models", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

#[tokio::test]
async fn test_completion_is_read_from_first_candidate_part() {
    let (base_url, server) = one_shot_server(
        "HTTP/1.1 200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"[]"},{"text":"ignored"}],"role":"model"}},{"content":{"parts":[{"text":"second"}]}}]}"#,
    )
    .await;
    let client = GeminiClient::new(config(Some("test-key"), &base_url)).unwrap();

    let completion = client.synthesize("Generate cases").await.expect("200 with candidate");
    assert_eq!(completion, "[]");

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("POST /v1beta/models/gemini-1.5-flash:generateContent?key=test-key"));
    assert!(request.contains(r#"{"contents":[{"parts":[{"text":"Generate cases"}]}]}"#));
}

#[tokio::test]
async fn test_error_status_maps_to_status_error() {
    let (base_url, server) = one_shot_server(
        "HTTP/1.1 503 Service Unavailable",
        r#"{"error":{"code":503,"message":"overloaded"}}"#,
    )
    .await;
    let client = GeminiClient::new(config(Some("test-key"), &base_url)).unwrap();

    let err = client.synthesize("prompt").await.unwrap_err();
    match err {
        SynthesisError::Status { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_blocked_prompt_without_candidates_is_malformed() {
    let (base_url, server) = one_shot_server(
        "HTTP/1.1 200 OK",
        r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#,
    )
    .await;
    let client = GeminiClient::new(config(Some("test-key"), &base_url)).unwrap();

    let err = client.synthesize("prompt").await.unwrap_err();
    assert!(
        matches!(err, SynthesisError::MalformedResponse(ref reason) if reason == "no candidate text"),
        "unexpected error: {err:?}"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_missing_api_key_fails_without_network() {
    let client = GeminiClient::new(config(None, "http://127.0.0.1:9/models")).unwrap();
    let err = client.synthesize("prompt").await.unwrap_err();
    assert!(matches!(err, SynthesisError::MissingCredentials));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let client = GeminiClient::new(config(Some("key"), "http://127.0.0.1:9/models")).unwrap();
    let err = client.synthesize("prompt").await.unwrap_err();
    assert!(
        matches!(err, SynthesisError::Transport(_) | SynthesisError::Timeout(_)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_endpoint_joins_base_url_and_model() {
    let client = GeminiClient::new(config(Some("key"), "https://example.test/v1beta/models/")).unwrap();
    assert_eq!(
        client.endpoint(),
        "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
    );
}

#[test]
fn test_debug_output_hides_api_key() {
    let rendered = format!("{:?}", config(Some("super-secret"), "https://example.test"));
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("api_key_set: true"));
}
