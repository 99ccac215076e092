use std::time::{Duration, Instant};

use mockito::Matcher;
use serde_json::json;

use rednote::{
  Category
, ContentGenerator
, FailureKind
, GenerationRequest
, GenerationResult
, GeneratorConfig
, Length
, RetryPolicy
, Style
};

fn init_logging()
{   let _ = env_logger::builder().is_test(true).try_init();
}

fn generator_for(api_base: String, timeout_secs: u64) -> ContentGenerator
{   let config = GeneratorConfig
    {   api_base
      , timeout_secs
      , ..GeneratorConfig::default()
    };
    ContentGenerator::new(&config)
      .expect("valid config")
      .with_retry_policy(RetryPolicy::new(2, 1.0, 10))
}

fn sample_request() -> GenerationRequest
{   GenerationRequest::new(
      "周末露营"
    , Style::Seeding
    , Length::Long
    , Category::Travel
    , "sk-test"
    )
}

fn success_body(content: &str) -> String
{   json!({
      "id": "cmpl-1",
      "object": "chat.completion",
      "choices": [{
        "index": 0,
        "message": { "role": "assistant", "content": content },
        "finish_reason": "stop"
      }]
    }).to_string()
}

/// Accepts connections and never answers them
async fn hanging_endpoint() -> String
{   let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((stream, _)) = listener.accept().await
      {   held.push(stream);
      }
    });
    format!("http://{}/v1", addr)
}

#[tokio::test]
async fn test_success_returns_content_verbatim()
{   init_logging();
    let content = "🌲周末露营清单｜谁懂啊\n\n第一段正文✨\n\n#露营 #周末 #户外 #装备 #种草";
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/v1/chat/completions")
      .match_header("authorization", "Bearer sk-test")
      .match_header("content-type", "application/json")
      .match_body(Matcher::PartialJson(json!({
        "model": "moonshot-v1-8k",
        "temperature": 0.7,
        "max_tokens": 800,
        "stream": false
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(success_body(content))
      .expect(1)
      .create_async()
      .await;

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let result = generator.generate(&sample_request()).await;

    assert_eq!(
      result
    , GenerationResult::Success { text: content.to_string() }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_messages_are_system_then_user()
{   init_logging();
    let request = sample_request();
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/v1/chat/completions")
      .match_body(Matcher::PartialJson(json!({
        "messages": [
          { "role": "system", "content": rednote::prompt::SYSTEM_INSTRUCTION },
          { "role": "user", "content": rednote::prompt::user_instruction(&request) }
        ]
      })))
      .with_status(200)
      .with_body(success_body("ok"))
      .expect(1)
      .create_async()
      .await;

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let result = generator.generate(&request).await;

    assert_eq!(result.text(), Some("ok"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_upstream_after_retries()
{   init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/v1/chat/completions")
      .with_status(500)
      .with_body("internal overload")
      .expect(3)
      .create_async()
      .await;

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let result = generator.generate(&sample_request()).await;

    let failure = result.failure().expect("failure");
    assert_eq!(failure.kind, FailureKind::UpstreamError);
    assert!(failure.message.contains("500"));
    assert!(failure.message.contains("internal overload"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_not_retried()
{   init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/v1/chat/completions")
      .with_status(401)
      .with_body(r#"{"error":{"message":"Invalid Authentication"}}"#)
      .expect(1)
      .create_async()
      .await;

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let result = generator.generate(&sample_request()).await;

    let failure = result.failure().expect("failure");
    assert_eq!(failure.kind, FailureKind::UpstreamError);
    assert!(failure.message.contains("401"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_unexpected_with_trace()
{   init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/v1/chat/completions")
      .with_status(200)
      .with_body(r#"{"result":"no choices here"}"#)
      .expect(1)
      .create_async()
      .await;

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let result = generator.generate(&sample_request()).await;

    let failure = result.failure().expect("failure");
    assert_eq!(failure.kind, FailureKind::UnexpectedError);
    let trace = failure.trace.as_deref().expect("trace");
    assert!(trace.contains("no choices here"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_theme_is_never_dispatched()
{   init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any)
      .expect(0)
      .create_async()
      .await;

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let request = GenerationRequest::new(
      ""
    , Style::Practical
    , Length::Short
    , Category::Career
    , "sk-test"
    );
    let result = generator.generate(&request).await;

    assert_eq!(
      result.failure().map(|f| f.kind)
    , Some(FailureKind::InvalidInput)
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_hanging_endpoint_times_out()
{   init_logging();
    let generator = generator_for(hanging_endpoint().await, 1)
      .with_retry_policy(RetryPolicy::none());

    let started = Instant::now();
    let result = generator.generate(&sample_request()).await;
    let elapsed = started.elapsed();

    assert_eq!(
      result.failure().map(|f| f.kind)
    , Some(FailureKind::TransportError)
    );
    assert!(elapsed >= Duration::from_secs(1), "gave up early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "hung: {:?}", elapsed);
}

#[tokio::test]
async fn test_timeout_is_retried()
{   init_logging();
    let generator = generator_for(hanging_endpoint().await, 1)
      .with_retry_policy(RetryPolicy::new(1, 1.0, 50));

    let started = Instant::now();
    let result = generator.generate(&sample_request()).await;
    let elapsed = started.elapsed();

    assert_eq!(
      result.failure().map(|f| f.kind)
    , Some(FailureKind::TransportError)
    );
    assert!(elapsed >= Duration::from_secs(2), "retry skipped: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(15), "hung: {:?}", elapsed);
}

#[tokio::test]
async fn test_refused_connection_is_transport_error()
{   init_logging();
    let addr = {
      let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind");
      listener.local_addr().expect("addr")
    };
    let generator = generator_for(format!("http://{}/v1", addr), 5)
      .with_retry_policy(RetryPolicy::none());

    let result = generator.generate(&sample_request()).await;

    assert_eq!(
      result.failure().map(|f| f.kind)
    , Some(FailureKind::TransportError)
    );
}

#[test]
fn test_blocking_generate_against_stub()
{   init_logging();
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/v1/chat/completions")
      .with_status(200)
      .with_body(success_body("同步调用也可以"))
      .expect(1)
      .create();

    let generator = generator_for(format!("{}/v1", server.url()), 5);
    let result = generator.generate_blocking(&sample_request());

    assert_eq!(result.text(), Some("同步调用也可以"));
    mock.assert();
}

#[tokio::test]
#[ignore]
async fn test_live_moonshot_generation()
{   init_logging();
    let api_key = match std::env::var("MOONSHOT_API_KEY")
    {   Ok(key) => key
      , Err(_) => {
          println!("Skipping: MOONSHOT_API_KEY not set");
          return;
        }
    };

    let generator = ContentGenerator::new(&GeneratorConfig::default())
      .expect("default config");
    let request = GenerationRequest::new(
      "职场新人高效笔记法"
    , Style::Practical
    , Length::Short
    , Category::Career
    , api_key
    );

    match generator.generate(&request).await
    {   GenerationResult::Success { text } => {
          println!("Response: {}", text);
          assert!(!text.trim().is_empty());
        }
      , GenerationResult::Failure(failure) => {
          println!("API Error: {}", failure);
        }
    }
}
