//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{CompletionRequest, ContentGenerator, GenerationError};

/// OpenRouter's chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct HttpContentGenerator {
    pub endpoint: String,
    api_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Wait before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
    /// Optional `X-Title` header identifying the calling application.
    pub app_title: Option<String>,
}

impl HttpContentGenerator {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            timeout: Duration::from_secs(120),
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            app_title: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = Some(title.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.is_empty())
    }

    fn request_body(request: &CompletionRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }
}

/// Pull `choices[0].message.content` out of a completions response.
pub fn parse_completion(response: &Value) -> Result<String, GenerationError> {
    let choice = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| GenerationError::MalformedResponse("no choices in response".to_string()))?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| GenerationError::MalformedResponse("choice has no message content".to_string()))?;

    if content.trim().is_empty() {
        return Err(GenerationError::MalformedResponse("message content is empty".to_string()));
    }
    Ok(content.to_string())
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let body = Self::request_body(request);
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let mut last_error = String::from("no attempt made");
        let mut retry_delay = self.initial_backoff;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!(
                    "Generation API retry attempt {} after {:?}",
                    attempt,
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let mut http_request = client
                .post(&self.endpoint)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", api_key));
            if let Some(ref title) = self.app_title {
                http_request = http_request.header("X-Title", title);
            }

            let response = match http_request.json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = "rate limited (429)".to_string();
                continue;
            }
            if status.is_server_error() {
                last_error = format!("server error: {}", status);
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            if !status.is_success() {
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let json: Value = serde_json::from_str(&text).map_err(|e| {
                GenerationError::MalformedResponse(format!(
                    "{} - body: {}",
                    e,
                    text.chars().take(500).collect::<String>()
                ))
            })?;

            log::debug!(
                "Generation API call succeeded: model={}, attempt={}",
                request.model,
                attempt + 1
            );
            return parse_completion(&json);
        }

        Err(GenerationError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_parse_completion() {
        let ok = json!({"choices": [{"message": {"role": "assistant", "content": "Hello"}}]});
        assert_eq!(parse_completion(&ok).unwrap(), "Hello");

        for bad in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": "   "}}]}),
        ] {
            assert!(matches!(
                parse_completion(&bad),
                Err(GenerationError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = HttpContentGenerator::request_body(&CompletionRequest {
            model: "m".into(),
            system: "sys".into(),
            user: "usr".into(),
            temperature: 0.5,
            max_tokens: 50,
        });
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["max_tokens"], 50);
    }

    /// Serve the scripted statuses in order (200 once the script runs out)
    /// and count the hits.
    async fn scripted_endpoint(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let script = Arc::new(Mutex::new(VecDeque::from(statuses)));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let script = script.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let code = script.lock().unwrap().pop_front().unwrap_or(200);
                    let status = StatusCode::from_u16(code).unwrap();
                    let body = if status.is_success() {
                        json!({"choices": [{"message": {"content": "ok"}}]})
                    } else {
                        json!({"error": {"message": "scripted failure"}})
                    };
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1/chat/completions", addr), hits)
    }

    fn generator(endpoint: String, max_retries: u32) -> HttpContentGenerator {
        HttpContentGenerator::new(endpoint, Some("sk-test".into()))
            .with_max_retries(max_retries)
            .with_initial_backoff(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(5))
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "m".into(),
            system: "s".into(),
            user: "u".into(),
            temperature: 0.7,
            max_tokens: 10,
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (endpoint, hits) = scripted_endpoint(vec![503, 200]).await;
        let out = generator(endpoint, 2).complete(&request()).await.unwrap();
        assert_eq!(out, "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_fails_fast() {
        let (endpoint, hits) = scripted_endpoint(vec![400]).await;
        let err = generator(endpoint, 2).complete(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 400, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_retries() {
        let (endpoint, hits) = scripted_endpoint(vec![429, 429]).await;
        let err = generator(endpoint, 1).complete(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::RetriesExhausted { attempts: 2, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_backoff_starts_at_one_second() {
        let generator = HttpContentGenerator::new(DEFAULT_ENDPOINT, None);
        assert_eq!(generator.initial_backoff, Duration::from_secs(1));
        assert_eq!(generator.max_retries, 2);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let generator = HttpContentGenerator::new("http://127.0.0.1:9", None);
        assert!(!generator.has_api_key());
        let err = generator
            .complete(&CompletionRequest {
                model: "m".into(),
                system: "s".into(),
                user: "u".into(),
                temperature: 0.7,
                max_tokens: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
