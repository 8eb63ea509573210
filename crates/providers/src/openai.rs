//! Client for OpenAI-compatible `/chat/completions` endpoints (OpenRouter by default).

use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, trace, warn},
};

use {chatrelay_common::Turn, chatrelay_config::CompletionConfig};

use crate::{CompletionProvider, CompletionResponse, Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiCompatProvider {
    api_key: Secret<String>,
    model: String,
    base_url: String,
    provider_name: String,
    referer: Option<String>,
    title: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(api_key: Secret<String>, model: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api_key,
            model,
            provider_name: provider_name_for(&base_url).into(),
            base_url,
            referer: None,
            title: None,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Build a provider from the `[completion]` config section.
    ///
    /// The HTTP client carries the configured timeout so a stalled connection
    /// is torn down even if the caller stops polling.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            timeout: config.timeout(),
            ..Self::new(
                config.api_key.clone(),
                config.model.clone(),
                config.base_url.clone(),
            )
            .with_attribution(&config.referer, &config.title)
        })
    }

    /// Set the `HTTP-Referer` / `X-Title` attribution headers. Empty values are skipped.
    #[must_use]
    pub fn with_attribution(mut self, referer: &str, title: &str) -> Self {
        self.referer = Some(referer.trim()).filter(|s| !s.is_empty()).map(str::to_string);
        self.title = Some(title.trim()).filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn map_transport_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                after: self.timeout,
            }
        } else {
            Error::Http(error)
        }
    }
}

fn provider_name_for(base_url: &str) -> &'static str {
    if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains("api.openai.com") {
        "openai"
    } else {
        "openai-compat"
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, turns: &[Turn]) -> Result<CompletionResponse> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": turns,
        });

        debug!(
            model = %self.model,
            provider = %self.provider_name,
            messages_count = turns.len(),
            "completion request"
        );
        trace!(body = %body, "completion request body");

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(self.timeout)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("content-type", "application/json");
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            request = request.header("X-Title", title);
        }

        let http_resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = http_resp.status();
        if !status.is_success() {
            let body_text = http_resp.text().await.unwrap_or_default();
            warn!(
                status = %status,
                model = %self.model,
                provider = %self.provider_name,
                body = %body_text,
                "completion API error"
            );
            return Err(Error::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let resp = http_resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        trace!(response = %resp, "completion raw response");

        parse_completion(&resp)
    }
}

/// Extract the visible reply from a chat-completions payload.
fn parse_completion(resp: &serde_json::Value) -> Result<CompletionResponse> {
    // OpenRouter reports upstream failures as a 200 with an `error` object.
    if let Some(error) = resp.get("error").filter(|e| !e.is_null()) {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(Error::malformed(format!("service reported error: {message}")));
    }

    let message = resp
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| Error::malformed("missing choices[0].message"))?;

    let text = message["content"]
        .as_str()
        .map(strip_think_tags)
        .filter(|visible| !visible.is_empty());

    Ok(CompletionResponse { text })
}

/// Drop `<think>…</think>` reasoning blocks and trim the rest.
///
/// An unterminated `<think>` hides everything after it.
fn strip_think_tags(text: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut visible = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        visible.push_str(&rest[..start]);
        match rest[start + OPEN.len()..].find(CLOSE) {
            Some(end) => rest = &rest[start + OPEN.len() + end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            },
        }
    }
    visible.push_str(rest);
    visible.trim().to_string()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        extract::Request,
        http::{HeaderMap, StatusCode},
        routing::post,
    };

    use super::*;

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        headers: HeaderMap,
        body: serde_json::Value,
    }

    /// Start a mock endpoint that records each request and answers with
    /// `status` and the given JSON body.
    async fn start_mock(
        status: StatusCode,
        response: serde_json::Value,
    ) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
        let captured: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();

        let app = Router::new().route(
            "/chat/completions",
            post(move |req: Request| {
                let cap = captured_clone.clone();
                let response = response.clone();
                async move {
                    let headers = req.headers().clone();
                    let body_bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
                        .await
                        .unwrap_or_default();
                    let body = serde_json::from_slice(&body_bytes).unwrap_or_default();
                    cap.lock().unwrap().push(CapturedRequest { headers, body });
                    (status, axum::Json(response))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), captured)
    }

    fn test_provider(base_url: &str) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(
            Secret::new("test-key".to_string()),
            "openai/gpt-oss-120b:free".to_string(),
            base_url.to_string(),
        )
        .with_attribution("https://discord.com", "My Discord Bot")
    }

    fn reply(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn sends_turns_and_headers() {
        let (url, captured) = start_mock(StatusCode::OK, reply("hello".into())).await;
        let provider = test_provider(&url);

        let turns = vec![Turn::system("be rude"), Turn::user("hi")];
        let response = provider.complete(&turns).await.unwrap();
        assert_eq!(response, CompletionResponse::text("hello"));

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let req = &captured[0];
        assert_eq!(req.body["model"], "openai/gpt-oss-120b:free");
        assert_eq!(
            req.body["messages"],
            serde_json::json!([
                { "role": "system", "content": "be rude" },
                { "role": "user", "content": "hi" },
            ])
        );
        assert_eq!(req.headers["authorization"], "Bearer test-key");
        assert_eq!(req.headers["http-referer"], "https://discord.com");
        assert_eq!(req.headers["x-title"], "My Discord Bot");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, _) = start_mock(
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({ "error": { "message": "slow down" } }),
        )
        .await;
        let err = test_provider(&url)
            .complete(&[Turn::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 429, ref body } if body.contains("slow down")));
    }

    #[tokio::test]
    async fn null_content_is_empty_response() {
        let (url, _) = start_mock(StatusCode::OK, reply(serde_json::Value::Null)).await;
        let response = test_provider(&url)
            .complete(&[Turn::user("hi")])
            .await
            .unwrap();
        assert_eq!(response, CompletionResponse::empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = test_provider(&format!("http://{addr}"))
            .complete(&[Turn::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn parse_reports_embedded_error() {
        let err = parse_completion(&serde_json::json!({
            "error": { "message": "upstream overloaded", "code": 502 }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("upstream overloaded"));
    }

    #[test]
    fn parse_rejects_missing_choices() {
        let err = parse_completion(&serde_json::json!({ "id": "x" })).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn strips_reasoning_blocks() {
        assert_eq!(strip_think_tags("<think>hmm</think> hi"), "hi");
        assert_eq!(strip_think_tags("a<think>x</think>b<think>y</think>c"), "abc");
        assert_eq!(strip_think_tags("answer <think>never closed"), "answer");
        assert_eq!(strip_think_tags("<think>only</think>"), "");
    }

    #[test]
    fn provider_name_follows_base_url() {
        let p = OpenAiCompatProvider::new(
            Secret::new(String::new()),
            "m".into(),
            "https://openrouter.ai/api/v1/".into(),
        );
        assert_eq!(p.name(), "openrouter");
        assert_eq!(p.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(provider_name_for("http://localhost:11434/v1"), "openai-compat");
    }
}
