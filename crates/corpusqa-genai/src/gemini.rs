//! Google Gemini API client.
//!
//! Implements both remote capabilities against the v1beta REST API:
//! `batchEmbedContents` for embeddings and `generateContent` for answers.
//! Auth is a `?key=` query parameter. HTTP failures are mapped onto the
//! [`RemoteError`] taxonomy so the retry layer can tell transient failures
//! from rejected credentials.

use async_trait::async_trait;
use corpusqa_core::config::Settings;
use corpusqa_core::error::RemoteError;
use corpusqa_core::traits::{CompletionModel, Embedder};
use corpusqa_core::types::{DocumentChunk, Turn};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::retry::{with_retry, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Dimensionality of text-embedding-004 vectors.
const EMBED_DIM: usize = 768;

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    chat_model: String,
    retry: RetryPolicy,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client from configuration, reading the API key from the
    /// environment variable named in `settings.api_key_env`.
    ///
    /// A missing key is an auth failure: it is reported immediately and never
    /// retried.
    pub fn new(settings: &Settings) -> Result<Self, RemoteError> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| RemoteError::Auth {
            message: format!("env var '{}' not set", settings.api_key_env),
        })?;
        Self::new_with_key(settings, api_key)
    }

    /// Create a client with an explicitly provided API key.
    pub fn new_with_key(settings: &Settings, api_key: String) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| RemoteError::Transient {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            embed_model: settings.embed_model.clone(),
            chat_model: settings.chat_model.clone(),
            retry: RetryPolicy::with_max_retries(settings.max_retries),
            timeout_secs: settings.request_timeout_secs,
        })
    }

    /// Point the client at a different API base URL (proxies, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    fn endpoint_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, model, method, self.api_key
        )
    }

    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> RemoteError {
        match status.as_u16() {
            401 | 403 => RemoteError::Auth {
                message: format!("Gemini API rejected the credential (HTTP {})", status),
            },
            429 => RemoteError::RateLimited {
                retry_after_secs: 30,
            },
            _ => RemoteError::Transient {
                message: format!("HTTP {} from Gemini API: {}", status, body_text),
            },
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            RemoteError::Transient {
                message: format!("request to Gemini API failed: {}", err),
            }
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, RemoteError> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| RemoteError::Parse {
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        serde_json::from_str(&body_text).map_err(|e| RemoteError::Parse {
            message: format!("invalid JSON in response: {}", e),
        })
    }

    fn build_embed_body(&self, texts: &[String]) -> Value {
        let requests: Vec<Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{}", self.embed_model),
                    "content": {"parts": [{"text": text}]},
                })
            })
            .collect();
        json!({ "requests": requests })
    }

    /// Parse a `batchEmbedContents` response. Order-preserving: embedding `i`
    /// corresponds to request `i`.
    fn parse_embed_response(body: &Value, expected: usize) -> Result<Vec<Vec<f32>>, RemoteError> {
        let embeddings = body["embeddings"]
            .as_array()
            .ok_or_else(|| RemoteError::Parse {
                message: "missing 'embeddings' array in response".to_string(),
            })?;
        if embeddings.len() != expected {
            return Err(RemoteError::Parse {
                message: format!(
                    "expected {} embeddings, got {}",
                    expected,
                    embeddings.len()
                ),
            });
        }
        embeddings
            .iter()
            .map(|entry| {
                entry["values"]
                    .as_array()
                    .ok_or_else(|| RemoteError::Parse {
                        message: "missing 'values' array in embedding".to_string(),
                    })
                    .map(|values| {
                        values
                            .iter()
                            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                            .collect()
                    })
            })
            .collect()
    }

    /// Build the `generateContent` body: prior turns as user/model contents,
    /// the retrieved passages labeled as reference context inside the system
    /// instruction (they are grounding material, not conversation turns), and
    /// the new question as the final user turn.
    fn build_generate_body(history: &[Turn], context: &[DocumentChunk], question: &str) -> Value {
        let mut contents: Vec<Value> = Vec::with_capacity(history.len() * 2 + 1);
        for turn in history {
            contents.push(json!({"role": "user", "parts": [{"text": turn.question}]}));
            contents.push(json!({"role": "model", "parts": [{"text": turn.answer}]}));
        }
        contents.push(json!({"role": "user", "parts": [{"text": question}]}));

        let mut system = String::from(
            "You answer questions about a fixed document corpus. \
             Ground every answer in the reference passages below. \
             If the passages do not contain the answer, say so instead of guessing.",
        );
        if !context.is_empty() {
            system.push_str("\n\nReference passages:");
            for chunk in context {
                system.push_str(&format!("\n[{}] {}", chunk.id, chunk.content));
            }
        }

        json!({
            "system_instruction": {"parts": [{"text": system}]},
            "contents": contents,
            "generationConfig": {"temperature": 0.2},
        })
    }

    fn parse_generate_response(body: &Value) -> Result<String, RemoteError> {
        let candidates = body["candidates"]
            .as_array()
            .ok_or_else(|| RemoteError::Parse {
                message: "missing 'candidates' array in response".to_string(),
            })?;
        let first = candidates.first().ok_or_else(|| RemoteError::Parse {
            message: "empty 'candidates' array in response".to_string(),
        })?;
        let parts = first["content"]["parts"]
            .as_array()
            .ok_or_else(|| RemoteError::Parse {
                message: "missing 'parts' array in candidate content".to_string(),
            })?;
        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    fn dim(&self) -> usize {
        EMBED_DIM
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint_url(&self.embed_model, "batchEmbedContents");
        let body = self.build_embed_body(texts);
        debug!(model = %self.embed_model, batch = texts.len(), "embedding batch");
        with_retry(&self.retry, || async {
            let response = self.post_json(&url, &body).await?;
            Self::parse_embed_response(&response, texts.len())
        })
        .await
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    async fn generate(
        &self,
        history: &[Turn],
        context: &[DocumentChunk],
        question: &str,
    ) -> Result<String, RemoteError> {
        let url = self.endpoint_url(&self.chat_model, "generateContent");
        let body = Self::build_generate_body(history, context, question);
        debug!(model = %self.chat_model, turns = history.len(), "generating answer");
        with_retry(&self.retry, || async {
            let response = self.post_json(&url, &body).await?;
            Self::parse_generate_response(&response)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> GeminiClient {
        GeminiClient::new_with_key(&Settings::default(), "test-key-123".to_string())
            .expect("client creation should succeed")
    }

    fn chunk(id: &str, content: &str) -> DocumentChunk {
        DocumentChunk {
            id: id.to_string(),
            doc_id: "doc".to_string(),
            doc_path: "/tmp/doc.txt".to_string(),
            content: content.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            truncated: false,
        }
    }

    #[test]
    fn new_missing_env_is_auth_error() {
        std::env::remove_var("CORPUSQA_MISSING_KEY_XYZ");
        let mut settings = Settings::default();
        settings.api_key_env = "CORPUSQA_MISSING_KEY_XYZ".to_string();
        match GeminiClient::new(&settings) {
            Err(RemoteError::Auth { message }) => {
                assert!(message.contains("CORPUSQA_MISSING_KEY_XYZ"));
            }
            other => panic!("expected Auth error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn endpoint_url_carries_key_and_method() {
        let client = make_client();
        let url = client.endpoint_url("text-embedding-004", "batchEmbedContents");
        assert!(url.contains("models/text-embedding-004:batchEmbedContents"));
        assert!(url.contains("key=test-key-123"));
    }

    #[test]
    fn http_error_mapping() {
        assert!(matches!(
            GeminiClient::map_http_error(reqwest::StatusCode::UNAUTHORIZED, "{}"),
            RemoteError::Auth { .. }
        ));
        assert!(matches!(
            GeminiClient::map_http_error(reqwest::StatusCode::FORBIDDEN, "{}"),
            RemoteError::Auth { .. }
        ));
        assert!(matches!(
            GeminiClient::map_http_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "{}"),
            RemoteError::RateLimited {
                retry_after_secs: 30
            }
        ));
        match GeminiClient::map_http_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom") {
            RemoteError::Transient { message } => assert!(message.contains("500")),
            other => panic!("expected Transient, got {:?}", other),
        }
    }

    #[test]
    fn embed_body_is_order_preserving() {
        let client = make_client();
        let body = client.build_embed_body(&["first".to_string(), "second".to_string()]);
        let requests = body["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["content"]["parts"][0]["text"], "first");
        assert_eq!(requests[1]["content"]["parts"][0]["text"], "second");
        assert_eq!(requests[0]["model"], "models/text-embedding-004");
    }

    #[test]
    fn parse_embed_response_preserves_order() {
        let body = serde_json::json!({
            "embeddings": [
                {"values": [1.0, 0.0]},
                {"values": [0.0, 1.0]}
            ]
        });
        let vectors = GeminiClient::parse_embed_response(&body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn parse_embed_response_rejects_count_mismatch() {
        let body = serde_json::json!({"embeddings": [{"values": [1.0]}]});
        assert!(matches!(
            GeminiClient::parse_embed_response(&body, 2),
            Err(RemoteError::Parse { .. })
        ));
    }

    #[test]
    fn generate_body_labels_context_and_orders_turns() {
        let history = vec![Turn {
            question: "What is Act 167?".to_string(),
            answer: "A flood regulation act.".to_string(),
        }];
        let context = vec![chunk("doc:0", "Act 167 requires flood regulations.")];
        let body = GeminiClient::build_generate_body(&history, &context, "When is the deadline?");

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "What is Act 167?");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "When is the deadline?");

        // Context rides in the system instruction, not as conversation turns.
        let system = body["system_instruction"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(system.contains("[doc:0] Act 167 requires flood regulations."));
    }

    #[test]
    fn parse_generate_response_joins_text_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "By "}, {"text": "2026."}],
                    "role": "model"
                }
            }]
        });
        assert_eq!(
            GeminiClient::parse_generate_response(&body).unwrap(),
            "By 2026."
        );
    }

    #[test]
    fn parse_generate_response_missing_candidates_is_parse_error() {
        let body = serde_json::json!({"error": "bad request"});
        assert!(matches!(
            GeminiClient::parse_generate_response(&body),
            Err(RemoteError::Parse { .. })
        ));
    }
}
