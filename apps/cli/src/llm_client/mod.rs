//! LLM Client — the single point of entry for all model calls in apply-gpt.
//!
//! ARCHITECTURAL RULE: pipelines depend on the `JsonGenerator` trait only.
//! `OpenAiClient` is the one production implementation; tests substitute stubs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

pub mod schema;

use schema::Schema;

/// Deterministic decoding for every call.
const TEMPERATURE: f32 = 0.0;
/// Property used to wrap non-object schemas, since tool parameters must be objects.
const WRAPPED_VALUE_KEY: &str = "value";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned no call to `{0}`")]
    MissingToolCall(String),

    #[error("LLM returned arguments without the wrapped `value` key")]
    MissingWrappedValue,
}

/// One schema-constrained generation request.
#[derive(Debug, Clone, Copy)]
pub struct JsonRequest<'a> {
    pub system_message: &'a str,
    pub user_message: &'a str,
    /// Name of the generated object in snake_case, e.g. `curriculum`.
    pub name: &'a str,
    pub schema: &'a Schema,
}

/// Produces a single JSON value conforming (by constrained decoding) to a schema.
#[async_trait]
pub trait JsonGenerator: Send + Sync {
    async fn generate(&self, request: JsonRequest<'_>) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    tools: Vec<Value>,
    tool_choice: Value,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client that forces a single function call whose
/// parameters are the requested schema.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: std::time::Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl JsonGenerator for OpenAiClient {
    async fn generate(&self, request: JsonRequest<'_>) -> Result<Value, LlmError> {
        let function_name = format!("generate_{}", request.name);
        let wrapped = !request.schema.is_object();

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_message,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_message,
                },
            ],
            tools: vec![json!({
                "type": "function",
                "function": {
                    "name": function_name,
                    "parameters": tool_parameters(request.schema),
                },
            })],
            tool_choice: json!({ "type": "function", "function": { "name": function_name } }),
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call `{}` succeeded: prompt_tokens={}, completion_tokens={}",
                function_name, usage.prompt_tokens, usage.completion_tokens
            );
        }

        let arguments = chat_response
            .choices
            .into_iter()
            .flat_map(|c| c.message.tool_calls)
            .find(|call| call.function.name == function_name)
            .map(|call| call.function.arguments)
            .ok_or_else(|| LlmError::MissingToolCall(function_name.clone()))?;

        let generated: Value = serde_json::from_str(&arguments)?;
        if wrapped {
            unwrap_value(generated)
        } else {
            Ok(generated)
        }
    }
}

/// Tool parameters must be an object; other schemas go under a single key.
fn tool_parameters(schema: &Schema) -> Value {
    if schema.is_object() {
        schema.to_json()
    } else {
        Schema::object([(WRAPPED_VALUE_KEY, schema.clone())], &[WRAPPED_VALUE_KEY]).to_json()
    }
}

fn unwrap_value(generated: Value) -> Result<Value, LlmError> {
    match generated {
        Value::Object(mut map) => map
            .remove(WRAPPED_VALUE_KEY)
            .ok_or(LlmError::MissingWrappedValue),
        _ => Err(LlmError::MissingWrappedValue),
    }
}
