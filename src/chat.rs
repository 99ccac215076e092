//! Chat-completion wire types and a single HTTP attempt

use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

use crate::error::Error;

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub max_tokens: u32
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   pub content: String
}

// ===== Endpoint =====

/// One chat-completion endpoint behind a pooled HTTP client
#[derive(Debug, Clone)]
pub struct ChatEndpoint
{   url: String
  , timeout_secs: u64
  , http_client: reqwest::Client
}

impl ChatEndpoint
{   pub fn new(config: &crate::config::GeneratorConfig)
      -> Result<Self, Error>
    {   let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;
        let url = config.completions_url();
        debug!("Chat endpoint at {}", url);
        Ok(ChatEndpoint
        {   url
          , timeout_secs: config.timeout_secs
          , http_client
        })
    }

    pub fn url(&self) -> &str
    {   &self.url
    }

    /// Send one request; no retries at this layer
    pub async fn complete(
      &self
    , request: &ChatCompletionRequest
    , api_key: &str
    ) -> Result<String, Error>
    {   trace!(
          "Chat request: model={} messages={} max_tokens={}",
          request.model,
          request.messages.len(),
          request.max_tokens
        );

        let response = self.http_client
          .post(&self.url)
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(request)
          .send()
          .await
          .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Endpoint error {}: {}", status, body);
            return Err(Error::ApiError
            {   status: status.as_u16()
              , body
            });
        }

        let body = response.text().await
          .map_err(|e| self.transport_error(e))?;

        extract_content(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> Error
    {   if e.is_timeout()
        {   error!("Request timed out after {}s", self.timeout_secs);
            Error::Timeout(self.timeout_secs)
        } else
        {   error!("HTTP error: {}", e);
            Error::HttpError(e.to_string())
        }
    }
}

/// Pull `choices[0].message.content` out of a response body
pub fn extract_content(body: &str) -> Result<String, Error>
{   let chat_response: ChatCompletionResponse
      = serde_json::from_str(body).map_err(|e| {
        error!("Parse error: {}", e);
        Error::parse("malformed chat-completion response", &e, body)
      })?;

    if let Some(reason) = chat_response.choices.first()
      .and_then(|c| c.finish_reason.as_deref())
    {   debug!("finish_reason: {}", reason);
    }

    chat_response.choices.into_iter()
      .next()
      .map(|c| c.message.content)
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse(body.to_string())
      })
}
