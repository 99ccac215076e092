use log::{debug, error, info, warn};

use crate::chat::{ChatCompletionRequest, ChatEndpoint, ChatMessage};
use crate::config::GeneratorConfig;
use crate::error::Error;
use crate::request::{Failure, GenerationRequest, GenerationResult};
use crate::retry::RetryPolicy;

/// Stateless note generator bound to one chat-completion endpoint
#[derive(Debug, Clone)]
pub struct ContentGenerator
{   endpoint: ChatEndpoint
  , model: String
  , temperature: f32
  , retry: RetryPolicy
}

impl ContentGenerator
{   /// Build a generator from configuration
    pub fn new(config: &GeneratorConfig) -> Result<Self, Error>
    {   config.validate()?;
        let endpoint = ChatEndpoint::new(config)?;
        debug!("Creating ContentGenerator for model {}", config.model);
        Ok(ContentGenerator
        {   endpoint
          , model: config.model.clone()
          , temperature: config.temperature
          , retry: RetryPolicy::from(&config.retry)
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self
    {   self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy
    {   &self.retry
    }

    /// Assemble the wire request for a generation request
    pub fn build_request(
      &self
    , request: &GenerationRequest
    ) -> ChatCompletionRequest
    {   ChatCompletionRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage::system(crate::prompt::system_instruction())
            , ChatMessage::user(crate::prompt::user_instruction(request))
            ]
          , temperature: self.temperature
          , max_tokens: crate::prompt::max_tokens(request)
          , stream: false
        }
    }

    /// Generate note text; every error is folded into a `Failure`
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> GenerationResult
    {   let result = self.try_generate(request).await;
        if let Err(err) = &result
        {   error!("Generation failed ({}): {}", err.kind(), err);
        }
        GenerationResult::from(result)
    }

    /// Blocking variant for synchronous callers
    ///
    /// Inside a tokio runtime this returns an unexpected-error `Failure`
    /// instead of blocking; use `generate` there.
    pub fn generate_blocking(
      &self
    , request: &GenerationRequest
    ) -> GenerationResult
    {   if tokio::runtime::Handle::try_current().is_ok()
        {   error!("generate_blocking called inside an async runtime");
            return GenerationResult::Failure(Failure::from(Error::Other(
              "generate_blocking called inside an async runtime; \
               await generate instead".to_string()
            )));
        }
        match tokio::runtime::Builder::new_current_thread()
          .enable_all()
          .build()
        {   Ok(runtime) => runtime.block_on(self.generate(request))
          , Err(e) => {
              error!("Failed to start runtime: {}", e);
              GenerationResult::Failure(Failure::from(Error::Other(
                format!("failed to start runtime: {}", e)
              )))
            }
        }
    }

    async fn try_generate(
      &self
    , request: &GenerationRequest
    ) -> Result<String, Error>
    {   request.validate()?;
        debug!(
          "Generating note: theme={} style={} length={} category={}",
          request.theme,
          request.style,
          request.length,
          request.category
        );

        let chat_request = self.build_request(request);
        let api_key = request.credential.expose();

        let mut attempt = 0;
        loop
        { match self.endpoint.complete(&chat_request, api_key).await
          {   Ok(text) => {
                info!(
                  "Generated {} chars after {} attempt(s)",
                  text.chars().count(),
                  attempt + 1
                );
                return Ok(text);
              }
            , Err(err) if self.retry.should_retry(attempt, &err) => {
                let wait = self.retry.backoff_for_attempt(attempt);
                warn!(
                  "Attempt {} failed ({}); retrying in {:?}",
                  attempt + 1, err, wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
              }
            , Err(err) => return Err(err)
          }
        }
    }
}
