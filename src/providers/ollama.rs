use async_trait::async_trait;
use log::{debug, trace, error};

use crate::config::Configuration;
use crate::error::QueryError;
use crate::request::{GenerateRequest, GenerateResponse};

/// Client for an Ollama-style `/api/generate` endpoint.
/// One attempt per query: no retries, no timeout beyond reqwest's.
#[derive(Debug, Clone, Default)]
pub struct OllamaClient
{   http_client: reqwest::Client
}

impl OllamaClient
{   pub fn new() -> Self
    {   debug!("Creating OllamaClient");
        OllamaClient
        {   http_client: reqwest::Client::new()
        }
    }

    /// Use a preconfigured reqwest client (proxy, TLS roots...)
    pub fn with_http_client(http_client: reqwest::Client) -> Self
    {   OllamaClient { http_client }
    }
}

#[async_trait]
impl super::ModelClient for OllamaClient
{   async fn query(
      &self
    , prompt: &str
    , config: &Configuration
    ) -> Result<String, QueryError>
    {   debug!(
          "Querying model {} with prompt length {}",
          config.model_name, prompt.len()
        );

        let request = GenerateRequest::new(prompt, config);
        trace!("Generate request: {:?}", request);

        let response = self.http_client
          .post(config.generate_url())
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            QueryError::Transport(e.to_string())
          })?;

        let status = response.status();
        trace!("Generate response status: {}", status);

        if !status.is_success()
        {   let body = match response.text().await
            {   Ok(body) => body
              , Err(e) => {
                  error!("Failed reading error body: {}", e);
                  String::new()
                }
            };
            error!("Model API error {}: {}", status, body);
            return Err(QueryError::ApiError(status.as_u16(), body));
        }

        let body = response.bytes().await.map_err(|e| {
          error!("Failed reading response body: {}", e);
          QueryError::Transport(e.to_string())
        })?;

        let generated: GenerateResponse
          = serde_json::from_slice(&body).map_err(|e| {
            error!("Response without usable `response` field: {}", e);
            QueryError::MalformedResponse
          })?;

        if generated.response.is_empty()
        {   error!("Model returned an empty response");
            return Err(QueryError::MalformedResponse);
        }

        debug!("Model answered with {} bytes", generated.response.len());
        Ok(generated.response)
    }
}
