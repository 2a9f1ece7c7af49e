use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

use crate::config::ChatCompletionsConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::payload::{extract_assistant_text, ChatCompletionRequest};
use crate::url::chat_completions_endpoint;

/// Optional cancellation signal polled while a request is in flight.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct ChatCompletionsClient {
    http: Client,
    config: ChatCompletionsConfig,
    endpoint: Url,
    authorization: Option<HeaderValue>,
}

impl ChatCompletionsClient {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, ChatApiError> {
        let endpoint = chat_completions_endpoint(&config.base_url)?;
        let authorization = config
            .api_key
            .as_deref()
            .map(bearer_header)
            .transpose()?;
        let http = Client::builder().build().map_err(ChatApiError::from)?;
        Ok(Self {
            http,
            config,
            endpoint,
            authorization,
        })
    }

    pub fn config(&self) -> &ChatCompletionsConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request body for one preamble + prompt pair using the configured model.
    pub fn request_for(&self, system_prompt: &str, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest::new(
            self.config.model.clone(),
            system_prompt,
            prompt,
            self.config.temperature,
        )
    }

    pub fn build_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        let body = serde_json::to_vec(request)?;
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);

        if let Some(value) = self.authorization.clone() {
            builder = builder.header(AUTHORIZATION, value);
        }

        Ok(builder)
    }

    /// Sends `request` and returns the assistant text.
    ///
    /// The whole exchange is bounded by the configured timeout; `cancellation`
    /// is polled while waiting.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<String, ChatApiError> {
        let timeout = self.config.timeout;
        tracing::debug!(endpoint = %self.endpoint, model = %request.model, "sending chat completion");

        match tokio::time::timeout(timeout, self.send(request, cancellation)).await {
            Ok(result) => result,
            Err(_) => Err(ChatApiError::Timeout(timeout)),
        }
    }

    async fn send(
        &self,
        request: &ChatCompletionRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<String, ChatApiError> {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        let response = await_or_cancel(self.build_request(request)?.send(), cancellation)
            .await?
            .map_err(ChatApiError::from)?;
        let status = response.status();
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .map_err(ChatApiError::from)?;

        if !status.is_success() {
            let message = parse_error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %message, "chat completion rejected");
            return Err(ChatApiError::HttpError { status, message });
        }

        extract_assistant_text(&body)
    }
}

fn bearer_header(api_key: &str) -> Result<HeaderValue, ChatApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| ChatApiError::InvalidApiKey)?;
    value.set_sensitive(true);
    Ok(value)
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ChatApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
