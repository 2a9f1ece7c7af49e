use chat_completions::{ChatApiError, ChatCompletionsClient, ChatCompletionsConfig};
use chat_provider::{
    CancelSignal, CompletionProvider, CompletionRequest, ProviderError, ProviderInitError,
    ProviderProfile,
};

/// Stable provider identifier used by startup selection.
pub const CHAT_COMPLETIONS_PROVIDER_ID: &str = "chat-completions";

/// `CompletionProvider` backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug)]
pub struct ChatCompletionsProvider {
    client: ChatCompletionsClient,
}

impl ChatCompletionsProvider {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, ProviderInitError> {
        let client = ChatCompletionsClient::new(config).map_err(|error| {
            ProviderInitError::new(format!(
                "Failed to initialize {CHAT_COMPLETIONS_PROVIDER_ID} provider: {error}"
            ))
        })?;
        Ok(Self { client })
    }

    pub fn config(&self) -> &ChatCompletionsConfig {
        self.client.config()
    }
}

impl CompletionProvider for ChatCompletionsProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: CHAT_COMPLETIONS_PROVIDER_ID.to_string(),
            model_id: self.client.config().model.clone(),
        }
    }

    fn complete(
        &self,
        req: &CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<String, ProviderError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                ProviderError::Transport(format!("failed to initialize tokio runtime: {error}"))
            })?;

        let request = self.client.request_for(&req.system_prompt, &req.prompt);
        runtime
            .block_on(self.client.complete(&request, Some(&cancel)))
            .map_err(map_api_error)
    }
}

pub(crate) fn map_api_error(error: ChatApiError) -> ProviderError {
    match error {
        ChatApiError::HttpError { status, message } => ProviderError::Http {
            status: status.as_u16(),
            message,
        },
        ChatApiError::MalformedResponse(detail) => ProviderError::MalformedResponse(detail),
        ChatApiError::Serde(error) => ProviderError::MalformedResponse(error.to_string()),
        ChatApiError::Timeout(after) => ProviderError::Timeout(after),
        ChatApiError::Cancelled => ProviderError::Cancelled,
        other @ (ChatApiError::InvalidBaseUrl(_)
        | ChatApiError::InvalidApiKey
        | ChatApiError::Request(_)) => ProviderError::Transport(other.to_string()),
    }
}
