use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use chat_provider::{
    CancelSignal, CompletionProvider, CompletionRequest, ProviderError, ProviderProfile,
};

pub const MOCK_PROVIDER_ID: &str = "mock";
pub const MOCK_MODEL_ID: &str = "mock-echo";

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Offline provider that answers every prompt with a deterministic echo.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    delay: Duration,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits `delay` before answering, honouring cancellation meanwhile.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn reply_for(prompt: &str) -> String {
        format!("You said: {prompt}")
    }
}

impl CompletionProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: MOCK_MODEL_ID.to_string(),
        }
    }

    fn complete(
        &self,
        req: &CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<String, ProviderError> {
        let deadline = Instant::now() + self.delay;
        loop {
            if cancel.load(Ordering::Acquire) {
                return Err(ProviderError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }

        Ok(Self::reply_for(&req.prompt))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            request_id: 1,
            parent_id: 2,
            system_prompt: "sys".to_string(),
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn echoes_prompt() {
        let provider = MockProvider::new();
        assert_eq!(
            provider.complete(&request("hi"), CancelSignal::default()),
            Ok("You said: hi".to_string())
        );
        assert_eq!(provider.profile().provider_id, MOCK_PROVIDER_ID);
    }

    #[test]
    fn cancelled_before_delay_elapses() {
        let provider = MockProvider::with_delay(Duration::from_secs(5));
        let cancel = CancelSignal::default();
        cancel.store(true, Ordering::SeqCst);
        assert_eq!(
            provider.complete(&request("hi"), cancel),
            Err(ProviderError::Cancelled)
        );
    }
}
