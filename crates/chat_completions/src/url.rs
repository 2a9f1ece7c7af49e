use url::Url;

use crate::error::ChatApiError;

/// Default base URL: a local OpenAI-compatible server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";

const ENDPOINT_SEGMENTS: [&str; 2] = ["chat", "completions"];

/// Resolve a base URL to its chat-completions endpoint.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_BASE_URL`]
/// 2) keep a path already ending in `/chat/completions`
/// 3) append `/chat/completions` otherwise
///
/// Only `http` and `https` URLs are accepted.
pub fn chat_completions_endpoint(input: &str) -> Result<Url, ChatApiError> {
    let base = match input.trim() {
        "" => DEFAULT_BASE_URL,
        trimmed => trimmed,
    };

    let mut url = Url::parse(base)
        .map_err(|error| ChatApiError::InvalidBaseUrl(format!("{base}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChatApiError::InvalidBaseUrl(format!(
            "{base}: unsupported scheme '{}'",
            url.scheme()
        )));
    }

    let already_endpoint = url
        .path_segments()
        .map(|segments| {
            let segments = segments.filter(|s| !s.is_empty()).collect::<Vec<_>>();
            segments.ends_with(&ENDPOINT_SEGMENTS)
        })
        .unwrap_or(false);

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ChatApiError::InvalidBaseUrl(format!("{base}: cannot be a base")))?;
        segments.pop_if_empty();
        if !already_endpoint {
            segments.extend(ENDPOINT_SEGMENTS);
        }
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
