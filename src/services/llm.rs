use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Incremental text chunks from a streamed completion. Dropping the stream
/// drops the upstream connection.
pub type TextStream = BoxStream<'static, Result<String, ModelError>>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Google API key not found in environment variables")]
    MissingCredential,

    #[error("Request to language model failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Language model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed language model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Language model returned no text")]
    EmptyResponse,
}

/// A remote generative-language service answering a one-message conversation.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Single-shot call returning the full reply. `model` overrides the
    /// configured default.
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, ModelError>;

    /// Streaming call. Errors before the first byte are returned directly;
    /// later failures arrive as the stream's final item.
    async fn stream(&self, prompt: &str, model: Option<&str>) -> Result<TextStream, ModelError>;
}
