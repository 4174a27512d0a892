use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::services::llm::{LanguageModel, ModelError, TextStream};

/// Client for the Gemini `generateContent` family of endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    default_model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        let api_key = config
            .google_api_key
            .clone()
            .ok_or(ModelError::MissingCredential)?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_key,
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            default_model: config.gemini_model.clone(),
            timeout: Duration::from_secs(config.gemini_timeout_secs),
        })
    }

    fn endpoint(&self, model: Option<&str>, method: &str) -> String {
        let model = model.unwrap_or(&self.default_model);
        format!("{}/models/{}:{}", self.api_base, model, method)
    }

    fn request_body(prompt: &str) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ModelError> {
        let response = request
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, ModelError> {
        let request = self
            .http
            .post(self.endpoint(model, "generateContent"))
            .timeout(self.timeout)
            .json(&Self::request_body(prompt));

        let body: GenerateContentResponse = self.send(request).await?.json().await?;
        let text = body.text();
        if text.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }

    async fn stream(&self, prompt: &str, model: Option<&str>) -> Result<TextStream, ModelError> {
        let request = self
            .http
            .post(self.endpoint(model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .json(&Self::request_body(prompt));

        let response = self.send(request).await?;
        let body = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(ModelError::from)),
        );
        Ok(text_chunks(body))
    }
}

/// Incremental decoder for a `text/event-stream` body. Yields the joined
/// `data:` payload of each completed event.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
}

impl EventStreamDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.feed_line(&line[..line.len() - 1], &mut events);
        }
        events
    }

    /// Flushes a trailing event when the body ends without a blank line.
    pub fn finish(&mut self) -> Vec<String> {
        let mut events = Vec::new();
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            self.feed_line(&line, &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn feed_line(&mut self, line: &[u8], events: &mut Vec<String>) {
        let raw = String::from_utf8_lossy(line);
        let line = raw.strip_suffix('\r').unwrap_or(raw.as_ref());
        if line.is_empty() {
            self.dispatch(events);
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
    }

    fn dispatch(&mut self, events: &mut Vec<String>) {
        if !self.data.is_empty() {
            events.push(self.data.join("\n"));
            self.data.clear();
        }
    }
}

fn chunk_text(payload: &str) -> Result<String, ModelError> {
    let parsed: GenerateContentResponse = serde_json::from_str(payload)?;
    Ok(parsed.text())
}

struct ChunkState<S> {
    body: S,
    decoder: EventStreamDecoder,
    pending: VecDeque<Result<String, ModelError>>,
    done: bool,
}

impl<S> ChunkState<S> {
    fn enqueue(&mut self, payloads: Vec<String>) {
        for payload in payloads {
            match chunk_text(&payload) {
                Ok(text) if text.is_empty() => {}
                Ok(text) => self.pending.push_back(Ok(text)),
                Err(e) => {
                    self.pending.push_back(Err(e));
                    self.done = true;
                    return;
                }
            }
        }
    }
}

/// Turns a raw event-stream body into text chunks. Stops after the first error.
pub(crate) fn text_chunks<S, B>(body: S) -> TextStream
where
    S: Stream<Item = Result<B, ModelError>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = ChunkState {
        body,
        decoder: EventStreamDecoder::default(),
        pending: VecDeque::new(),
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.done {
                return None;
            }
            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let payloads = st.decoder.push(bytes.as_ref());
                    st.enqueue(payloads);
                }
                Some(Err(e)) => {
                    st.pending.push_back(Err(e));
                    st.done = true;
                }
                None => {
                    let payloads = st.decoder.finish();
                    st.enqueue(payloads);
                    st.done = true;
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{}\"}}],\"role\":\"model\"}}}}]}}\r\n\r\n",
            text
        )
    }

    #[test]
    fn test_decoder_handles_split_lines() {
        let mut decoder = EventStreamDecoder::default();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert!(decoder.push(b":1}\n").is_empty());
        assert_eq!(decoder.push(b"\n"), vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn test_decoder_joins_multiline_data_and_skips_comments() {
        let mut decoder = EventStreamDecoder::default();
        let events = decoder.push(b": keep-alive\nevent: message\ndata: one\ndata:two\n\n");
        assert_eq!(events, vec!["one\ntwo".to_string()]);
    }

    #[test]
    fn test_decoder_flushes_unterminated_event() {
        let mut decoder = EventStreamDecoder::default();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), vec!["tail".to_string()]);
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.text(), "Hello");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[tokio::test]
    async fn test_text_chunks_across_byte_boundaries() {
        let raw = format!("{}{}", event("Breathe"), event(" in"));
        let (a, b) = raw.split_at(17);
        let body = futures_util::stream::iter(vec![
            Ok::<_, ModelError>(a.as_bytes().to_vec()),
            Ok(b.as_bytes().to_vec()),
        ]);

        let chunks: Vec<String> = text_chunks(body)
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec!["Breathe".to_string(), " in".to_string()]);
    }

    #[tokio::test]
    async fn test_text_chunks_stop_after_malformed_payload() {
        let raw = format!("{}data: not-json\n\n{}", event("ok"), event("never"));
        let body = futures_util::stream::iter(vec![Ok::<_, ModelError>(raw.into_bytes())]);

        let items: Vec<Result<String, ModelError>> = text_chunks(body).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "ok");
        assert!(matches!(items[1], Err(ModelError::Decode(_))));
    }

    #[test]
    fn test_missing_key_fails_construction() {
        let config = Config::default();
        let err = GeminiClient::from_config(&config).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Google API key not found in environment variables"
        );
    }

    #[test]
    fn test_endpoint_uses_override_model() {
        let config = Config {
            google_api_key: Some("key".into()),
            gemini_api_base: "http://localhost:9999/v1beta/".into(),
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(None, "generateContent"),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(
            client.endpoint(Some("gemini-pro"), "streamGenerateContent"),
            "http://localhost:9999/v1beta/models/gemini-pro:streamGenerateContent"
        );
    }
}
