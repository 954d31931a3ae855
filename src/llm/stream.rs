use std::pin::Pin;

use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::llm::client::OpenAIClient;
use crate::llm::types::{ChatMessage, ChatRequest};
use crate::llm::{LlmErrorKind, classify_error};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StreamChoiceDelta {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: usize,
    pub delta: StreamChoiceDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    pub id: Option<String>,
    pub choices: Vec<StreamChoice>,
}

impl OpenAIClient {
    /// Opens a streaming chat.completions request and yields each text
    /// delta in arrival order. Establishing the stream is retried with
    /// backoff for retryable failures; mid-stream reads never are.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        cancel: Option<CancellationToken>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = self.endpoint();
        let req = ChatRequest {
            model: model.to_string(),
            messages,
            temperature: None,
            stream: Some(true),
        };
        let headers = self.auth_headers();

        if let Ok(payload) = serde_json::to_string(&req) {
            debug!(payload=%payload, endpoint=%url, "sending chat.completions payload (stream)");
        }

        let cancel_token = cancel.unwrap_or_default();

        let mut attempt = 1usize;
        let max_attempts = self.llm_cfg.max_retries.saturating_add(1);
        let resp = loop {
            let fut = self
                .inner
                .post(url.clone())
                .headers(headers.clone())
                .json(&req)
                .send();

            let resp_res = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    info!("chat_stream cancelled before send");
                    return Err(anyhow::anyhow!(LlmErrorKind::Cancelled));
                }
                res = fut => res,
            };

            match resp_res {
                Err(e) => {
                    let err = anyhow::Error::new(e).context("send chat request (stream)");
                    let kind = classify_error(None, &err);
                    if attempt < max_attempts && self.should_retry(kind) {
                        let wait = self.backoff_delay(attempt, None);
                        warn!(attempt, kind=?kind, wait_ms=%wait.as_millis(), "retrying stream establish after send error");
                        tokio::select! {
                            biased;
                            _ = cancel_token.cancelled() => {
                                info!("chat_stream cancelled during retry sleep");
                                return Err(anyhow::anyhow!(LlmErrorKind::Cancelled));
                            }
                            _ = tokio::time::sleep(wait) => {}
                        }
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
                Ok(resp) => {
                    if !resp.status().is_success() {
                        let status = resp.status();
                        let retry_after = resp
                            .headers()
                            .get(RETRY_AFTER)
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok());
                        let text = resp.text().await.unwrap_or_default();
                        let err = anyhow::anyhow!("chat error: {} - {}", status, text);
                        let kind = classify_error(Some(status), &err);
                        if attempt < max_attempts && self.should_retry(kind) {
                            let wait = self.backoff_delay(attempt, retry_after);
                            info!(attempt, status=%status.as_u16(), wait_ms=%wait.as_millis(), "retrying stream establish after HTTP error");
                            tokio::select! {
                                biased;
                                _ = cancel_token.cancelled() => {
                                    info!("chat_stream cancelled during retry sleep");
                                    return Err(anyhow::anyhow!(LlmErrorKind::Cancelled));
                                }
                                _ = tokio::time::sleep(wait) => {}
                            }
                            attempt += 1;
                            continue;
                        }
                        return Err(err);
                    }
                    break resp;
                }
            }
        };

        let mut byte_stream = resp.bytes_stream();
        let mut buf = Vec::<u8>::new();

        let stream = async_stream::try_stream! {
            loop {
                let chunk_res = tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        info!("chat_stream cancelled during byte stream read");
                        Err(anyhow::anyhow!(LlmErrorKind::Cancelled))
                    }
                    chunk = byte_stream.next() => match chunk {
                        Some(Ok(bytes)) => Ok(bytes),
                        Some(Err(e)) => Err(anyhow::Error::new(e).context("byte stream read error")),
                        None => break, // end of stream
                    }
                };

                let chunk = match chunk_res {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!(err=%e, "error reading chunk from byte stream");
                        Err(e)?;
                        break;
                    }
                };

                buf.extend_from_slice(&chunk);
                let mut start = 0usize;
                for i in 0..buf.len() {
                    if buf[i] == b'\n' {
                        let line = &buf[start..i];
                        start = i + 1;
                        if let Ok(s) = std::str::from_utf8(line) {
                            let s = s.trim();
                            if s.is_empty() {
                                continue;
                            }
                            let payload = if let Some(rest) = s.strip_prefix("data:") {
                                rest.trim()
                            } else {
                                s
                            };
                            if payload == "[DONE]" {
                                continue;
                            }

                            debug!(response_chunk=%payload, "chat_stream response");

                            if let Ok(json) = serde_json::from_str::<ChatStreamChunk>(payload) {
                                for ch in json.choices {
                                    if let Some(reason) = ch.finish_reason
                                        && reason == "stop"
                                    {
                                        continue;
                                    }
                                    let delta = ch.delta.content;
                                    if !delta.is_empty() {
                                        yield delta;
                                    }
                                }
                            } else {
                                warn!(payload, "failed to parse stream chunk");
                            }
                        }
                    }
                }
                if start > 0 {
                    buf.drain(0..start);
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
