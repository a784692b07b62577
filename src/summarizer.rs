use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use url::Url;

use crate::retry::RetryPolicy;
use crate::types::FolioError;

const PROMPT_PREAMBLE: &str = "You are an expert technical writer. Read the following GitHub README \
content and summarize it in 1-2 short lines that describe what the project is, what it does, and \
its main tech stack if possible.";

/// Remote summarizer: text body in, one-to-two-line synopsis out.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, readme: &str) -> Result<String, FolioError>;
}

/// Gemini `generateContent` client. The API key travels as a query
/// parameter, per the Gemini REST contract.
pub struct GeminiSummarizer {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiSummarizer {
    pub fn new(api_key: &str, endpoint: &str, retry: RetryPolicy) -> Result<Self> {
        let http = reqwest::Client::new();
        let endpoint = Url::parse(endpoint).with_context(|| format!("invalid endpoint {endpoint}"))?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
            retry,
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, readme: &str) -> Result<String, FolioError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);
        let body = json!({
            "contents": [{ "parts": [{ "text": format!("{PROMPT_PREAMBLE}\n\nREADME:\n{readme}\n") }] }]
        });

        let resp = self
            .retry
            .run("summarize", || {
                let url = url.clone();
                let body = body.clone();
                async move {
                    let resp = self
                        .http
                        .post(url)
                        .json(&body)
                        .send()
                        .await
                        .map_err(|e| FolioError::Upstream("summarizer", e.to_string()))?;
                    if !resp.status().is_success() {
                        return Err(FolioError::Upstream(
                            "summarizer",
                            format!("returned {}", resp.status()),
                        ));
                    }
                    Ok(resp)
                }
            })
            .await?;

        let answer: serde_json::Value = resp
            .json()
            .await
            .map_err(|_| FolioError::UnexpectedShape("summarizer"))?;
        extract_summary(&answer).ok_or(FolioError::UnexpectedShape("summarizer"))
    }
}

fn extract_summary(answer: &serde_json::Value) -> Option<String> {
    let text = answer
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
