//! Google Cloud Translation (v2 REST) implementation of [`Translator`].

use autotranslate::{Error, Translator};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::{thread, time::Duration};

pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const TIMEOUT_SECS: u64 = 60;

pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GoogleTranslator {
    pub fn new(api_key: impl Into<String>, endpoint: Option<String>) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(GoogleTranslator {
            client,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Translator for GoogleTranslator {
    fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, Error> {
        let body = TranslateRequest {
            q: texts,
            source: source_language,
            target: target_language,
            // "text" keeps the service from HTML-escaping quotes and ampersands
            format: "text",
        };

        let mut attempt = 0;
        loop {
            let res = self
                .client
                .post(&self.endpoint)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send();

            let resp = match res {
                Ok(resp) => resp,
                Err(e) if e.is_timeout() && attempt + 1 < MAX_RETRIES => {
                    tracing::warn!(attempt, "translation request timed out, retrying");
                    thread::sleep(backoff(attempt));
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    return Err(Error::gateway_error(
                        format!("request to {} failed", self.endpoint),
                        Some(Box::new(e)),
                    ));
                }
            };

            let status = resp.status();
            let text = resp.text().map_err(|e| {
                Error::gateway_error("failed to read translation response", Some(Box::new(e)))
            })?;

            if status.is_success() {
                return parse_translations(&text);
            }
            if should_retry_http(status) && attempt + 1 < MAX_RETRIES {
                tracing::warn!(attempt, %status, "translation service busy, retrying");
                thread::sleep(backoff(attempt));
                attempt += 1;
                continue;
            }
            return Err(Error::gateway_error(
                extract_error_message(status, &text),
                None,
            ));
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(BASE_DELAY_MS * 2_u64.pow(attempt as u32))
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn parse_translations(body: &str) -> Result<Vec<String>, Error> {
    let parsed: TranslateResponse = serde_json::from_str(body).map_err(|e| {
        Error::gateway_error("malformed translation response", Some(Box::new(e)))
    })?;
    Ok(parsed
        .data
        .translations
        .into_iter()
        .map(|t| t.translated_text)
        .collect())
}

fn extract_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => format!("HTTP {}: {}", status.as_u16(), err.error.message),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => {
            let snippet: String = body.trim().chars().take(200).collect();
            format!("HTTP {}: {}", status.as_u16(), snippet)
        }
    }
}
