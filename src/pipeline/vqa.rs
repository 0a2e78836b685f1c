//! VQA engine — answers natural-language questions about an image via a
//! hosted pre-trained vision-language model.
//!
//! `load` verifies the named model is fetchable with the configured
//! credential, retrying once anonymously before surfacing the failure.
//! The returned [`ModelHandle`] is cached per session and reused; one
//! `answer` call is issued per selected question per analysis run.

use base64::Engine as _;
use serde_json::{json, Value};

use super::AnalysisError;
use crate::config::RemoteConfig;

/// Seam for the vision-language model, so the orchestrator and tests can
/// run against a stub.
pub trait VqaModel: Send + Sync {
    /// Answer one question about the image. Pure with respect to
    /// (image bytes, question) up to the model's own reproducibility.
    fn answer(&self, image_bytes: &[u8], question: &str) -> Result<String, AnalysisError>;
}

/// Loader for the hosted VQA model.
pub struct HfVqaClient {
    http: reqwest::blocking::Client,
    hub_base: String,
    api_base: String,
    model: String,
}

/// A loaded, ready-to-query model. Holds the resolved credential mode
/// (the configured token, or none after the anonymous retry).
#[derive(Debug)]
pub struct ModelHandle {
    http: reqwest::blocking::Client,
    endpoint: String,
    credential: Option<String>,
}

impl HfVqaClient {
    /// Build a client from remote configuration. Must be called off the
    /// async runtime (blocking reqwest).
    pub fn new(cfg: &RemoteConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            hub_base: cfg.hub_base.trim_end_matches('/').to_string(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            model: cfg.vqa_model.clone(),
        })
    }

    /// Load the model: verify the weights are fetchable under the given
    /// credential. A credentialed failure is retried once anonymously;
    /// if that also fails the error surfaces to the caller and analysis
    /// cannot proceed.
    pub fn load(&self, credential: Option<&str>) -> Result<ModelHandle, AnalysisError> {
        match self.check_fetchable(credential) {
            Ok(()) => Ok(self.handle(credential)),
            Err(e) if credential.is_some() => {
                tracing::warn!(model = %self.model, error = %e, "credentialed model load failed, retrying anonymously");
                self.check_fetchable(None)
                    .map_err(|e| AnalysisError::ModelLoad(e.to_string()))?;
                Ok(self.handle(None))
            }
            Err(e) => Err(AnalysisError::ModelLoad(e.to_string())),
        }
    }

    fn handle(&self, credential: Option<&str>) -> ModelHandle {
        ModelHandle {
            http: self.http.clone(),
            endpoint: format!("{}/models/{}", self.api_base, self.model),
            credential: credential.map(str::to_string),
        }
    }

    fn check_fetchable(&self, credential: Option<&str>) -> Result<(), AnalysisError> {
        let url = format!("{}/api/models/{}", self.hub_base, self.model);
        let mut req = self.http.get(&url);
        if let Some(token) = credential {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl VqaModel for ModelHandle {
    fn answer(&self, image_bytes: &[u8], question: &str) -> Result<String, AnalysisError> {
        let _span = tracing::info_span!(
            "vqa_answer",
            question = %question,
            image_size = image_bytes.len(),
        )
        .entered();

        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let body = json!({
            "inputs": {
                "image": encoded,
                "question": question,
            }
        });

        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.credential {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;
        parse_answer(&value)
    }
}

/// Extract the answer string from the inference response: an array whose
/// first element carries an `answer` field, or a bare object with one.
fn parse_answer(value: &Value) -> Result<String, AnalysisError> {
    let candidate = match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    candidate
        .and_then(|v| v.get("answer"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AnalysisError::ResponseParsing(format!("no answer field in response: {value}"))
        })
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener};

    use super::*;

    /// Minimal hub stub: answers `connections` requests, choosing the
    /// status line by whether the request carried an Authorization header.
    fn spawn_hub(connections: usize, status_for: fn(bool) -> &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming().take(connections) {
                let mut stream = stream.unwrap();
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&buf[..n]);
                }
                let authed = String::from_utf8_lossy(&head)
                    .to_lowercase()
                    .contains("\nauthorization:");
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}",
                    status_for(authed)
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        addr
    }

    fn stub_config(addr: SocketAddr) -> RemoteConfig {
        RemoteConfig {
            hub_base: format!("http://{addr}"),
            api_base: format!("http://{addr}"),
            vqa_model: "acme/test-vqa".into(),
            credential: Some("secret-token".into()),
            timeout_secs: 5,
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn credentialed_load_failure_retries_anonymously() {
        let addr = spawn_hub(2, |authed| {
            if authed {
                "401 Unauthorized"
            } else {
                "200 OK"
            }
        });
        let cfg = stub_config(addr);
        let client = HfVqaClient::new(&cfg).unwrap();

        let handle = client.load(cfg.credential.as_deref()).unwrap();
        assert!(handle.credential.is_none());
    }

    #[test]
    fn credentialed_load_success_keeps_credential() {
        let addr = spawn_hub(1, |_| "200 OK");
        let cfg = stub_config(addr);
        let client = HfVqaClient::new(&cfg).unwrap();

        let handle = client.load(cfg.credential.as_deref()).unwrap();
        assert_eq!(handle.credential.as_deref(), Some("secret-token"));
    }

    #[test]
    fn load_fails_when_anonymous_retry_is_also_rejected() {
        let addr = spawn_hub(2, |_| "401 Unauthorized");
        let cfg = stub_config(addr);
        let client = HfVqaClient::new(&cfg).unwrap();

        let err = client.load(cfg.credential.as_deref()).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(_)));
    }

    #[test]
    fn parses_answer_from_array_response() {
        let value = json!([{"answer": "cardiomegaly", "score": 0.91}]);
        assert_eq!(parse_answer(&value).unwrap(), "cardiomegaly");
    }

    #[test]
    fn parses_answer_from_object_response() {
        let value = json!({"answer": "no"});
        assert_eq!(parse_answer(&value).unwrap(), "no");
    }

    #[test]
    fn missing_answer_field_is_a_parse_error() {
        let value = json!([{"label": "x"}]);
        assert!(matches!(
            parse_answer(&value),
            Err(AnalysisError::ResponseParsing(_))
        ));
    }

    #[test]
    fn empty_array_is_a_parse_error() {
        assert!(parse_answer(&json!([])).is_err());
    }
}
