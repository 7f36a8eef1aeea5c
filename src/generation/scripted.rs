//! Scripted generation backend for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::backend::{GenerationBackend, GenerationOptions};
use super::error::GenerationError;

/// Backend that replays a fixed script of responses, one per call.
///
/// Once the script runs out every further call fails with
/// `EmptyResponse`.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Models requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        model: &str,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(model.to_string());
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        match next {
            Some(result) => result,
            None => Err(GenerationError::EmptyResponse {
                model: model.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_then_runs_dry() {
        let backend = ScriptedBackend::new(vec![Ok("[]".into())]);
        let options = GenerationOptions::for_model("m", json!({}));

        assert_eq!(backend.generate("m", "p", &options).await.unwrap(), "[]");
        assert!(matches!(
            backend.generate("n", "p", &options).await,
            Err(GenerationError::EmptyResponse { .. })
        ));
        assert_eq!(backend.calls(), vec!["m", "n"]);
    }
}
