//! Model fallback invoker.
//!
//! Drives the capability client across an ordered list of candidate
//! models. Quota and rate-limit failures advance the rotation; any other
//! failure propagates immediately. There is no inter-attempt delay and no
//! same-model retry: fallback is an immediate rotation across models.

use crate::client::{GenerateContent, ProviderFailure, TextGenerator};
use botsmith_common::error::Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Successful generation: the text and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub model: String,
}

/// The single error a failed `generate` call surfaces.
#[derive(Debug, ThisError)]
pub enum InvokeError {
    /// Empty candidate list or other setup problem; raised before any call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The first non-retryable failure, or the last retryable one after
    /// every candidate was exhausted.
    #[error(transparent)]
    Provider(ProviderFailure),
}

impl From<InvokeError> for Error {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::Configuration(msg) => Self::Config(msg),
            InvokeError::Provider(failure) => {
                if failure.is_retryable() {
                    Self::RateLimited(failure.to_string())
                } else {
                    Self::External(failure.to_string())
                }
            }
        }
    }
}

/// Rotates a [`TextGenerator`] across candidate models in preference order.
pub struct FallbackInvoker {
    generator: Arc<dyn TextGenerator>,
    candidates: Vec<String>,
    timeout: Duration,
}

impl FallbackInvoker {
    /// Create an invoker over the given candidates (preference order,
    /// duplicates dropped keeping the first occurrence).
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        candidates: Vec<String>,
        timeout: Duration,
    ) -> Self {
        let mut ordered: Vec<String> = Vec::with_capacity(candidates.len());
        for model in candidates {
            if !model.is_empty() && !ordered.contains(&model) {
                ordered.push(model);
            }
        }

        Self {
            generator,
            candidates: ordered,
            timeout,
        }
    }

    /// Candidate models in rotation order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Try each candidate model until one succeeds.
    ///
    /// Returns the first success together with the model that produced it;
    /// later candidates are never tried. Retryable failures advance the
    /// rotation, and the last one is propagated if every candidate fails
    /// that way. A non-retryable failure propagates immediately. Each call
    /// is bounded by the configured timeout; a timed-out call is fatal.
    pub async fn generate(&self, content: &GenerateContent) -> Result<Generated, InvokeError> {
        if self.candidates.is_empty() {
            return Err(InvokeError::Configuration(
                "No Gemini models configured. Set GEMINI_MODEL or GEMINI_MODELS.".to_string(),
            ));
        }

        let mut last_failure: Option<ProviderFailure> = None;

        for model in &self.candidates {
            let outcome =
                match tokio::time::timeout(self.timeout, self.generator.generate(model, content))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderFailure::timed_out(model, self.timeout)),
                };

            match outcome {
                Ok(text) => {
                    tracing::info!(%model, "Generation succeeded");
                    return Ok(Generated {
                        text,
                        model: model.clone(),
                    });
                }
                Err(failure) => {
                    tracing::warn!(%model, kind = ?failure.kind, %failure, "Generation failed");
                    if !failure.is_retryable() {
                        return Err(InvokeError::Provider(failure));
                    }
                    last_failure = Some(failure);
                }
            }
        }

        match last_failure {
            Some(failure) => Err(InvokeError::Provider(failure)),
            None => Err(InvokeError::Configuration(
                "Unable to select a Gemini model.".to_string(),
            )),
        }
    }
}
