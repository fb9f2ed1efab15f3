//! Provider access for Botsmith: a Gemini capability client and a
//! fallback invoker that rotates across candidate models.
//!
//! The [`TextGenerator`] trait is the seam between the two: the client
//! knows how to issue one `generateContent` call against one named model,
//! the [`FallbackInvoker`] decides which models to try and how failures
//! are classified.
//!
//! ```text
//! services → FallbackInvoker (rotation, classification) → GeminiClient → REST
//! ```

#![warn(clippy::all)]

pub mod client;
pub mod invoker;

pub use client::{ChatMessage, FailureKind, GeminiClient, GenerateContent, ProviderFailure, TextGenerator};
pub use invoker::{FallbackInvoker, Generated, InvokeError};
