//! CivicAI assistant: typed request/response contracts over a hosted
//! generative-language model.
//!
//! Each use case builds a [`request::RequestDescriptor`] (prompt, optional
//! response schema, tools), sends it with a single [`ModelClient::generate`]
//! call, and decodes the reply best-effort into the records from
//! [`civicai_shared`]. Unreadable model output becomes an empty record, never
//! an error.
//!
//! ```no_run
//! use civicai_assistant::{AssistantConfig, CitizenAssistant, GeminiClient, Language};
//!
//! # async fn demo() -> civicai_assistant::Result<()> {
//! let config = AssistantConfig::from_env()?;
//! let client = GeminiClient::new(&config)?;
//! let assistant = CitizenAssistant::new(&client);
//!
//! let result = assistant
//!     .classify_query("large pothole blocking traffic", Language::English)
//!     .await?;
//! println!("{}", result.department);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod language;
pub mod prompt;
pub mod request;
pub mod schema;
pub mod service;

pub use client::{GeminiClient, ModelClient, ModelResponse};
pub use config::{AssistantConfig, Credential};
pub use decode::{append_sources, decode, format_sources};
pub use error::{AssistantError, Result};
pub use language::Language;
pub use request::{build_request, InlineImage, Query, RequestDescriptor, UseCase};
pub use schema::{ResponseShape, Schema};
pub use service::{ChatMode, CitizenAssistant};

#[cfg(any(test, feature = "test-utils"))]
pub use client::test_support::MockModelClient;
