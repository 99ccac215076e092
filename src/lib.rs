//! rednote: prompt construction and generation requests for
//! Xiaohongshu (RED) style notes.
//!
//! A caller fills in a [`GenerationRequest`] (theme, style, length,
//! category and an API credential) and hands it to a
//! [`ContentGenerator`]. The generator renders a fixed system turn and
//! a per-request user turn, posts them to an OpenAI-compatible
//! chat-completion endpoint and returns either the model's text
//! verbatim or a classified [`Failure`].
//!
//! ```no_run
//! use rednote::{ContentGenerator, GeneratorConfig, GenerationRequest};
//! use rednote::{Category, Length, Style};
//!
//! let generator = ContentGenerator::new(&GeneratorConfig::default())?;
//! let request = GenerationRequest::new(
//!     "通勤穿搭", Style::Seeding, Length::Medium, Category::Beauty, "sk-...",
//! );
//! match generator.generate_blocking(&request) {
//!     rednote::GenerationResult::Success { text } => println!("{}", text),
//!     rednote::GenerationResult::Failure(failure) => eprintln!("{}", failure),
//! }
//! # Ok::<(), rednote::Error>(())
//! ```
//!
//! Session history is not kept here; see [`history::History`].

pub mod error;
pub mod config;
pub mod chat;
pub mod prompt;
pub mod request;
pub mod retry;
pub mod client;
pub mod history;

pub use client::ContentGenerator;
pub use config::{GeneratorConfig, RetryConfig};
pub use error::{Error, FailureKind};
pub use history::{History, HistoryEntry};
pub use request::{
  Category
, Credential
, Failure
, GenerationRequest
, GenerationResult
, Length
, Style
};
pub use retry::RetryPolicy;
