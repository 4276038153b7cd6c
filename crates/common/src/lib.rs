//! Common utilities and shared types for agora-rs.
//!
//! This crate provides foundational components used across all agora-rs
//! crates:
//!
//! - **Configuration**: Application settings via [`AppConfig`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`],
//!   plus collected [`ValidationErrors`]
//! - **Poll templates**: Per-poll-type behaviour via [`PollTemplateRegistry`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Locale labels**: Poll type and option labels for notification rendering
//!
//! # Example
//!
//! ```
//! use agora_common::{IdGenerator, PollTemplateRegistry};
//!
//! let registry = PollTemplateRegistry::builtin();
//! assert!(registry.is_known("proposal"));
//!
//! let id_gen = IdGenerator::new();
//! let id = id_gen.generate();
//! assert_eq!(id.len(), 26);
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod locale;
pub mod templates;

pub use config::AppConfig;
pub use error::{AppError, AppResult, FieldError, ValidationErrors};
pub use id::IdGenerator;
pub use locale::{option_label, poll_type_label};
pub use templates::{ChartType, PollTemplate, PollTemplateRegistry};
