//! Core of a prompt-driven image studio backed by Gemini image models.
//!
//! [`gemini::ImageClient`] turns a prompt (optionally with an image) into a
//! single `generateContent` call and normalizes the reply. [`session::Studio`]
//! holds the creative session a front end renders from, and
//! [`app::CreativeApp`] gates that session behind an identity provider.

pub mod app;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod session;

pub use app::{CreativeApp, IdentityProvider, MockIdentityProvider, User};
pub use config::{GeminiConfig, StudioConfig, MAX_ATTACHMENT_BYTES};
pub use error::{ModelError, Result, StudioError, ValidationError};
pub use gemini::{GeminiClient, HttpBackend, ImageClient, ModelBackend, ScriptedBackend};
pub use models::*;
pub use session::{Attachment, Phase, Studio, View};
