//! EduAI marketing site and Live Demo.
//!
//! The demo lets a visitor enter text, a media URL, or a local file and
//! toggle between the original content and an AI-enhanced version: an
//! explanation from Gemini and an illustration from DALL-E, generated
//! concurrently.

pub mod ai;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod media;
pub mod web;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
