//! Product studio - AI-assisted product imagery on Vertex AI
//!
//! Turns a product description and/or reference photo into styled marketing
//! images, edits existing images, and animates products into short videos.
//! Session state, favorites and local export are kept in-process.

pub mod ai;
pub mod app;
pub mod enhance;
pub mod error;
pub mod favorites;
pub mod image;
pub mod models;
pub mod poller;
pub mod prompts;
pub mod session;
pub mod shell;

pub use error::{Error, Result};
