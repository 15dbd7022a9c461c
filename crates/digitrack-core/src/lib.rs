//! Core library for the MRF DigiTrack terminal client.
//!
//! Provides the REST API client, session and credential handling, data
//! models, the local cache, and configuration. The TUI crate sits on top
//! of this; nothing in here draws to a terminal.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
