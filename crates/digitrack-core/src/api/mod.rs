//! REST API client module for the MRF DigiTrack service.
//!
//! This module provides the `ApiClient` for authenticating and for
//! fetching/submitting intake, sorting, sales, user, and report data.
//!
//! The API uses JWT bearer token authentication obtained through the
//! `/auth/login` endpoint; the token is read from the shared session
//! store on every request.

pub mod client;
pub mod error;

pub use client::{ApiClient, DateRange};
pub use error::ApiError;
