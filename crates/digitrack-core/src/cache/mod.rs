//! Local caching module for fast startup and offline viewing.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! fetched DigiTrack data locally. Data is cached in JSON format and
//! considered stale after 60 minutes.
//!
//! Cached data types include:
//! - Waste intakes and per-intake sorted records
//! - Sales
//! - Users
//! - Waste categories

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData};
