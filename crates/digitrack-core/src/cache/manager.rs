use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{SortedWaste, User, WasteCategory, WasteIntake, WasteSale};

/// Consider cache stale after 1 hour.
/// Intake and sales lists change a few times a day at most.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Ages of the main list caches, for the status bar.
#[derive(Debug, Clone, Default)]
pub struct CacheAges {
    pub intakes: Option<String>,
    pub sales: Option<String>,
    pub users: Option<String>,
}

impl CacheAges {
    /// The freshest age string, for a one-line "Updated ..." display.
    pub fn last_updated(&self) -> String {
        self.intakes
            .as_ref()
            .or(self.sales.as_ref())
            .or(self.users.as_ref())
            .cloned()
            .unwrap_or_else(|| "never".to_string())
    }
}

/// Stores fetched lists as JSON files so the app has something to show
/// before the first refresh completes (or without a network at all).
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== Intakes =====

    pub fn load_intakes(&self) -> Result<Option<CachedData<Vec<WasteIntake>>>> {
        self.load("intakes")
    }

    pub fn save_intakes(&self, intakes: &[WasteIntake]) -> Result<()> {
        self.save("intakes", &intakes)
    }

    // ===== Sorted waste (per intake) =====

    pub fn load_sorted(&self, intake_id: &str) -> Result<Option<CachedData<Vec<SortedWaste>>>> {
        self.load(&format!("sorted_{}", intake_id))
    }

    pub fn save_sorted(&self, intake_id: &str, sorted: &[SortedWaste]) -> Result<()> {
        self.save(&format!("sorted_{}", intake_id), &sorted)
    }

    // ===== Sales =====

    pub fn load_sales(&self) -> Result<Option<CachedData<Vec<WasteSale>>>> {
        self.load("sales")
    }

    pub fn save_sales(&self, sales: &[WasteSale]) -> Result<()> {
        self.save("sales", &sales)
    }

    // ===== Users =====

    pub fn load_users(&self) -> Result<Option<CachedData<Vec<User>>>> {
        self.load("users")
    }

    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.save("users", &users)
    }

    // ===== Categories =====

    pub fn load_categories(&self) -> Result<Option<CachedData<Vec<WasteCategory>>>> {
        self.load("categories")
    }

    pub fn save_categories(&self, categories: &[WasteCategory]) -> Result<()> {
        self.save("categories", &categories)
    }

    // ===== Cache age information =====

    /// Helper to load cache and log errors without failing
    fn load_age<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> Option<String> {
        match loader() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            intakes: self.load_age("intakes", || self.load_intakes()),
            sales: self.load_age("sales", || self.load_sales()),
            users: self.load_age("users", || self.load_users()),
        }
    }

    /// Helper to check staleness and log errors without failing
    fn check_stale<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> bool {
        match loader() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for staleness check");
                true
            }
        }
    }

    pub fn any_stale(&self) -> bool {
        self.check_stale("intakes", || self.load_intakes())
            || self.check_stale("sales", || self.load_sales())
            || self.check_stale("users", || self.load_users())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        let sale: Vec<WasteSale> = serde_json::from_str(
            r#"[{
                "_id": "665f1c2ab1d2c3d4e5f6071a",
                "mrf_id": "MRF-KL-014",
                "category": "PET",
                "weight": 120.0,
                "unit_price": 30.0,
                "total_amount": 3600.0,
                "buyer_name": "Green Traders",
                "date": "2026-02-03T10:00:00Z",
                "operator_id": "665f1c2ab1d2c3d4e5f60718"
            }]"#,
        )
        .unwrap();

        cache.save_sales(&sale).unwrap();
        let loaded = cache.load_sales().unwrap().expect("cached");
        assert_eq!(loaded.data.len(), 1);
        assert_eq!(loaded.data[0].buyer_name, "Green Traders");
        assert!(!loaded.is_stale());
    }

    #[test]
    fn missing_cache_is_none_and_stale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        assert!(cache.load_intakes().unwrap().is_none());
        assert!(cache.any_stale());
    }

    #[test]
    fn age_display_buckets() {
        let fresh = CachedData::new(());
        assert_eq!(fresh.age_display(), "just now");

        let old = CachedData {
            data: (),
            cached_at: Utc::now() - Duration::minutes(90),
        };
        assert_eq!(old.age_display(), "1h ago");
        assert!(old.is_stale());
    }
}
