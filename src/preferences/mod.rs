mod sqlite;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use crate::error::StoreError;
use crate::models::AttendanceView;

pub use sqlite::SqlitePreferenceStore;

pub const SELECTED_DATE_KEY: &str = "attendance_selected_date";
pub const SELECTED_VIEW_KEY: &str = "attendance_selected_view";
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Client-local key/value storage, the counterpart of browser local storage.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Last date and roster the attendance board showed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPreferences {
    pub date: NaiveDate,
    pub view: AttendanceView,
}

impl ViewPreferences {
    pub fn new(date: NaiveDate, view: AttendanceView) -> Self {
        Self { date, view }
    }

    /// Missing, unreadable or malformed values fall back to `today` and the children view.
    pub async fn load(store: &dyn PreferenceStore, today: NaiveDate) -> Self {
        let date = match store.get(SELECTED_DATE_KEY).await {
            Ok(Some(raw)) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").unwrap_or_else(|_| {
                warn!("Ignoring stored attendance date {:?}", raw);
                today
            }),
            Ok(None) => today,
            Err(e) => {
                warn!("Failed to read stored attendance date: {}", e);
                today
            }
        };

        let view = match store.get(SELECTED_VIEW_KEY).await {
            Ok(Some(raw)) => raw.parse::<AttendanceView>().unwrap_or_else(|e| {
                warn!("{}", e);
                AttendanceView::default()
            }),
            Ok(None) => AttendanceView::default(),
            Err(e) => {
                warn!("Failed to read stored attendance view: {}", e);
                AttendanceView::default()
            }
        };

        Self { date, view }
    }

    pub async fn save_date(store: &dyn PreferenceStore, date: NaiveDate) {
        let value = date.format("%Y-%m-%d").to_string();
        if let Err(e) = store.set(SELECTED_DATE_KEY, &value).await {
            warn!("Failed to persist attendance date: {}", e);
        }
    }

    pub async fn save_view(store: &dyn PreferenceStore, view: AttendanceView) {
        if let Err(e) = store.set(SELECTED_VIEW_KEY, view.as_str()).await {
            warn!("Failed to persist attendance view: {}", e);
        }
    }
}
