use chrono::NaiveDate;
use creche_attendance::attendance::{ActionKey, PendingActions};
use creche_attendance::config::AppConfig;
use creche_attendance::models::{AttendanceStatus, AttendanceView};
use creche_attendance::preferences::{
    MemoryPreferenceStore, PreferenceStore, SELECTED_DATE_KEY, SELECTED_VIEW_KEY,
    SqlitePreferenceStore, ViewPreferences,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

async fn sqlite_store() -> SqlitePreferenceStore {
    let config = AppConfig {
        prefs_url: "sqlite::memory:".to_string(),
        ..AppConfig::default()
    };
    SqlitePreferenceStore::open(&config)
        .await
        .expect("Failed to open in-memory preference store")
}

#[tokio::test]
async fn test_sqlite_store_set_get_overwrite_remove() {
    let store = sqlite_store().await;

    assert_eq!(store.get("auth_token").await.unwrap(), None);

    store.set("auth_token", "abc").await.unwrap();
    assert_eq!(store.get("auth_token").await.unwrap(), Some("abc".to_string()));

    store.set("auth_token", "def").await.unwrap();
    assert_eq!(store.get("auth_token").await.unwrap(), Some("def".to_string()));

    store.remove("auth_token").await.unwrap();
    assert_eq!(store.get("auth_token").await.unwrap(), None);

    // removing a missing key is not an error
    store.remove("auth_token").await.unwrap();
}

#[tokio::test]
async fn test_view_preferences_default_to_today_and_children() {
    let store = MemoryPreferenceStore::new();
    let prefs = ViewPreferences::load(&store, today()).await;

    assert_eq!(prefs, ViewPreferences::new(today(), AttendanceView::Children));
}

#[tokio::test]
async fn test_view_preferences_round_trip_through_sqlite() {
    let store = sqlite_store().await;
    let day = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();

    ViewPreferences::save_date(&store, day).await;
    ViewPreferences::save_view(&store, AttendanceView::Staff).await;

    assert_eq!(
        store.get(SELECTED_DATE_KEY).await.unwrap(),
        Some("2024-04-30".to_string())
    );
    assert_eq!(
        store.get(SELECTED_VIEW_KEY).await.unwrap(),
        Some("staff".to_string())
    );

    let prefs = ViewPreferences::load(&store, today()).await;
    assert_eq!(prefs, ViewPreferences::new(day, AttendanceView::Staff));
}

#[tokio::test]
async fn test_malformed_preferences_are_ignored() {
    let store = MemoryPreferenceStore::new();
    store.set(SELECTED_DATE_KEY, "30/04/2024").await.unwrap();
    store.set(SELECTED_VIEW_KEY, "parents").await.unwrap();

    let prefs = ViewPreferences::load(&store, today()).await;
    assert_eq!(prefs.date, today());
    assert_eq!(prefs.view, AttendanceView::Children);
}

#[test]
fn test_pending_key_is_released_on_drop() {
    let pending = PendingActions::new();
    let key = ActionKey::new("c1", AttendanceStatus::Present);
    assert_eq!(key.to_string(), "c1-PRESENT");

    let guard = pending.try_acquire(key.clone()).expect("first acquire");
    assert!(pending.is_pending(&key));
    assert!(pending.try_acquire(key.clone()).is_none());
    assert!(
        pending
            .try_acquire(ActionKey::new("c1", AttendanceStatus::Absent))
            .is_some()
    );

    drop(guard);
    assert!(!pending.is_pending(&key));
    assert!(pending.is_empty());
}

#[test]
fn test_stale_guard_does_not_release_reacquired_key() {
    let pending = PendingActions::new();
    let key = ActionKey::new("c1", AttendanceStatus::Present);

    let stale = pending.try_acquire(key.clone()).unwrap();
    pending.reset();
    assert!(!pending.is_pending(&key));

    let fresh = pending.try_acquire(key.clone()).unwrap();
    drop(stale);
    assert!(pending.is_pending(&key));

    drop(fresh);
    assert!(!pending.is_pending(&key));
}
