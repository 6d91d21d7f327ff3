#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use creche_attendance::api::CrecheApi;
use creche_attendance::api::dto::{
    CreatePresenceRequest, LoginRequest, LoginResponse, PresenceQuery, UpdatePresenceRequest, User,
};
use creche_attendance::attendance::AttendanceBoard;
use creche_attendance::error::ApiError;
use creche_attendance::models::{
    AttendanceRecord, AttendanceStatus, AttendanceView, ClassRef, Child, PersonRef, StaffMember,
};
use creche_attendance::notify::Notifier;
use creche_attendance::error::StoreError;
use creche_attendance::preferences::{MemoryPreferenceStore, PreferenceStore, ViewPreferences};

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchChildren,
    FetchStaff,
    FetchAttendance(PresenceQuery),
    Create(CreatePresenceRequest),
    Update(String, UpdatePresenceRequest),
}

/// In-memory api. Writes yield once before answering so concurrent handlers interleave.
/// Queued delays hold back the next read or write to order overlapping calls.
#[derive(Default)]
pub struct FakeApi {
    pub children: Mutex<Vec<Child>>,
    pub staff: Mutex<Vec<StaffMember>>,
    pub records: Mutex<Vec<AttendanceRecord>>,
    pub calls: Mutex<Vec<ApiCall>>,
    write_failures: Mutex<VecDeque<ApiError>>,
    read_delays: Mutex<VecDeque<Duration>>,
    write_delays: Mutex<VecDeque<Duration>>,
    pub fail_reads: AtomicBool,
    pub fail_roster: AtomicBool,
    next_id: AtomicUsize,
}

impl FakeApi {
    pub fn with_roster(children: Vec<Child>, staff: Vec<StaffMember>) -> Arc<Self> {
        let api = Self::default();
        *api.children.lock().unwrap() = children;
        *api.staff.lock().unwrap() = staff;
        Arc::new(api)
    }

    pub fn fail_next_write(&self, err: ApiError) {
        self.write_failures.lock().unwrap().push_back(err);
    }

    pub fn delay_next_read(&self, delay: Duration) {
        self.read_delays.lock().unwrap().push_back(delay);
    }

    pub fn delay_next_write(&self, delay: Duration) {
        self.write_delays.lock().unwrap().push_back(delay);
    }

    pub fn seed(&self, record: AttendanceRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ApiCall::Create(_) | ApiCall::Update(_, _)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_write_failure(&self) -> Option<ApiError> {
        self.write_failures.lock().unwrap().pop_front()
    }

    async fn hold(queue: &Mutex<VecDeque<Duration>>) {
        let delay = queue.lock().unwrap().pop_front();
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
    }
}

#[async_trait]
impl CrecheApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            token: "fake-token".to_string(),
            user: User {
                id: "u1".to_string(),
                nom: "Admin".to_string(),
                prenom: String::new(),
                email: request.email.clone(),
                role: None,
            },
        })
    }

    async fn fetch_children(&self) -> Result<Vec<Child>, ApiError> {
        self.record(ApiCall::FetchChildren);
        if self.fail_roster.load(Ordering::SeqCst) {
            return Err(ApiError::Network("down".to_string()));
        }
        Ok(self.children.lock().unwrap().clone())
    }

    async fn fetch_staff(&self) -> Result<Vec<StaffMember>, ApiError> {
        self.record(ApiCall::FetchStaff);
        if self.fail_roster.load(Ordering::SeqCst) {
            return Err(ApiError::Network("down".to_string()));
        }
        Ok(self.staff.lock().unwrap().clone())
    }

    async fn fetch_attendance(
        &self,
        query: &PresenceQuery,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.record(ApiCall::FetchAttendance(query.clone()));
        Self::hold(&self.read_delays).await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ApiError::Server);
        }
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| query.date.is_none_or(|d| r.date == d))
            .filter(|r| match (&query.enfant_id, &r.person) {
                (Some(id), PersonRef::Child(child)) => id == child,
                (Some(_), PersonRef::Staff(_)) => false,
                (None, _) => true,
            })
            .filter(|r| match (&query.personnel_id, &r.person) {
                (Some(id), PersonRef::Staff(staff)) => id == staff,
                (Some(_), PersonRef::Child(_)) => false,
                (None, _) => true,
            })
            .cloned()
            .collect())
    }

    async fn create_attendance(
        &self,
        request: &CreatePresenceRequest,
    ) -> Result<AttendanceRecord, ApiError> {
        self.record(ApiCall::Create(request.clone()));
        Self::hold(&self.write_delays).await;
        if let Some(err) = self.take_write_failure() {
            return Err(err);
        }

        let person = match (&request.enfant_id, &request.personnel_id) {
            (Some(id), None) => PersonRef::Child(id.clone()),
            (None, Some(id)) => PersonRef::Staff(id.clone()),
            _ => return Err(ApiError::Validation("référence invalide".to_string())),
        };
        let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d")
            .map_err(|_| ApiError::Unprocessable("date invalide".to_string()))?;

        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.person == person && r.date == date) {
            return Err(ApiError::Conflict("Présence déjà existante".to_string()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = AttendanceRecord {
            id: format!("rec-{}", n),
            person,
            date,
            status: Some(request.statut),
            remarks: request.remarques.clone(),
            created_at: Some("2024-05-01T08:00:00Z".to_string()),
            updated_at: Some("2024-05-01T08:00:00Z".to_string()),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update_attendance(
        &self,
        id: &str,
        request: &UpdatePresenceRequest,
    ) -> Result<AttendanceRecord, ApiError> {
        self.record(ApiCall::Update(id.to_string(), request.clone()));
        Self::hold(&self.write_delays).await;
        if let Some(err) = self.take_write_failure() {
            return Err(err);
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::NotFound)?;
        record.status = Some(request.statut);
        record.updated_at = Some("2024-05-01T09:00:00Z".to_string());
        Ok(record.clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<(String, String)>>,
    pub errors: Mutex<Vec<(String, String)>>,
    pub confirm_answer: bool,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<(String, String)> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn success(&self, title: &str, message: &str) {
        self.successes
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn error(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.confirm_answer
    }
}

/// Preference store whose writes take `delay` to complete.
pub struct SlowStore {
    pub inner: MemoryPreferenceStore,
    pub delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryPreferenceStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl PreferenceStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn child(id: &str, class_id: Option<&str>) -> Child {
    Child {
        id: id.to_string(),
        nom: format!("Nom-{}", id),
        prenom: format!("Prenom-{}", id),
        statut: "ACTIF".to_string(),
        classe_id: class_id.map(str::to_string),
        classe: None,
    }
}

pub fn child_in(id: &str, class: &ClassRef) -> Child {
    Child {
        classe_id: Some(class.id.clone()),
        classe: Some(class.clone()),
        ..child(id, None)
    }
}

pub fn staff_member(id: &str) -> StaffMember {
    StaffMember {
        id: id.to_string(),
        nom: format!("Nom-{}", id),
        prenom: format!("Prenom-{}", id),
        statut: "ACTIF".to_string(),
        poste: None,
    }
}

pub fn record(
    id: &str,
    person: PersonRef,
    day: &str,
    status: Option<AttendanceStatus>,
) -> AttendanceRecord {
    AttendanceRecord {
        id: id.to_string(),
        person,
        date: date(day),
        status,
        remarks: None,
        created_at: None,
        updated_at: None,
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryPreferenceStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub board: AttendanceBoard,
}

/// Board on `day` with its rosters loaded and the day's attendance fetched.
pub async fn harness(api: Arc<FakeApi>, day: &str, view: AttendanceView) -> Harness {
    let store = Arc::new(MemoryPreferenceStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let board = AttendanceBoard::new(
        api.clone(),
        store.clone(),
        notifier.clone(),
        ViewPreferences::new(date(day), view),
    );
    board.load_roster().await;
    board.refresh().await;
    Harness {
        api,
        store,
        notifier,
        board,
    }
}
