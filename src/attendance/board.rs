use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, warn};

use super::grouping::group_by_class;
use super::pending::{ActionKey, PendingActions};
use super::stats::AttendanceStats;
use super::{MarkOutcome, MarkedKey};
use crate::api::CrecheApi;
use crate::api::dto::{CreatePresenceRequest, PresenceQuery, UpdatePresenceRequest};
use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendanceView, ClassGroup, PersonRef, StaffMember,
};
use crate::notify::Notifier;
use crate::preferences::{PreferenceStore, ViewPreferences};

struct BoardState {
    selected_date: NaiveDate,
    view: AttendanceView,
    class_groups: Vec<ClassGroup>,
    staff: Vec<StaffMember>,
    attendance_by_person: HashMap<String, AttendanceRecord>,
    marked: HashMap<MarkedKey, HashSet<String>>,
    expanded_classes: HashMap<String, bool>,
}

impl BoardState {
    fn current_key(&self) -> MarkedKey {
        MarkedKey::new(self.selected_date, self.view)
    }

    fn roster_len(&self) -> usize {
        match self.view {
            AttendanceView::Children => self.class_groups.iter().map(|g| g.children.len()).sum(),
            AttendanceView::Staff => self.staff.len(),
        }
    }

    /// Drops everything tied to the previous (date, view).
    fn enter_context(&mut self) {
        let key = self.current_key();
        self.marked.retain(|k, _| *k == key);
        self.attendance_by_person.clear();
    }
}

/// Attendance for one date and one roster, reconciled against the api.
///
/// Methods take `&self`; state sits behind a mutex that is never held across
/// an await, so several handlers can be in flight on the same board.
pub struct AttendanceBoard {
    api: Arc<dyn CrecheApi>,
    store: Arc<dyn PreferenceStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<BoardState>,
    pending: PendingActions,
}

impl AttendanceBoard {
    pub fn new(
        api: Arc<dyn CrecheApi>,
        store: Arc<dyn PreferenceStore>,
        notifier: Arc<dyn Notifier>,
        preferences: ViewPreferences,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            state: Mutex::new(BoardState {
                selected_date: preferences.date,
                view: preferences.view,
                class_groups: Vec::new(),
                staff: Vec::new(),
                attendance_by_person: HashMap::new(),
                marked: HashMap::new(),
                expanded_classes: HashMap::new(),
            }),
            pending: PendingActions::new(),
        }
    }

    /// Restores the stored preferences, loads the rosters and the attendance
    /// of the restored date.
    pub async fn mount(
        api: Arc<dyn CrecheApi>,
        store: Arc<dyn PreferenceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let today = Local::now().date_naive();
        let preferences = ViewPreferences::load(store.as_ref(), today).await;
        let board = Self::new(api, store, notifier, preferences);
        board.load_roster().await;
        board.refresh().await;
        board
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.lock().selected_date
    }

    pub fn view(&self) -> AttendanceView {
        self.lock().view
    }

    pub fn preferences(&self) -> ViewPreferences {
        let state = self.lock();
        ViewPreferences::new(state.selected_date, state.view)
    }

    pub fn class_groups(&self) -> Vec<ClassGroup> {
        self.lock().class_groups.clone()
    }

    pub fn staff(&self) -> Vec<StaffMember> {
        self.lock().staff.clone()
    }

    pub fn roster_len(&self) -> usize {
        self.lock().roster_len()
    }

    pub fn record_of(&self, person_id: &str) -> Option<AttendanceRecord> {
        self.lock().attendance_by_person.get(person_id).cloned()
    }

    pub fn status_of(&self, person_id: &str) -> Option<AttendanceStatus> {
        self.lock()
            .attendance_by_person
            .get(person_id)
            .and_then(|r| r.status)
    }

    pub fn records(&self) -> HashMap<String, AttendanceRecord> {
        self.lock().attendance_by_person.clone()
    }

    /// Whether the person is resolved for the current date and view.
    pub fn is_marked(&self, person_id: &str) -> bool {
        let state = self.lock();
        state
            .marked
            .get(&state.current_key())
            .is_some_and(|ids| ids.contains(person_id))
    }

    pub fn marked_keys(&self) -> Vec<MarkedKey> {
        self.lock().marked.keys().copied().collect()
    }

    pub fn marked_for(&self, key: MarkedKey) -> Option<HashSet<String>> {
        self.lock().marked.get(&key).cloned()
    }

    pub fn is_pending(&self, person_id: &str, status: AttendanceStatus) -> bool {
        self.pending.is_pending(&ActionKey::new(person_id, status))
    }

    pub fn stats(&self) -> AttendanceStats {
        let state = self.lock();
        AttendanceStats::compute(state.roster_len(), state.attendance_by_person.values())
    }

    pub fn is_class_expanded(&self, group_key: &str) -> bool {
        self.lock()
            .expanded_classes
            .get(group_key)
            .copied()
            .unwrap_or(true)
    }

    pub fn toggle_class(&self, group_key: &str) {
        let mut state = self.lock();
        let expanded = state.expanded_classes.entry(group_key.to_string()).or_insert(true);
        *expanded = !*expanded;
    }

    /// Fetches both rosters, keeping active people only. A failed fetch
    /// leaves that roster empty.
    pub async fn load_roster(&self) {
        let children = match self.api.fetch_children().await {
            Ok(children) => children
                .into_iter()
                .filter(|c| c.is_active())
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!("Failed to load children: {}", e);
                Vec::new()
            }
        };

        let staff = match self.api.fetch_staff().await {
            Ok(staff) => staff
                .into_iter()
                .filter(|s| s.is_active())
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!("Failed to load staff: {}", e);
                Vec::new()
            }
        };

        let groups = group_by_class(children);
        info!(
            "Roster loaded: {} classes, {} staff",
            groups.len(),
            staff.len()
        );

        let mut state = self.lock();
        state.class_groups = groups;
        state.staff = staff;
    }

    /// Replaces the attendance map and the marked set of `date` for the
    /// active view. A failed fetch empties the map. Results arriving after
    /// the board moved to another date or view are dropped.
    pub async fn load_attendance(&self, date: NaiveDate) {
        let view = self.view();
        let result = self.api.fetch_attendance(&PresenceQuery::for_date(date)).await;

        let mut state = self.lock();
        if state.selected_date != date || state.view != view {
            debug!("Discarding attendance of {} ({}), board moved on", date, view);
            return;
        }

        let key = MarkedKey::new(date, view);
        match result {
            Ok(records) => {
                let mut by_person = HashMap::with_capacity(records.len());
                let mut marked = HashSet::new();
                for record in records.into_iter().filter(|r| r.person.view() == view) {
                    let person_id = record.person_id().to_string();
                    if record.is_marked() {
                        marked.insert(person_id.clone());
                    }
                    by_person.insert(person_id, record);
                }
                debug!(
                    "Loaded {} attendance records for {}, {} marked",
                    by_person.len(),
                    key,
                    marked.len()
                );
                state.attendance_by_person = by_person;
                state.marked.insert(key, marked);
            }
            Err(e) => {
                warn!("Failed to load attendance for {}: {}", key, e);
                state.attendance_by_person.clear();
                state.marked.remove(&key);
            }
        }
    }

    /// Reloads the selected date when the active roster is not empty.
    pub async fn refresh(&self) {
        let (date, has_roster) = {
            let state = self.lock();
            (state.selected_date, state.roster_len() > 0)
        };
        if has_roster {
            self.load_attendance(date).await;
        }
    }

    /// Creates or updates the person's record for the selected date.
    ///
    /// A second call with the same person and status while the first is in
    /// flight sends nothing. A failed write reloads the date from the api.
    pub async fn mark_attendance(&self, person_id: &str, status: AttendanceStatus) -> MarkOutcome {
        let Some(_guard) = self.pending.try_acquire(ActionKey::new(person_id, status)) else {
            debug!("Ignoring duplicate action {}-{}", person_id, status);
            return MarkOutcome::AlreadyPending;
        };

        let (date, view, existing_id) = {
            let state = self.lock();
            (
                state.selected_date,
                state.view,
                state.attendance_by_person.get(person_id).map(|r| r.id.clone()),
            )
        };

        let result = match &existing_id {
            Some(id) => {
                self.api
                    .update_attendance(id, &UpdatePresenceRequest::new(status))
                    .await
            }
            None => {
                let person = PersonRef::for_view(view, person_id);
                self.api
                    .create_attendance(&CreatePresenceRequest::new(date, status, &person))
                    .await
            }
        };

        match result {
            Ok(record) => {
                info!(
                    "Attendance {} for {} on {} ({})",
                    status,
                    person_id,
                    date,
                    if existing_id.is_some() { "updated" } else { "created" }
                );
                {
                    let mut state = self.lock();
                    if state.selected_date == date && state.view == view {
                        state
                            .marked
                            .entry(MarkedKey::new(date, view))
                            .or_default()
                            .insert(person_id.to_string());
                        state
                            .attendance_by_person
                            .insert(person_id.to_string(), record.clone());
                    }
                }
                self.notifier.success(
                    "Présence enregistrée",
                    &format!("Statut « {} » enregistré pour le {}.", status.label(), date),
                );
                MarkOutcome::Saved(record)
            }
            Err(e) => {
                error!("Failed to mark {} {} on {}: {}", person_id, status, date, e);
                self.notifier.error("Erreur", &e.to_string());
                self.load_attendance(date).await;
                MarkOutcome::Failed(e)
            }
        }
    }

    /// Sends the opposite of the person's current status.
    pub async fn flip_attendance(&self, person_id: &str) -> MarkOutcome {
        match self.status_of(person_id) {
            Some(status) => self.mark_attendance(person_id, status.opposite()).await,
            None => MarkOutcome::NotMarked,
        }
    }

    pub async fn set_date(&self, date: NaiveDate) {
        let changed = {
            let mut state = self.lock();
            let changed = state.selected_date != date;
            if changed {
                state.selected_date = date;
                state.enter_context();
                self.pending.reset();
            }
            changed
        };
        if !changed {
            return;
        }
        ViewPreferences::save_date(self.store.as_ref(), date).await;
        self.refresh().await;
    }

    pub async fn set_view(&self, view: AttendanceView) {
        let changed = {
            let mut state = self.lock();
            let changed = state.view != view;
            if changed {
                state.view = view;
                state.enter_context();
                self.pending.reset();
            }
            changed
        };
        if !changed {
            return;
        }
        ViewPreferences::save_view(self.store.as_ref(), view).await;
        self.refresh().await;
    }
}
