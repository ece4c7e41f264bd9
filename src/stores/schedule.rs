//! Schedule store: cached events plus calendar-oriented derived views.

use crate::http::QueryParams;
use crate::services::ScheduleService;
use crate::stores::normalize::normalize;
use crate::stores::{remove_by_id, shallow_merge, upsert_by_id, StoreState};
use crate::types::{ApiError, Result, ScheduleEvent};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

const DEFAULT_UPCOMING_LIMIT: usize = 5;

pub struct ScheduleStore {
    service: ScheduleService,
    state: Mutex<StoreState<ScheduleEvent>>,
}

impl ScheduleStore {
    pub fn new(service: ScheduleService) -> Self {
        Self {
            service,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.state.lock().collection.clone()
    }

    // ============= Actions =============

    /// Full refresh of the event collection. Failures are absorbed into the
    /// store error and an empty sequence is returned.
    pub async fn fetch_events(&self, params: &QueryParams) -> Vec<ScheduleEvent> {
        self.state.lock().begin();

        let outcome = match self.service.list(params).await {
            Ok(response) => response.into_result(),
            Err(err) => Err(err),
        };

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(body) => {
                state.collection = normalize(&body, "events").entities;
                state.collection.clone()
            }
            Err(err) => {
                warn!(%err, "failed to fetch schedule");
                state.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    /// Merge the next few upcoming events into the collection without a full
    /// refresh. Failures are absorbed and an empty sequence is returned.
    pub async fn fetch_upcoming_events(&self, limit: usize) -> Vec<ScheduleEvent> {
        let outcome = match self.service.upcoming(limit).await {
            Ok(response) => response.into_result(),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(body) => {
                let fetched = normalize::<ScheduleEvent>(&body, "events").entities;
                let mut state = self.state.lock();
                for event in fetched.iter().cloned() {
                    upsert_by_id(&mut state.collection, event);
                }
                fetched
            }
            Err(err) => {
                warn!(%err, "failed to fetch upcoming events");
                Vec::new()
            }
        }
    }

    /// Fetch a single event and reconcile it into the collection.
    pub async fn fetch_event(&self, id: i64) -> Result<ScheduleEvent> {
        let body = self.service.get(id).await?.into_result()?;
        let event: ScheduleEvent = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        upsert_by_id(&mut self.state.lock().collection, event.clone());
        Ok(event)
    }

    pub async fn create_event(&self, event_data: &Value) -> Result<ScheduleEvent> {
        let body = self.service.create(event_data).await?.into_result()?;
        let event: ScheduleEvent = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        self.state.lock().collection.insert(0, event.clone());
        Ok(event)
    }

    /// Shallow-merge the server's partial response into the cached event.
    /// Returns `None` without error when the event is not cached.
    pub async fn update_event(&self, id: i64, event_data: &Value) -> Result<Option<ScheduleEvent>> {
        let patch = self.service.update(id, event_data).await?.into_result()?;

        let mut state = self.state.lock();
        match state.collection.iter().position(|e| e.id == id) {
            Some(index) => {
                let merged = shallow_merge(&state.collection[index], &patch)?;
                state.collection[index] = merged.clone();
                Ok(Some(merged))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_event(&self, id: i64) -> Result<()> {
        self.service.delete(id).await?.into_result()?;
        remove_by_id(&mut self.state.lock().collection, id);
        Ok(())
    }

    // ============= Derived Views =============

    pub fn event_by_id(&self, id: i64) -> Option<ScheduleEvent> {
        self.state.lock().collection.iter().find(|e| e.id == id).cloned()
    }

    /// Events starting on the given calendar day (UTC).
    pub fn events_on_date(&self, date: NaiveDate) -> Vec<ScheduleEvent> {
        let day_start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        let day_end = day_start + Duration::days(1);

        self.state
            .lock()
            .collection
            .iter()
            .filter(|e| e.start_time >= day_start && e.start_time < day_end)
            .cloned()
            .collect()
    }

    /// Events overlapping the given hour window on a day: an event counts
    /// when `start < window_end && end > window_start`.
    pub fn events_in_hour(&self, date: NaiveDate, hour: u32) -> Vec<ScheduleEvent> {
        let Some(start) = date.and_hms_opt(hour, 0, 0) else {
            return Vec::new();
        };
        let window_start = Utc.from_utc_datetime(&start);
        let window_end = window_start + Duration::hours(1);

        self.state
            .lock()
            .collection
            .iter()
            .filter(|e| e.start_time < window_end && e.end_time > window_start)
            .cloned()
            .collect()
    }

    /// Events that have not yet ended, ascending by start time, truncated.
    pub fn upcoming_events(&self, limit: Option<usize>) -> Vec<ScheduleEvent> {
        let now = Utc::now();
        self.upcoming_events_at(now, limit)
    }

    fn upcoming_events_at(&self, now: DateTime<Utc>, limit: Option<usize>) -> Vec<ScheduleEvent> {
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
        let mut events: Vec<ScheduleEvent> = self
            .state
            .lock()
            .collection
            .iter()
            .filter(|e| e.end_time >= now)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        events.truncate(limit);
        events
    }
}
