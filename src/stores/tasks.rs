//! Task store: cached tasks plus priority- and deadline-ordered views.

use crate::http::QueryParams;
use crate::services::TaskService;
use crate::stores::normalize::normalize;
use crate::stores::{remove_by_id, shallow_merge, upsert_by_id, StoreState};
use crate::types::{ApiError, Result, Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::warn;

const DEFAULT_UPCOMING_LIMIT: usize = 5;

pub struct TaskStore {
    service: TaskService,
    state: Mutex<StoreState<Task>>,
}

impl TaskStore {
    pub fn new(service: TaskService) -> Self {
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

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().collection.clone()
    }

    // ============= Actions =============

    /// Full refresh. Failures are absorbed into the store error and an empty
    /// sequence is returned.
    pub async fn fetch_tasks(&self, params: &QueryParams) -> Vec<Task> {
        self.state.lock().begin();

        let outcome = match self.service.list(params).await {
            Ok(response) => response.into_result(),
            Err(err) => Err(err),
        };

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(body) => {
                state.collection = normalize(&body, "tasks").entities;
                state.collection.clone()
            }
            Err(err) => {
                warn!(%err, "failed to fetch tasks");
                state.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    /// Fetch a single task and reconcile it into the collection.
    pub async fn fetch_task(&self, id: i64) -> Result<Task> {
        let body = self.service.get(id).await?.into_result()?;
        let task: Task =
            serde_json::from_value(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        upsert_by_id(&mut self.state.lock().collection, task.clone());
        Ok(task)
    }

    /// Create a task; the new entity is prepended to the collection.
    pub async fn add_task(&self, task_data: &Value) -> Result<Task> {
        {
            let mut state = self.state.lock();
            state.begin();
        }

        let outcome = async {
            let body = self.service.create(task_data).await?.into_result()?;
            serde_json::from_value::<Task>(body)
                .map_err(|e| ApiError::MalformedResponse(e.to_string()))
        }
        .await;

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(task) => {
                state.collection.insert(0, task.clone());
                Ok(task)
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Shallow-merge the server's partial response into the cached task.
    /// Returns `None` without error when the task is not cached.
    pub async fn update_task(&self, id: i64, task_data: &Value) -> Result<Option<Task>> {
        {
            let mut state = self.state.lock();
            state.begin();
        }

        let outcome = async {
            self.service.update(id, task_data).await?.into_result()
        }
        .await;

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(patch) => match state.collection.iter().position(|t| t.id == id) {
                Some(index) => {
                    let merged = shallow_merge(&state.collection[index], &patch)?;
                    state.collection[index] = merged.clone();
                    Ok(Some(merged))
                }
                None => Ok(None),
            },
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn delete_task(&self, id: i64) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.begin();
        }

        let outcome = async { self.service.delete(id).await?.into_result() }.await;

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(_) => {
                remove_by_id(&mut state.collection, id);
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Status change goes through the regular update path.
    pub async fn change_task_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>> {
        self.update_task(id, &json!({ "status": status })).await
    }

    /// Mark a task completed on the server, then patch only the lifecycle
    /// sub-fields of the cached entity.
    pub async fn complete_task(&self, id: i64) -> Result<()> {
        self.service.complete(id).await?.into_result()?;

        let mut state = self.state.lock();
        if let Some(task) = state.collection.iter_mut().find(|t| t.id == id) {
            task.status = Some(TaskStatus::Completed);
            task.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Assign a task on the server, then merge the server's view of the
    /// assignment into the cached entity.
    pub async fn assign_task(&self, id: i64, user_id: i64) -> Result<()> {
        let patch = self.service.assign(id, user_id).await?.into_result()?;

        let mut state = self.state.lock();
        if let Some(index) = state.collection.iter().position(|t| t.id == id) {
            if patch.is_object() {
                state.collection[index] = shallow_merge(&state.collection[index], &patch)?;
            }
        }
        Ok(())
    }

    // ============= Derived Views =============

    pub fn task_by_id(&self, id: i64) -> Option<Task> {
        self.state.lock().collection.iter().find(|t| t.id == id).cloned()
    }

    /// Active and pending tasks (records without a status count as active),
    /// ordered by priority rank, then ascending due date.
    pub fn active_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .state
            .lock()
            .collection
            .iter()
            .filter(|t| is_open(t))
            .cloned()
            .collect();

        tasks.sort_by(|a, b| {
            priority_rank(a)
                .cmp(&priority_rank(b))
                .then_with(|| due_key(a).cmp(&due_key(b)))
        });
        tasks
    }

    /// Completed tasks, most recently completed first.
    pub fn completed_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .state
            .lock()
            .collection
            .iter()
            .filter(|t| t.status == Some(TaskStatus::Completed))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        tasks
    }

    /// Open tasks due at or after now, ascending by due date, truncated.
    pub fn upcoming_tasks(&self, limit: Option<usize>) -> Vec<Task> {
        let now = Utc::now();
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);

        let mut tasks: Vec<Task> = self
            .state
            .lock()
            .collection
            .iter()
            .filter(|t| {
                matches!(t.status, Some(TaskStatus::Active) | Some(TaskStatus::Pending))
                    && t.due_date.map(|due| due >= now).unwrap_or(false)
            })
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.due_date);
        tasks.truncate(limit);
        tasks
    }
}

fn is_open(task: &Task) -> bool {
    matches!(
        task.status,
        Some(TaskStatus::Active) | Some(TaskStatus::Pending) | None
    )
}

/// Missing priority sorts after low.
fn priority_rank(task: &Task) -> u8 {
    task.priority.map(TaskPriority::rank).unwrap_or(3)
}

/// Missing due date sorts last among equal priorities.
fn due_key(task: &Task) -> (bool, Option<DateTime<Utc>>) {
    (task.due_date.is_none(), task.due_date)
}
