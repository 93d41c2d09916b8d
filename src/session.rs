//! User-facing flows: submitting a prompt and loading the workout view.
//!
//! Both catch every failure and turn it into a short message, so the caller
//! is always left in an interactive state.

use chrono::NaiveDate;
use log::warn;

use crate::error::{Result, TrackerError};
use crate::heatmap::{self, HeatmapGrid};
use crate::http::GenerationClient;
use crate::persistence::WorkoutStore;
use crate::recorder::{self, RecordedWorkout};
use crate::types::Workout;

/// Raises a loading flag and lowers it again when dropped, including when
/// the future holding it is cancelled.
struct LoadingFlag<'a>(&'a mut bool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        LoadingFlag(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// State behind the prompt form.
#[derive(Debug, Default)]
pub struct PromptSession {
    is_loading: bool,
    error: Option<String>,
    failure: Option<TrackerError>,
    last_recorded: Option<RecordedWorkout>,
}

impl PromptSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message from the most recent failed submission.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The error behind [`PromptSession::error`], for callers that need its kind.
    pub fn failure(&self) -> Option<&TrackerError> {
        self.failure.as_ref()
    }

    pub fn last_recorded(&self) -> Option<&RecordedWorkout> {
        self.last_recorded.as_ref()
    }

    /// Validate, generate and record. The loading flag is cleared on every
    /// path, including when this future is dropped before completing; on
    /// failure the message is kept in [`PromptSession::error`].
    pub async fn submit(
        &mut self,
        client: &GenerationClient,
        store: &mut WorkoutStore,
        prompt: &str,
    ) -> Option<&RecordedWorkout> {
        self.error = None;
        self.failure = None;
        self.last_recorded = None;

        if let Err(e) = recorder::validate_prompt(prompt) {
            self.error = Some(e.user_message());
            self.failure = Some(e);
            return None;
        }

        let result = {
            let _loading = LoadingFlag::raise(&mut self.is_loading);
            recorder::generate_and_record(client, store, prompt).await
        };

        match result {
            Ok(recorded) => {
                self.last_recorded = Some(recorded);
                self.last_recorded.as_ref()
            }
            Err(e) => {
                warn!("[PromptSession] Submission failed: {}", e);
                self.error = Some(e.user_message());
                self.failure = Some(e);
                None
            }
        }
    }
}

/// Data behind the workout page: one workout plus the year heatmap.
#[derive(Debug, Clone)]
pub struct WorkoutView {
    pub workout: Option<Workout>,
    pub heatmap: HeatmapGrid,
}

/// Load the requested workout (or the latest one when `workout_id` is
/// `None`) and the heatmap ending at `today`.
///
/// An unknown id yields `workout: None` rather than an error.
pub fn load_workout_view(
    store: &WorkoutStore,
    workout_id: Option<&str>,
    today: NaiveDate,
) -> Result<WorkoutView> {
    let heatmap = heatmap::load_heatmap(store, today)?;
    let workout = match workout_id {
        Some(id) => store.get_workout(id)?,
        None => store.latest_workout()?,
    };
    Ok(WorkoutView { workout, heatmap })
}
