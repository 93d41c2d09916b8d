//! Turns a generated plan into a stored Workout and its calendar entry.

use chrono::{DateTime, Utc};
use log::info;
use uuid::Uuid;

use crate::error::{Result, TrackerError};
use crate::http::{GeneratedPlan, GenerationClient};
use crate::persistence::WorkoutStore;
use crate::types::{HistoryEntry, Workout};

/// A workout as persisted, together with the day's history entry after
/// any same-day merge.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWorkout {
    pub workout: Workout,
    pub history: HistoryEntry,
}

/// Trimmed prompt, or a validation error when nothing is left.
pub fn validate_prompt(prompt: &str) -> Result<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation("Please enter a workout goal"));
    }
    Ok(trimmed)
}

/// Build the Workout and History entry for a plan without touching storage.
///
/// Exercises keep the planner's order and are given `{workout_id}-{index}`
/// ids. Planner ids are not unique across plans, and may repeat within one,
/// so they are replaced.
pub fn build_workout(
    prompt: &str,
    plan: GeneratedPlan,
    now: DateTime<Utc>,
) -> Result<(Workout, HistoryEntry)> {
    let prompt = validate_prompt(prompt)?;
    let workout_id = Uuid::new_v4().to_string();

    let exercises = plan
        .exercises
        .into_iter()
        .enumerate()
        .map(|(index, mut exercise)| {
            exercise.id = format!("{}-{}", workout_id, index);
            exercise
        })
        .collect();

    let workout = Workout {
        id: workout_id,
        date: now,
        prompt: Some(prompt.to_string()),
        exercises,
        notes: plan.notes,
        completed: false,
        created_at: now,
        updated_at: now,
    };

    let day = now.date_naive();
    let entry = HistoryEntry::new(
        HistoryEntry::id_for_day(day),
        day,
        workout.body_parts(),
        vec![workout.id.clone()],
    );

    Ok((workout, entry))
}

/// Persist a generated plan: one new Workout plus the day's History entry,
/// written in a single transaction.
pub fn record_generated_workout(
    store: &mut WorkoutStore,
    prompt: &str,
    plan: GeneratedPlan,
    now: DateTime<Utc>,
) -> Result<RecordedWorkout> {
    let (workout, entry) = build_workout(prompt, plan, now)?;
    let history = store.record_workout(&workout, &entry)?;

    info!(
        "[Recorder] Workout {} with {} exercises recorded for {}",
        workout.id,
        workout.exercises.len(),
        history.date
    );
    Ok(RecordedWorkout { workout, history })
}

/// Validate, call the planner, then record the result.
///
/// The prompt is checked before any network traffic.
pub async fn generate_and_record(
    client: &GenerationClient,
    store: &mut WorkoutStore,
    prompt: &str,
) -> Result<RecordedWorkout> {
    let prompt = validate_prompt(prompt)?;
    let plan = client.generate_workout(prompt).await?;
    record_generated_workout(store, prompt, plan, Utc::now())
}
