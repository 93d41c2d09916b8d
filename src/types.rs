//! Domain types shared by the store, the recorder and the heatmap.
//!
//! Everything here serializes with camelCase field names so the JSON
//! columns and the generation endpoint share one wire form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

/// Color of a heatmap cell with no recorded activity.
pub const NO_ACTIVITY_COLOR: &str = "#1f2937";

/// Fixed id of the singleton settings record.
pub const SETTINGS_ID: &str = "default";

// ============================================================================
// Body Parts
// ============================================================================

/// Muscle-group tag used to categorize exercises and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyPart {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    Cardio,
    FullBody,
}

impl BodyPart {
    /// Every body part, in legend order.
    pub const ALL: [BodyPart; 8] = [
        BodyPart::Chest,
        BodyPart::Back,
        BodyPart::Shoulders,
        BodyPart::Arms,
        BodyPart::Legs,
        BodyPart::Core,
        BodyPart::Cardio,
        BodyPart::FullBody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Chest => "chest",
            BodyPart::Back => "back",
            BodyPart::Shoulders => "shoulders",
            BodyPart::Arms => "arms",
            BodyPart::Legs => "legs",
            BodyPart::Core => "core",
            BodyPart::Cardio => "cardio",
            BodyPart::FullBody => "full-body",
        }
    }

    /// Heatmap color for this body part.
    pub fn color(&self) -> &'static str {
        match self {
            BodyPart::Chest => "#ef4444",     // red
            BodyPart::Back => "#3b82f6",      // blue
            BodyPart::Shoulders => "#f59e0b", // amber
            BodyPart::Arms => "#8b5cf6",      // violet
            BodyPart::Legs => "#10b981",      // emerald
            BodyPart::Core => "#ec4899",      // pink
            BodyPart::Cardio => "#06b6d4",    // cyan
            BodyPart::FullBody => "#6366f1",  // indigo
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyPart {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .into_iter()
            .find(|bp| bp.as_str() == s)
            .ok_or_else(|| TrackerError::validation(format!("Unknown body part '{}'", s)))
    }
}

/// Distinct body parts in order of first appearance.
pub fn distinct_body_parts<I>(parts: I) -> Vec<BodyPart>
where
    I: IntoIterator<Item = BodyPart>,
{
    let mut seen = Vec::new();
    for part in parts {
        if !seen.contains(&part) {
            seen.push(part);
        }
    }
    seen
}

// ============================================================================
// Exercises and Workouts
// ============================================================================

/// A single exercise within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Assigned by the recorder; whatever the planner sent is replaced.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub body_part: BodyPart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Weight in pounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, name: impl Into<String>, body_part: BodyPart) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body_part,
            sets: None,
            reps: None,
            weight: None,
            duration: None,
            notes: None,
        }
    }

    /// One-line prescription, e.g. `3 sets × 10 reps · 135 lbs`.
    ///
    /// Zero-valued fields are treated as absent.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let (Some(sets), Some(reps)) = (self.sets, self.reps) {
            if sets > 0 && reps > 0 {
                parts.push(format!("{} sets × {} reps", sets, reps));
            }
        }
        if let Some(weight) = self.weight.filter(|w| *w > 0.0) {
            parts.push(format!("{} lbs", weight));
        }
        if let Some(duration) = self.duration.filter(|d| *d > 0) {
            parts.push(format!("{} min", duration));
        }
        parts.join(" · ")
    }
}

/// A dated collection of exercises generated from one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub exercises: Vec<Exercise>,
    /// Free-form notes the planner attached to the whole plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// Distinct body parts trained by this workout, first-seen order.
    pub fn body_parts(&self) -> Vec<BodyPart> {
        distinct_body_parts(self.exercises.iter().map(|e| e.body_part))
    }
}

// ============================================================================
// History
// ============================================================================

/// Per-calendar-day record of trained body parts and contributing workouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub date: NaiveDate,
    pub body_parts: Vec<BodyPart>,
    pub workout_ids: Vec<String>,
}

impl HistoryEntry {
    /// Entry for `date` with duplicates in `body_parts` collapsed.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        body_parts: Vec<BodyPart>,
        workout_ids: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            body_parts: distinct_body_parts(body_parts),
            workout_ids,
        }
    }

    /// Canonical id for the entry owning a calendar day.
    pub fn id_for_day(date: NaiveDate) -> String {
        format!("history-{}", date.format("%Y-%m-%d"))
    }

    /// Fold another entry for the same day into this one.
    ///
    /// Body parts are unioned in first-seen order; workout ids are appended
    /// unless already referenced.
    pub fn merge(&mut self, other: &HistoryEntry) {
        for part in &other.body_parts {
            if !self.body_parts.contains(part) {
                self.body_parts.push(*part);
            }
        }
        for id in &other.workout_ids {
            if !self.workout_ids.contains(id) {
                self.workout_ids.push(id.clone());
            }
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

}

impl FromStr for Theme {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(TrackerError::validation(format!("Unknown theme '{}'", s))),
        }
    }
}

/// Singleton user preferences record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub id: String,
    pub theme: Theme,
    pub api_endpoint: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            theme: Theme::Dark,
            api_endpoint: "/api".to_string(),
        }
    }
}
