//! # liftmap
//!
//! Prompt-driven workout log with a body-part calendar heatmap.
//!
//! This crate provides:
//! - SQLite persistence for workouts, daily history and settings
//! - A pure aggregator that folds daily history into a 365-day heatmap grid
//! - A recorder that turns a generated exercise plan into stored records
//! - An HTTP client for the remote workout planner
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use liftmap::{BodyPart, Exercise, GeneratedPlan, WorkoutStore, aggregate_history};
//! use liftmap::recorder::record_generated_workout;
//!
//! let mut store = WorkoutStore::in_memory().unwrap();
//! store.initialize_settings().unwrap();
//!
//! let plan = GeneratedPlan {
//!     exercises: vec![Exercise::new("e1", "Bench Press", BodyPart::Chest)],
//!     notes: None,
//! };
//! let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
//! record_generated_workout(&mut store, "upper body", plan, now).unwrap();
//!
//! let history = store.get_workout_history().unwrap();
//! let grid = aggregate_history(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), &history);
//! assert_eq!(grid.active_days(), 1);
//! ```

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrackerError};

// Domain types
pub mod types;
pub use types::{
    BodyPart, Exercise, HistoryEntry, NO_ACTIVITY_COLOR, SETTINGS_ID, Theme, UserSettings,
    Workout, distinct_body_parts,
};

// Runtime configuration
pub mod config;
pub use config::TrackerConfig;

// SQLite persistence
pub mod migrations;
pub mod persistence;
pub use persistence::{StoreCounts, WorkoutStore};

// Heatmap aggregation
pub mod heatmap;
pub use heatmap::{
    HEATMAP_DAYS, HeatmapDay, HeatmapGrid, HeatmapWeek, MonthLabel, aggregate_history,
    load_heatmap,
};

// HTTP client for the workout planner
pub mod http;
pub use http::{GeneratedPlan, GenerationClient};

// Plan -> Workout + History
pub mod recorder;
pub use recorder::{RecordedWorkout, generate_and_record, record_generated_workout};

// Prompt form and workout page flows
pub mod session;
pub use session::{PromptSession, WorkoutView, load_workout_view};

/// Install the stderr logger used by the binary. `RUST_LOG` overrides the
/// default `info` filter. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
