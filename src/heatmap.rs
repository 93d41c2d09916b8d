//! Body-part calendar heatmap.
//!
//! Folds the flat list of [`HistoryEntry`] records into a fixed 365-day grid
//! laid out in week columns (Sunday at the top), plus the month labels that
//! sit above the columns.
//!
//! [`aggregate_history`] is a pure function of `today` and the entries, so
//! the same inputs always serialize to the same bytes.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::persistence::WorkoutStore;
use crate::types::{BodyPart, HistoryEntry, NO_ACTIVITY_COLOR};

/// Number of days shown, ending today.
pub const HEATMAP_DAYS: usize = 365;

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub color: &'static str,
    pub body_parts: Vec<BodyPart>,
    pub tooltip: String,
}

/// One column of the grid. Only the first column can have padding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapWeek {
    /// Empty cells above the first day so it lands on its weekday row
    pub leading_padding: u32,
    pub days: Vec<HeatmapDay>,
}

/// Month name placed above a week column.
///
/// A window that opens in the first week of a month shows that month name at
/// both ends, one year apart; `year` tells the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    /// Short month name, e.g. "Jan"
    pub month: String,
    pub year: i32,
    /// Week column index the label sits over
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapGrid {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub weeks: Vec<HeatmapWeek>,
    pub month_labels: Vec<MonthLabel>,
}

impl HeatmapGrid {
    /// All cells, oldest first.
    pub fn days(&self) -> impl Iterator<Item = &HeatmapDay> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    /// Number of days with at least one body part trained.
    pub fn active_days(&self) -> usize {
        self.days().filter(|d| !d.body_parts.is_empty()).count()
    }
}

/// The `HEATMAP_DAYS` consecutive dates ending at `today`, oldest first.
pub fn heatmap_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..HEATMAP_DAYS as i64)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Display color for a day: the first recorded body part wins.
pub fn day_color(entry: Option<&HistoryEntry>) -> &'static str {
    entry
        .and_then(|e| e.body_parts.first())
        .map(|part| part.color())
        .unwrap_or(NO_ACTIVITY_COLOR)
}

pub fn day_tooltip(date: NaiveDate, entry: Option<&HistoryEntry>) -> String {
    let day = date.format("%Y-%m-%d");
    match entry {
        Some(e) if !e.body_parts.is_empty() => {
            let parts: Vec<&str> = e.body_parts.iter().map(|p| p.as_str()).collect();
            format!("{}: {}", day, parts.join(", "))
        }
        _ => format!("{}: No workout", day),
    }
}

/// Split dates into week columns, closing a column after each Saturday.
/// The trailing partial week is kept.
pub fn week_groups(dates: &[NaiveDate]) -> Vec<Vec<NaiveDate>> {
    let mut weeks = Vec::new();
    let mut current = Vec::with_capacity(7);

    for (index, date) in dates.iter().enumerate() {
        current.push(*date);
        if date.weekday() == Weekday::Sat || index == dates.len() - 1 {
            weeks.push(std::mem::replace(&mut current, Vec::with_capacity(7)));
        }
    }

    weeks
}

/// Month labels for the first week (day-of-month <= 7) of each new month.
pub fn month_labels(dates: &[NaiveDate]) -> Vec<MonthLabel> {
    let mut labels = Vec::new();
    let mut current_month = None;

    for (index, date) in dates.iter().enumerate() {
        if current_month != Some(date.month()) && date.day() <= 7 {
            current_month = Some(date.month());
            labels.push(MonthLabel {
                month: date.format("%b").to_string(),
                year: date.year(),
                offset: index / 7,
            });
        }
    }

    labels
}

/// Build the heatmap grid for the year ending at `today`.
///
/// Entries outside the window are ignored. If two entries share a day the
/// later one in `entries` wins.
pub fn aggregate_history(today: NaiveDate, entries: &[HistoryEntry]) -> HeatmapGrid {
    let dates = heatmap_dates(today);

    let by_day: HashMap<NaiveDate, &HistoryEntry> =
        entries.iter().map(|entry| (entry.date, entry)).collect();

    let weeks: Vec<HeatmapWeek> = week_groups(&dates)
        .into_iter()
        .enumerate()
        .map(|(week_index, week)| {
            let leading_padding = if week_index == 0 {
                week[0].weekday().num_days_from_sunday()
            } else {
                0
            };

            let days = week
                .into_iter()
                .map(|date| {
                    let entry = by_day.get(&date).copied();
                    HeatmapDay {
                        date,
                        color: day_color(entry),
                        body_parts: entry.map(|e| e.body_parts.clone()).unwrap_or_default(),
                        tooltip: day_tooltip(date, entry),
                    }
                })
                .collect();

            HeatmapWeek {
                leading_padding,
                days,
            }
        })
        .collect();

    let grid = HeatmapGrid {
        start: dates[0],
        end: today,
        weeks,
        month_labels: month_labels(&dates),
    };

    debug!(
        "[Heatmap] {} entries -> {} weeks, {} active days",
        entries.len(),
        grid.weeks.len(),
        grid.active_days()
    );

    grid
}

/// Fetch all history and aggregate it. Storage failures are returned as-is.
pub fn load_heatmap(store: &WorkoutStore, today: NaiveDate) -> Result<HeatmapGrid> {
    let entries = store.get_workout_history()?;
    Ok(aggregate_history(today, &entries))
}

/// Every body part with its color, in legend order.
pub fn legend() -> Vec<(BodyPart, &'static str)> {
    BodyPart::ALL.iter().map(|p| (*p, p.color())).collect()
}
