// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Doctor availability editing model.
//!
//! Keeps the selected days and the per-day time range consistent while a
//! doctor edits their schedule:
//! - a day has a range entry only while it is selected
//! - each selected day holds at most one `from`/`to` range
//! - times are `HH:MM`, compared as minutes since midnight, no overnight ranges
//!
//! The backend accepts a list of slots per day; this editor only ever
//! authors one.

use super::FieldErrors;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Field key for the "no day selected" error.
pub const DAYS_FIELD: &str = "available_days";

/// Day of the week, serialized with the backend's capitalized names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Form field key for this day's time range.
    pub fn time_field(&self) -> String {
        format!("time_{}", self.as_str())
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|day| {
                let name = day.as_str().to_ascii_lowercase();
                lower == name || (lower.len() == 3 && name.starts_with(&lower))
            })
            .ok_or_else(|| format!("unknown weekday '{}'", s.trim()))
    }
}

/// Wire shape of one slot: `{"from": "09:00", "to": "17:00"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl TimeSlot {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
        }
    }
}

/// A validated range in minutes since midnight, `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: u16,
    pub to: u16,
}

impl TimeRange {
    /// Parse and check a slot; `None` when either end is malformed or `from >= to`.
    pub fn from_slot(slot: &TimeSlot) -> Option<Self> {
        let from = parse_hhmm(&slot.from)?;
        let to = parse_hhmm(&slot.to)?;
        (from < to).then_some(Self { from, to })
    }

    /// Both ends are bookable.
    pub fn contains(&self, minutes: u16) -> bool {
        self.from <= minutes && minutes <= self.to
    }
}

/// Parse `HH:MM` (one or two hour digits, two minute digits) into minutes since midnight.
pub fn parse_hhmm(raw: &str) -> Option<u16> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.bytes().all(|b| b.is_ascii_digit())
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Format minutes since midnight as zero-padded `HH:MM`.
pub fn format_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Caller errors that are invariant violations rather than user input problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("{0} is not a selected day; select it before setting its hours")]
    DayNotSelected(Weekday),
}

/// Body fragment sent to `PUT /api/doctorprofiles/me/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySubmission {
    pub available_days: Vec<Weekday>,
    pub available_times: BTreeMap<Weekday, Vec<TimeSlot>>,
}

/// Selected days plus one optional range per selected day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityEditor {
    selected: BTreeSet<Weekday>,
    ranges: BTreeMap<Weekday, TimeSlot>,
}

impl AvailabilityEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the editor from a fetched profile.
    ///
    /// Unknown day names are skipped; only the first slot of each selected
    /// day is kept and ranges for unselected days are dropped.
    pub fn from_profile(days: &[String], times: &BTreeMap<String, Vec<TimeSlot>>) -> Self {
        let mut editor = Self::new();

        for raw in days {
            match raw.parse::<Weekday>() {
                Ok(day) => {
                    editor.selected.insert(day);
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring unknown available day"),
            }
        }

        for (raw, slots) in times {
            let Ok(day) = raw.parse::<Weekday>() else {
                tracing::warn!(day = %raw, "Ignoring time slots for unknown day");
                continue;
            };
            if !editor.selected.contains(&day) {
                tracing::debug!(day = %day, "Dropping stale time slots for unselected day");
                continue;
            }
            if slots.len() > 1 {
                tracing::debug!(day = %day, count = slots.len(), "Keeping first of several slots");
            }
            if let Some(first) = slots.first() {
                editor.ranges.insert(day, first.clone());
            }
        }

        editor
    }

    /// Toggle a day. Returns whether the day is selected afterwards.
    ///
    /// Deselecting drops the day's range; selecting starts it with no range.
    pub fn toggle_day(&mut self, day: Weekday) -> bool {
        if self.selected.remove(&day) {
            self.ranges.remove(&day);
            false
        } else {
            self.selected.insert(day);
            true
        }
    }

    /// Store or replace the range of a selected day.
    pub fn set_range(&mut self, day: Weekday, from: &str, to: &str) -> Result<(), AvailabilityError> {
        if !self.selected.contains(&day) {
            return Err(AvailabilityError::DayNotSelected(day));
        }
        self.ranges.insert(day, TimeSlot::new(from, to));
        Ok(())
    }

    pub fn is_selected(&self, day: Weekday) -> bool {
        self.selected.contains(&day)
    }

    /// Selected days in week order.
    pub fn selected_days(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.selected.iter().copied()
    }

    pub fn range(&self, day: Weekday) -> Option<&TimeSlot> {
        self.ranges.get(&day)
    }

    /// Days that currently carry a range entry.
    pub fn days_with_ranges(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.ranges.keys().copied()
    }

    /// Check the schedule before submit.
    ///
    /// Returns field-keyed messages; an empty map means the schedule is valid.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.selected.is_empty() {
            errors.insert(
                DAYS_FIELD.to_string(),
                "At least one available day is required".to_string(),
            );
            return errors;
        }

        for day in &self.selected {
            let message = match self.ranges.get(day) {
                None => Some(format!("Time slot for {} is incomplete", day)),
                Some(slot) if slot.from.is_empty() || slot.to.is_empty() => {
                    Some(format!("Time slot for {} is incomplete", day))
                }
                Some(slot) => match (parse_hhmm(&slot.from), parse_hhmm(&slot.to)) {
                    (Some(from), Some(to)) if from >= to => Some(format!(
                        "'From' time must be earlier than 'To' time on {}",
                        day
                    )),
                    (Some(_), Some(_)) => None,
                    _ => Some(format!("Time for {} must be in HH:MM format", day)),
                },
            };

            if let Some(message) = message {
                errors.insert(day.time_field(), message);
            }
        }

        errors
    }

    /// Wire payload: only selected days, each with a single-element slot list.
    pub fn to_submission(&self) -> AvailabilitySubmission {
        let available_times = self
            .ranges
            .iter()
            .filter(|(day, _)| self.selected.contains(*day))
            .map(|(day, slot)| {
                let slot = match TimeRange::from_slot(slot) {
                    Some(range) => TimeSlot {
                        from: format_hhmm(range.from),
                        to: format_hhmm(range.to),
                    },
                    None => slot.clone(),
                };
                (*day, vec![slot])
            })
            .collect();

        AvailabilitySubmission {
            available_days: self.selected.iter().copied().collect(),
            available_times,
        }
    }
}
