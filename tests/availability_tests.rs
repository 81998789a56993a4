// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly availability editor tests.

use curapets::models::availability::DAYS_FIELD;
use curapets::models::{AvailabilityEditor, AvailabilityError, TimeSlot, Weekday};

#[test]
fn test_no_days_selected_is_rejected() {
    let editor = AvailabilityEditor::new();
    let errors = editor.validate();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[DAYS_FIELD], "At least one available day is required");
}

#[test]
fn test_from_must_precede_to() {
    let mut editor = AvailabilityEditor::new();
    editor.toggle_day(Weekday::Monday);
    editor.set_range(Weekday::Monday, "10:00", "09:00").unwrap();

    let errors = editor.validate();
    assert_eq!(
        errors["time_Monday"],
        "'From' time must be earlier than 'To' time on Monday"
    );
}

#[test]
fn test_deselected_day_is_not_submitted() {
    let mut editor = AvailabilityEditor::new();
    editor.toggle_day(Weekday::Monday);
    editor.set_range(Weekday::Monday, "08:00", "12:00").unwrap();

    editor.toggle_day(Weekday::Friday);
    editor.set_range(Weekday::Friday, "09:00", "17:00").unwrap();
    assert!(!editor.toggle_day(Weekday::Friday));

    assert!(editor.validate().is_empty());
    let submission = editor.to_submission();
    assert_eq!(submission.available_days, vec![Weekday::Monday]);
    assert!(!submission.available_times.contains_key(&Weekday::Friday));

    // Reselecting starts over without the old range
    assert!(editor.toggle_day(Weekday::Friday));
    assert!(editor.range(Weekday::Friday).is_none());
}

#[test]
fn test_set_range_requires_selected_day() {
    let mut editor = AvailabilityEditor::new();
    assert_eq!(
        editor.set_range(Weekday::Saturday, "09:00", "11:00"),
        Err(AvailabilityError::DayNotSelected(Weekday::Saturday))
    );
}

#[test]
fn test_ranges_only_for_selected_days_under_any_sequence() {
    let mut editor = AvailabilityEditor::new();
    // Fixed-seed LCG so the sequence is reproducible
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (state >> 33) as usize
    };

    for _ in 0..500 {
        let day = Weekday::ALL[next() % Weekday::ALL.len()];
        if next() % 2 == 0 {
            editor.toggle_day(day);
        } else {
            let from = next() % 23;
            let result = editor.set_range(day, &format!("{}:00", from), &format!("{}:30", from + 1));
            assert_eq!(result.is_ok(), editor.is_selected(day));
        }

        for with_range in editor.days_with_ranges() {
            assert!(editor.is_selected(with_range), "{} has a range but is not selected", with_range);
        }
    }

    let submission = editor.to_submission();
    for day in submission.available_times.keys() {
        assert!(submission.available_days.contains(day));
    }
}

#[test]
fn test_profile_slots_round_into_editor() {
    let days = vec!["Tuesday".to_string(), "Thursday".to_string()];
    let times = [(
        "Tuesday".to_string(),
        vec![TimeSlot::new("07:45", "15:15")],
    )]
    .into_iter()
    .collect();

    let editor = AvailabilityEditor::from_profile(&days, &times);

    assert_eq!(
        editor.selected_days().collect::<Vec<_>>(),
        vec![Weekday::Tuesday, Weekday::Thursday]
    );
    // Thursday is selected but has no hours yet
    let errors = editor.validate();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("time_Thursday"));
}
