//! Defaults for the event scheduling form next to the calendar.

use chrono::{Duration, NaiveDateTime};

use crate::host::Host;

/// Length of the default booking window.
pub const DEFAULT_WINDOW_HOURS: i64 = 2;

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// `(start, end)` values for `datetime-local` inputs: `now` and two hours later,
/// at minute precision.
pub fn schedule_form_defaults(now: NaiveDateTime) -> (String, String) {
    let end = now + Duration::hours(DEFAULT_WINDOW_HOURS);
    (
        now.format(INPUT_FORMAT).to_string(),
        end.format(INPUT_FORMAT).to_string(),
    )
}

/// Fill the `start` and `end` inputs when present. Returns how many were set.
pub fn prefill_schedule_fields(host: &dyn Host, now: NaiveDateTime) -> usize {
    let (start, end) = schedule_form_defaults(now);

    [("start", start), ("end", end)]
        .iter()
        .filter(|(name, value)| host.set_field_value(name, value))
        .count()
}
