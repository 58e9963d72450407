//! Event, range and view types.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CalendarError;

/// Event identifier as delivered by the endpoint (numeric database ids or strings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

/// One calendar entry as delivered by the events endpoint.
///
/// Timestamps are kept as the endpoint sent them; the rendering library owns
/// timezone handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub extended_props: Map<String, Value>,
    /// Top-level fields the record format does not name (e.g. `description`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventRecord {
    /// Free-text description, read from `extendedProps` first and then from
    /// the top level. Empty strings count as missing.
    pub fn description(&self) -> Option<&str> {
        [&self.extended_props, &self.extra]
            .into_iter()
            .filter_map(|props| props.get("description").and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
    }

    /// Best-effort parse of `start` for ordering and display.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.start)
    }

    /// Best-effort parse of `end`.
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        self.end.as_deref().and_then(parse_timestamp)
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Half-open interval `[start, end)` of requested events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CalendarError> {
        if end <= start {
            return Err(CalendarError::InvalidRange(format!(
                "end {} is not after start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// `start` as sent in the query string.
    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `end` as sent in the query string.
    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_param(), self.end_param())
    }
}

/// Named views of the rendering library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    /// Agenda list for one week
    ListWeek,
    /// Month grid
    DayGridMonth,
    /// Week grid with time slots
    TimeGridWeek,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::ListWeek => "listWeek",
            ViewKind::DayGridMonth => "dayGridMonth",
            ViewKind::TimeGridWeek => "timeGridWeek",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single header toolbar control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarItem {
    Prev,
    Next,
    Today,
    Title,
    View(ViewKind),
}

impl ToolbarItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolbarItem::Prev => "prev",
            ToolbarItem::Next => "next",
            ToolbarItem::Today => "today",
            ToolbarItem::Title => "title",
            ToolbarItem::View(view) => view.as_str(),
        }
    }
}

/// Header toolbar sections. Each section is a list of groups; items in a
/// group are rendered joined together, groups are separated by a gap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolbarLayout {
    pub left: Vec<Vec<ToolbarItem>>,
    pub center: Vec<Vec<ToolbarItem>>,
    pub right: Vec<Vec<ToolbarItem>>,
}

impl ToolbarLayout {
    /// Section string in the rendering library's notation, e.g. `"prev,next today"`.
    pub fn section_notation(section: &[Vec<ToolbarItem>]) -> String {
        section
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(ToolbarItem::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether any section offers a switch to `view`.
    pub fn offers_view(&self, view: ViewKind) -> bool {
        [&self.left, &self.center, &self.right]
            .into_iter()
            .flatten()
            .flatten()
            .any(|item| *item == ToolbarItem::View(view))
    }
}
