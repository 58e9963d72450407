//! Viewport width → calendar layout.

use calview_core::ViewportSettings;

use crate::types::{ToolbarItem, ToolbarLayout, ViewKind};

/// Layout class derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn is_mobile(&self) -> bool {
        matches!(self, DeviceClass::Mobile)
    }
}

/// Width thresholds. Each threshold is inclusive on the wider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    pub tablet_min_width: u32,
    pub desktop_min_width: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            tablet_min_width: 768,
            desktop_min_width: 1024,
        }
    }
}

impl From<ViewportSettings> for Breakpoints {
    fn from(settings: ViewportSettings) -> Self {
        Self {
            tablet_min_width: settings.tablet_min_width,
            desktop_min_width: settings.desktop_min_width,
        }
    }
}

impl Breakpoints {
    pub fn classify(&self, width: u32) -> DeviceClass {
        if width < self.tablet_min_width {
            DeviceClass::Mobile
        } else if width < self.desktop_min_width {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Display configuration for one viewport width. Never stored; recomputed
/// on every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub device: DeviceClass,
    pub initial_view: ViewKind,
    pub toolbar: ToolbarLayout,
    /// `None` means unlimited
    pub max_events_per_cell: Option<u32>,
    pub aspect_ratio: f32,
}

/// Layout for `width` with the default breakpoints.
pub fn compute_viewport_config(width: u32) -> ViewportConfig {
    compute_viewport_config_with(width, &Breakpoints::default())
}

/// Layout for `width` with explicit breakpoints.
pub fn compute_viewport_config_with(width: u32, breakpoints: &Breakpoints) -> ViewportConfig {
    let device = breakpoints.classify(width);

    match device {
        DeviceClass::Mobile => ViewportConfig {
            device,
            initial_view: ViewKind::ListWeek,
            toolbar: ToolbarLayout {
                left: vec![vec![ToolbarItem::Prev, ToolbarItem::Next]],
                center: vec![vec![ToolbarItem::Title]],
                right: vec![vec![ToolbarItem::Today]],
            },
            max_events_per_cell: Some(2),
            aspect_ratio: 1.0,
        },
        DeviceClass::Tablet => ViewportConfig {
            device,
            initial_view: ViewKind::DayGridMonth,
            toolbar: full_toolbar(vec![ToolbarItem::View(ViewKind::DayGridMonth)]),
            max_events_per_cell: None,
            aspect_ratio: 1.2,
        },
        DeviceClass::Desktop => ViewportConfig {
            device,
            initial_view: ViewKind::DayGridMonth,
            toolbar: full_toolbar(vec![
                ToolbarItem::View(ViewKind::DayGridMonth),
                ToolbarItem::View(ViewKind::TimeGridWeek),
            ]),
            max_events_per_cell: None,
            aspect_ratio: 1.35,
        },
    }
}

fn full_toolbar(views: Vec<ToolbarItem>) -> ToolbarLayout {
    ToolbarLayout {
        left: vec![
            vec![ToolbarItem::Prev, ToolbarItem::Next],
            vec![ToolbarItem::Today],
        ],
        center: vec![vec![ToolbarItem::Title]],
        right: vec![views],
    }
}
