//! Data structures module
//!
//! Defines the value types shared by the model and the editor: note ids,
//! note rectangles, pitch-curve points and the grid configuration.

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hard cap on the number of anchors in one pitch curve.
pub const MAX_CURVE_POINTS: usize = 5;
/// Horizontal distance between an anchor and a freshly placed control handle.
pub const HANDLE_OFFSET: f32 = 20.0;
/// Minimum horizontal gap kept between an interior anchor and its neighbours.
pub const MIN_POINT_SPACING: f32 = 10.0;
/// Two note edges closer than this (in pixels) count as touching.
pub const CONNECTION_TOLERANCE: f32 = 1.0;

/// Piano ranges offered by the toolbar.
pub const PITCH_COUNT_OPTIONS: [u32; 4] = [12, 24, 36, 48];

static NOTE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub u64);

impl NoteId {
    pub fn next() -> Self {
        NoteId(NOTE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoteRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NoteRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn middle_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn middle_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// Converts to an egui rectangle translated by `origin` (screen offset of the grid).
    pub fn to_egui(&self, origin: Pos2) -> Rect {
        Rect::from_min_size(
            origin + Vec2::new(self.x, self.y),
            Vec2::new(self.width, self.height),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Outgoing handle, shapes the segment to the right of its anchor.
    Cp1,
    /// Incoming handle, shapes the segment to the left of its anchor.
    Cp2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlHandle {
    pub x: f32,
    pub y: f32,
    pub y_offset: f32,
}

impl ControlHandle {
    pub fn new(x: f32, y: f32, y_offset: f32) -> Self {
        Self { x, y, y_offset }
    }

    pub fn pos(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }
}

/// One anchor of a pitch curve together with its Bezier handles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchPoint {
    pub x: f32,
    pub y: f32,
    /// Distance from the owning note's vertical midline.
    pub y_offset: f32,
    pub cp1: Option<ControlHandle>,
    pub cp2: Option<ControlHandle>,
}

impl PitchPoint {
    pub fn new(x: f32, y: f32, y_offset: f32) -> Self {
        Self {
            x,
            y,
            y_offset,
            cp1: None,
            cp2: None,
        }
    }

    pub fn with_cp1(mut self, handle: ControlHandle) -> Self {
        self.cp1 = Some(handle);
        self
    }

    pub fn with_cp2(mut self, handle: ControlHandle) -> Self {
        self.cp2 = Some(handle);
        self
    }

    pub fn pos(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn handle(&self, kind: HandleKind) -> Option<&ControlHandle> {
        match kind {
            HandleKind::Cp1 => self.cp1.as_ref(),
            HandleKind::Cp2 => self.cp2.as_ref(),
        }
    }

    pub fn handle_mut(&mut self, kind: HandleKind) -> Option<&mut ControlHandle> {
        match kind {
            HandleKind::Cp1 => self.cp1.as_mut(),
            HandleKind::Cp2 => self.cp2.as_mut(),
        }
    }
}

/// A note: a rectangle in grid space carrying an x-ordered pitch curve.
#[derive(Clone, Debug, PartialEq)]
pub struct PitchNote {
    pub id: NoteId,
    pub rect: NoteRect,
    pub points: Vec<PitchPoint>,
}

impl PitchNote {
    pub fn new(rect: NoteRect, points: Vec<PitchPoint>) -> Self {
        Self::with_id(NoteId::next(), rect, points)
    }

    pub fn with_id(id: NoteId, rect: NoteRect, points: Vec<PitchPoint>) -> Self {
        Self { id, rect, points }
    }

    pub fn first_point(&self) -> Option<&PitchPoint> {
        self.points.first()
    }

    pub fn last_point(&self) -> Option<&PitchPoint> {
        self.points.last()
    }

    pub fn is_endpoint(&self, index: usize) -> bool {
        index == 0 || index + 1 == self.points.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub const SUPPORTED: [TimeSignature; 6] = [
        TimeSignature::new(4, 4),
        TimeSignature::new(3, 4),
        TimeSignature::new(2, 4),
        TimeSignature::new(6, 8),
        TimeSignature::new(9, 8),
        TimeSignature::new(12, 8),
    ];

    pub const fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::new(4, 4)
    }
}

/// User-facing grid settings. A [`GridConfig`] is derived from this whenever
/// any of them change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub piano_key_width: f32,
    pub pitch_count: u32,
    pub pitch_height: f32,
    pub measure_count: u32,
    pub measure_width: f32,
    pub time_signature: TimeSignature,
    pub min_note_width: f32,
    pub note_height: f32,
    pub handle_size: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            piano_key_width: 50.0,
            pitch_count: 24,
            pitch_height: 16.0,
            measure_count: 4,
            measure_width: 137.5,
            time_signature: TimeSignature::default(),
            min_note_width: 80.0,
            note_height: 20.0,
            handle_size: 8.0,
        }
    }
}

impl GridLayout {
    pub fn from_json(json: &str) -> Result<Self, io::Error> {
        serde_json::from_str(json).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid grid layout: {}", e),
            )
        })
    }

    /// Loads a layout from a JSON file; missing fields fall back to defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, io::Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, io::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Grid geometry every model and editor operation works against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub piano_key_width: f32,
    pub grid_width: f32,
    pub grid_height: f32,
    pub note_height: f32,
    pub min_note_width: f32,
    /// Pitch-row height.
    pub horizontal_snap: f32,
    /// Time-division width.
    pub vertical_snap: f32,
    pub time_divisions: u32,
    pub handle_size: f32,
}

impl GridConfig {
    pub fn from_layout(layout: &GridLayout) -> Self {
        let measure_count = layout.measure_count.max(1);
        let time_divisions = (measure_count * u32::from(layout.time_signature.numerator)).max(1);
        let grid_width = layout.piano_key_width + measure_count as f32 * layout.measure_width;
        Self {
            piano_key_width: layout.piano_key_width,
            grid_width,
            grid_height: layout.pitch_count as f32 * layout.pitch_height,
            note_height: layout.note_height,
            min_note_width: layout.min_note_width,
            horizontal_snap: layout.pitch_height,
            vertical_snap: (grid_width - layout.piano_key_width) / time_divisions as f32,
            time_divisions,
            handle_size: layout.handle_size,
        }
    }

    /// True for positions strictly inside the note area (right of the piano keys).
    pub fn contains_note_area(&self, pos: Pos2) -> bool {
        pos.x > self.piano_key_width
            && pos.x < self.grid_width
            && pos.y > 0.0
            && pos.y < self.grid_height
    }

    pub fn clamp_y(&self, y: f32) -> f32 {
        y.max(0.0).min(self.grid_height)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::from_layout(&GridLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_sixteen_division_grid() {
        let grid = GridConfig::default();
        assert_eq!(grid.grid_width, 600.0);
        assert_eq!(grid.grid_height, 384.0);
        assert_eq!(grid.time_divisions, 16);
        assert_eq!(grid.horizontal_snap, 16.0);
        assert!((grid.vertical_snap - 34.375).abs() < 1e-4);
    }

    #[test]
    fn time_signature_change_recomputes_divisions() {
        let layout = GridLayout {
            time_signature: TimeSignature::new(3, 4),
            ..GridLayout::default()
        };
        let grid = GridConfig::from_layout(&layout);
        assert_eq!(grid.time_divisions, 12);
        assert!((grid.vertical_snap - 550.0 / 12.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_count_change_recomputes_height() {
        let layout = GridLayout {
            pitch_count: 48,
            ..GridLayout::default()
        };
        assert_eq!(GridConfig::from_layout(&layout).grid_height, 768.0);
    }

    #[test]
    fn partial_json_layout_uses_defaults() {
        let layout = GridLayout::from_json(r#"{ "pitch_count": 12 }"#).unwrap();
        assert_eq!(layout.pitch_count, 12);
        assert_eq!(layout.piano_key_width, 50.0);
        assert_eq!(layout.time_signature, TimeSignature::new(4, 4));
    }

    #[test]
    fn malformed_json_layout_is_invalid_data() {
        let err = GridLayout::from_json("{ not json").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn layout_json_round_trips() {
        let layout = GridLayout {
            time_signature: TimeSignature::new(6, 8),
            ..GridLayout::default()
        };
        let json = layout.to_json().unwrap();
        assert_eq!(GridLayout::from_json(&json).unwrap(), layout);
    }

    #[test]
    fn note_ids_are_unique() {
        let a = NoteId::next();
        let b = NoteId::next();
        assert_ne!(a, b);
    }
}
