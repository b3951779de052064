//! # egui_pitch
//!
//! A pitch-curve note editor widget for egui.
//!
//! Notes are rectangles on a pitch/time grid. Each one carries a Bezier
//! pitch curve of two to five points, and notes whose edges touch are joined
//! so their curves meet smoothly.
//!
//! ## Features
//!
//! - **Drawing**: click in draw mode to drop a grid-snapped note
//! - **Editing**: drag notes around or resize them from either edge
//! - **Pitch curves**: add up to five points, drag anchors and control handles
//! - **Joining**: touching notes share a smooth joint that follows every edit
//! - **Layout**: time signature, pitch count and measure width from JSON
//!
//! ## Basic usage
//!
//! ```rust,ignore
//! use egui_pitch::{PitchEditor, PitchEditorOptions};
//!
//! let mut editor = PitchEditor::new(PitchEditorOptions::default());
//!
//! // inside an egui frame
//! editor.ui(ui);
//!
//! for event in editor.take_events() {
//!     log::info!("{:?}", event);
//! }
//! ```
//!
//! ## Integrating with a host
//!
//! ```rust,ignore
//! use egui_pitch::{EditorCommand, EditorEvent, EditorMode, PitchEditor, PitchEditorOptions};
//!
//! let mut editor = PitchEditor::new(PitchEditorOptions::default());
//!
//! // react to edits as they happen
//! editor.set_event_listener(|event| {
//!     if let EditorEvent::NoteUpdated { after, .. } = event {
//!         resynthesize(after);
//!     }
//! });
//!
//! // render inside the host's UI
//! editor.ui(ui);
//!
//! // drive the editor from host menus or shortcuts
//! editor.apply_command(EditorCommand::SetMode(EditorMode::Draw));
//! editor.apply_command(EditorCommand::AddCurvePoint);
//! ```
//!
//! The model functions in [`model`] and the state machine in
//! [`interaction`] work without a window, so hosts can also drive the editor
//! headlessly with [`PitchEditor::pointer_down`], [`PitchEditor::pointer_move`]
//! and friends.

pub mod connection;
pub mod curve;
pub mod editor;
pub mod hit;
pub mod interaction;
pub mod model;
pub mod structure;
pub mod ui;

pub use connection::Connection;
pub use editor::{EditorCommand, EditorEvent, EditorMode, PitchEditorOptions};
pub use hit::{hit_test, HitTarget, PointKind};
pub use interaction::{ActivePoint, Gesture, PitchEditor};
pub use model::ResizeEdge;
pub use structure::{
    ControlHandle, GridConfig, GridLayout, HandleKind, NoteId, NoteRect, PitchNote, PitchPoint,
    TimeSignature,
};
