//! Editing commands and events module
//!
//! Defines the command and event surface the pitch editor exposes to its
//! host application, plus the options used to construct it.

use crate::structure::{GridConfig, GridLayout, NoteId, PitchNote};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditorMode {
    #[default]
    Select,
    Draw,
    Delete,
}

impl EditorMode {
    pub const ALL: [EditorMode; 3] = [EditorMode::Select, EditorMode::Draw, EditorMode::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            EditorMode::Select => "Select",
            EditorMode::Draw => "Draw",
            EditorMode::Delete => "Delete",
        }
    }
}

/// Commands a host can push into the editor.
#[derive(Clone, Debug)]
pub enum EditorCommand {
    SetMode(EditorMode),
    SetLayout(GridLayout),
    SetNotes(Vec<PitchNote>),
    ClearNotes,
    SelectNote(Option<NoteId>),
    DeleteNote(NoteId),
    /// Adds a centre point to the selected note's curve.
    AddCurvePoint,
    DeleteCurvePoint {
        note_id: NoteId,
        index: usize,
    },
}

/// Edit events a host can listen to.
#[derive(Clone, Debug)]
pub enum EditorEvent {
    NotesReplaced,
    NoteAdded(PitchNote),
    NoteDeleted(PitchNote),
    NoteUpdated {
        before: PitchNote,
        after: PitchNote,
    },
    SelectionChanged(Option<NoteId>),
    ModeChanged(EditorMode),
    LayoutChanged(GridConfig),
    CurvePointAdded {
        note_id: NoteId,
        index: usize,
    },
    CurvePointRemoved {
        note_id: NoteId,
        index: usize,
    },
    GestureStarted {
        note_id: NoteId,
    },
    GestureEnded {
        note_id: NoteId,
    },
}

/// Construction-time configuration.
#[derive(Clone, Debug)]
pub struct PitchEditorOptions {
    pub mode: EditorMode,
    pub layout: GridLayout,
    /// Seeds the editor with a few connected example notes.
    pub with_demo_notes: bool,
}

impl Default for PitchEditorOptions {
    fn default() -> Self {
        Self {
            mode: EditorMode::Select,
            layout: GridLayout::default(),
            with_demo_notes: false,
        }
    }
}

impl PitchEditorOptions {
    pub fn with_layout(layout: GridLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }
}
