//! Interaction state machine
//!
//! [`PitchEditor`] owns the notes and routes pointer and keyboard input to
//! the model operations. The egui front end in [`crate::ui`] feeds it already
//! hit-tested input, so everything here can be driven without a window.

use crate::connection::{find_connections, recompute_connections, Connection};
use crate::editor::{EditorCommand, EditorEvent, EditorMode, PitchEditorOptions};
use crate::hit::{HitTarget, PointKind};
use crate::model::{
    self, add_curve_point, create_note, demo_notes, drag_anchor, drag_control_handle, move_note,
    resize_note, ResizeEdge,
};
use crate::structure::{GridConfig, GridLayout, HandleKind, NoteId, PitchNote};
use egui::{Key, Pos2};

/// Where a gesture started and what the note looked like at that moment.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureOrigin {
    pub note_id: NoteId,
    pub pointer: Pos2,
    pub snapshot: PitchNote,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingNote(GestureOrigin),
    ResizingLeft(GestureOrigin),
    ResizingRight(GestureOrigin),
    DraggingAnchor {
        origin: GestureOrigin,
        index: usize,
    },
    DraggingControlHandle {
        origin: GestureOrigin,
        index: usize,
        handle: HandleKind,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn origin(&self) -> Option<&GestureOrigin> {
        match self {
            Gesture::Idle => None,
            Gesture::DraggingNote(origin)
            | Gesture::ResizingLeft(origin)
            | Gesture::ResizingRight(origin)
            | Gesture::DraggingAnchor { origin, .. }
            | Gesture::DraggingControlHandle { origin, .. } => Some(origin),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::DraggingNote(_) => "dragging note",
            Gesture::ResizingLeft(_) => "resizing left",
            Gesture::ResizingRight(_) => "resizing right",
            Gesture::DraggingAnchor { .. } => "dragging anchor",
            Gesture::DraggingControlHandle { .. } => "dragging handle",
        }
    }
}

/// The curve point last pressed on; survives pointer-up so it can be deleted
/// from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivePoint {
    pub note_id: NoteId,
    pub kind: PointKind,
    pub index: usize,
}

pub struct PitchEditor {
    notes: Vec<PitchNote>,
    layout: GridLayout,
    grid: GridConfig,
    mode: EditorMode,
    selected: Option<NoteId>,
    active_point: Option<ActivePoint>,
    gesture: Gesture,

    pending_events: Vec<EditorEvent>,
    event_listener: Option<Box<dyn FnMut(&EditorEvent)>>,
}

impl Default for PitchEditor {
    fn default() -> Self {
        Self::new(PitchEditorOptions::default())
    }
}

impl PitchEditor {
    pub fn new(options: PitchEditorOptions) -> Self {
        let grid = GridConfig::from_layout(&options.layout);
        let notes = if options.with_demo_notes {
            demo_notes(&grid)
        } else {
            Vec::new()
        };
        Self {
            notes,
            layout: options.layout,
            grid,
            mode: options.mode,
            selected: None,
            active_point: None,
            gesture: Gesture::Idle,
            pending_events: Vec::new(),
            event_listener: None,
        }
    }

    pub fn notes(&self) -> &[PitchNote] {
        &self.notes
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn selected(&self) -> Option<NoteId> {
        self.selected
    }

    /// Position of the selected note in [`Self::notes`]. Indices move whenever
    /// the collection is re-sorted, so look this up fresh each time.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.note_index_by_id(id))
    }

    pub fn selected_note(&self) -> Option<&PitchNote> {
        self.selected.and_then(|id| self.note_by_id(id))
    }

    pub fn active_point(&self) -> Option<ActivePoint> {
        self.active_point
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn connections(&self) -> Vec<Connection> {
        find_connections(&self.notes)
    }

    pub fn note_by_id(&self, id: NoteId) -> Option<&PitchNote> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn note_index_by_id(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    pub fn set_event_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        self.event_listener = Some(Box::new(listener));
    }

    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit_event(&mut self, event: EditorEvent) {
        if let Some(listener) = &mut self.event_listener {
            listener(&event);
        }
        self.pending_events.push(event);
    }

    pub fn apply_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::SetMode(mode) => self.set_mode(mode),
            EditorCommand::SetLayout(layout) => self.set_layout(layout),
            EditorCommand::SetNotes(notes) => self.set_notes(notes),
            EditorCommand::ClearNotes => self.clear_notes(),
            EditorCommand::SelectNote(id) => self.select_note(id),
            EditorCommand::DeleteNote(id) => {
                self.delete_note(id);
            }
            EditorCommand::AddCurvePoint => {
                self.add_curve_point_to_selection();
            }
            EditorCommand::DeleteCurvePoint { note_id, index } => {
                self.delete_curve_point(note_id, index);
            }
        }
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        self.finish_gesture();
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.active_point = None;
        self.emit_event(EditorEvent::ModeChanged(mode));
    }

    /// Swaps the layout and re-derives the grid. Existing notes keep their
    /// pixel geometry.
    pub fn set_layout(&mut self, layout: GridLayout) {
        self.finish_gesture();
        self.grid = GridConfig::from_layout(&layout);
        self.layout = layout;
        log::debug!(
            "layout changed: {} pitches, {} time divisions",
            self.layout.pitch_count,
            self.grid.time_divisions
        );
        self.emit_event(EditorEvent::LayoutChanged(self.grid));
    }

    pub fn set_notes(&mut self, notes: Vec<PitchNote>) {
        self.finish_gesture();
        self.notes = recompute_connections(notes);
        if let Some(id) = self.selected {
            if self.note_by_id(id).is_none() {
                self.selected = None;
                self.active_point = None;
                self.emit_event(EditorEvent::SelectionChanged(None));
            }
        }
        self.emit_event(EditorEvent::NotesReplaced);
    }

    pub fn clear_notes(&mut self) {
        self.set_notes(Vec::new());
    }

    pub fn select_note(&mut self, id: Option<NoteId>) {
        let id = id.filter(|id| self.note_by_id(*id).is_some());
        if self.selected == id {
            return;
        }
        self.selected = id;
        if self.active_point.is_some_and(|p| Some(p.note_id) != id) {
            self.active_point = None;
        }
        self.emit_event(EditorEvent::SelectionChanged(id));
    }

    /// Starts a gesture on whatever `target` names. Returns `false` when no
    /// gesture begins, which is always the case outside select mode.
    pub fn pointer_down(&mut self, pos: Pos2, target: HitTarget) -> bool {
        if self.mode != EditorMode::Select || !self.gesture.is_idle() {
            return false;
        }
        let Some(note_id) = target.note_id() else {
            self.active_point = None;
            return false;
        };
        let Some(snapshot) = self.note_by_id(note_id).cloned() else {
            return false;
        };

        self.select_note(Some(note_id));
        let origin = GestureOrigin {
            note_id,
            pointer: pos,
            snapshot,
        };
        self.gesture = match target {
            HitTarget::Empty => return false,
            HitTarget::NoteBody(_) => Gesture::DraggingNote(origin),
            HitTarget::Edge {
                edge: ResizeEdge::Left,
                ..
            } => Gesture::ResizingLeft(origin),
            HitTarget::Edge {
                edge: ResizeEdge::Right,
                ..
            } => Gesture::ResizingRight(origin),
            HitTarget::Point { index, kind, .. } => match kind {
                PointKind::Anchor => Gesture::DraggingAnchor { origin, index },
                PointKind::Handle(handle) => Gesture::DraggingControlHandle {
                    origin,
                    index,
                    handle,
                },
            },
        };
        self.active_point = match target {
            HitTarget::Point { index, kind, .. } => Some(ActivePoint {
                note_id,
                kind,
                index,
            }),
            _ => None,
        };

        log::debug!("{} started on note {:?}", self.gesture.name(), note_id);
        self.emit_event(EditorEvent::GestureStarted { note_id });
        true
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        let grid = self.grid;
        let updated = match &self.gesture {
            Gesture::Idle => return,
            Gesture::DraggingNote(origin) => {
                let delta = pos - origin.pointer;
                move_note(&origin.snapshot, delta.x, delta.y, &grid)
            }
            Gesture::ResizingLeft(origin) => {
                let delta = pos - origin.pointer;
                resize_note(&origin.snapshot, ResizeEdge::Left, delta.x, &grid)
            }
            Gesture::ResizingRight(origin) => {
                let delta = pos - origin.pointer;
                resize_note(&origin.snapshot, ResizeEdge::Right, delta.x, &grid)
            }
            Gesture::DraggingAnchor { origin, index } => {
                let Some(current) = self.note_by_id(origin.note_id) else {
                    return;
                };
                drag_anchor(current, *index, pos, &grid)
            }
            Gesture::DraggingControlHandle {
                origin,
                index,
                handle,
            } => {
                let Some(current) = self.note_by_id(origin.note_id) else {
                    return;
                };
                drag_control_handle(current, *index, *handle, pos, &grid)
            }
        };
        log::trace!("{} -> {:?}", self.gesture.name(), updated.rect);
        self.replace_note(updated);
    }

    /// Ends the current gesture, reporting the edit if anything changed.
    pub fn pointer_up(&mut self) {
        self.finish_gesture();
    }

    fn finish_gesture(&mut self) {
        let gesture = std::mem::take(&mut self.gesture);
        let Some(origin) = gesture.origin() else {
            return;
        };
        let note_id = origin.note_id;
        if let Some(after) = self.note_by_id(note_id).cloned() {
            if after != origin.snapshot {
                self.emit_event(EditorEvent::NoteUpdated {
                    before: origin.snapshot.clone(),
                    after,
                });
            }
        }
        log::debug!("{} ended on note {:?}", gesture.name(), note_id);
        self.emit_event(EditorEvent::GestureEnded { note_id });
    }

    /// A click that did not turn into a drag.
    pub fn click(&mut self, pos: Pos2, target: HitTarget) {
        match self.mode {
            EditorMode::Draw => {
                if target == HitTarget::Empty && self.grid.contains_note_area(pos) {
                    self.create_note_at(pos);
                }
            }
            EditorMode::Delete => {
                if let Some(id) = target.note_id() {
                    self.delete_note(id);
                }
            }
            EditorMode::Select => match target {
                HitTarget::Empty => {
                    self.active_point = None;
                    self.select_note(None);
                }
                HitTarget::NoteBody(id) | HitTarget::Edge { note_id: id, .. } => {
                    self.active_point = None;
                    self.select_note(Some(id));
                }
                HitTarget::Point {
                    note_id,
                    index,
                    kind,
                } => {
                    self.select_note(Some(note_id));
                    self.active_point = Some(ActivePoint {
                        note_id,
                        kind,
                        index,
                    });
                }
            },
        }
    }

    pub fn double_click(&mut self, target: HitTarget) {
        if self.mode != EditorMode::Select || !self.gesture.is_idle() {
            return;
        }
        if let HitTarget::Point {
            note_id,
            index,
            kind: PointKind::Anchor,
        } = target
        {
            self.delete_curve_point(note_id, index);
        }
    }

    /// Handles editor shortcuts. Returns `true` if the key was consumed.
    pub fn key_pressed(&mut self, key: Key) -> bool {
        if !matches!(key, Key::Delete | Key::Backspace) {
            return false;
        }
        if self.mode != EditorMode::Select || !self.gesture.is_idle() {
            return false;
        }
        match self.active_point {
            Some(ActivePoint {
                note_id,
                kind: PointKind::Anchor,
                index,
            }) => self.delete_curve_point(note_id, index),
            _ => false,
        }
    }

    /// Creates a note centred near `pos`, selects it and returns its id.
    pub fn create_note_at(&mut self, pos: Pos2) -> NoteId {
        let note = create_note(pos.x, pos.y, &self.grid);
        let id = note.id;
        self.notes.push(note);
        self.notes = recompute_connections(std::mem::take(&mut self.notes));
        if let Some(added) = self.note_by_id(id).cloned() {
            log::debug!("note {:?} added at {:?}", id, added.rect);
            self.emit_event(EditorEvent::NoteAdded(added));
        }
        self.select_note(Some(id));
        id
    }

    pub fn delete_note(&mut self, id: NoteId) -> bool {
        let Some(index) = self.note_index_by_id(id) else {
            return false;
        };
        self.finish_gesture();
        let removed = self.notes.remove(index);
        self.notes = recompute_connections(std::mem::take(&mut self.notes));
        if self.active_point.is_some_and(|p| p.note_id == id) {
            self.active_point = None;
        }
        log::debug!("note {:?} deleted", id);
        self.emit_event(EditorEvent::NoteDeleted(removed));
        if self.selected == Some(id) {
            self.selected = None;
            self.emit_event(EditorEvent::SelectionChanged(None));
        }
        true
    }

    /// Adds a centre point to the selected note and returns its index.
    /// A gesture in progress is ended first.
    pub fn add_curve_point_to_selection(&mut self) -> Option<usize> {
        self.finish_gesture();
        let before = self.selected_note()?.clone();
        let after = add_curve_point(&before);
        if after.points.len() == before.points.len() {
            log::debug!("note {:?} already has the maximum number of points", before.id);
            return None;
        }
        let index = model::curve_insert_index(&before.points, before.rect.middle_x());
        if let Some(active) = self.active_point.as_mut() {
            if active.note_id == before.id && active.index >= index {
                active.index += 1;
            }
        }
        let note_id = before.id;
        let after = self.replace_note(after);
        self.emit_event(EditorEvent::CurvePointAdded { note_id, index });
        self.emit_event(EditorEvent::NoteUpdated { before, after });
        Some(index)
    }

    /// Removes interior point `index` from a note. Endpoints are refused.
    /// A gesture in progress is ended first so it never follows a shifted index.
    pub fn delete_curve_point(&mut self, note_id: NoteId, index: usize) -> bool {
        self.finish_gesture();
        let Some(before) = self.note_by_id(note_id).cloned() else {
            return false;
        };
        let after = model::delete_curve_point(&before, index);
        if after.points.len() == before.points.len() {
            return false;
        }
        self.active_point = match self.active_point {
            Some(active) if active.note_id == note_id && active.index == index => None,
            Some(mut active) if active.note_id == note_id && active.index > index => {
                active.index -= 1;
                Some(active)
            }
            other => other,
        };
        let after = self.replace_note(after);
        self.emit_event(EditorEvent::CurvePointRemoved { note_id, index });
        self.emit_event(EditorEvent::NoteUpdated { before, after });
        true
    }

    /// Swaps in `note` and rejoins neighbours; returns the note as stored.
    fn replace_note(&mut self, note: PitchNote) -> PitchNote {
        let id = note.id;
        let Some(index) = self.note_index_by_id(id) else {
            return note;
        };
        self.notes[index] = note.clone();
        self.notes = recompute_connections(std::mem::take(&mut self.notes));
        self.note_by_id(id).cloned().unwrap_or(note)
    }
}
