//! Pointer hit-testing against the note collection.

use crate::editor::EditorMode;
use crate::model::ResizeEdge;
use crate::structure::{GridConfig, HandleKind, NoteId, PitchNote};
use egui::Pos2;

pub const ANCHOR_RADIUS: f32 = 6.0;
pub const HANDLE_RADIUS: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointKind {
    Anchor,
    Handle(HandleKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitTarget {
    Empty,
    NoteBody(NoteId),
    Edge { note_id: NoteId, edge: ResizeEdge },
    Point {
        note_id: NoteId,
        index: usize,
        kind: PointKind,
    },
}

impl HitTarget {
    pub fn note_id(&self) -> Option<NoteId> {
        match self {
            HitTarget::Empty => None,
            HitTarget::NoteBody(id) => Some(*id),
            HitTarget::Edge { note_id, .. } | HitTarget::Point { note_id, .. } => Some(*note_id),
        }
    }
}

fn within(pos: Pos2, center: Pos2, radius: f32) -> bool {
    pos.distance_sq(center) <= radius * radius
}

fn hit_curve_point(note: &PitchNote, pos: Pos2) -> Option<HitTarget> {
    // Later points are painted over earlier ones, and each anchor over its handles.
    for (index, point) in note.points.iter().enumerate().rev() {
        let kind = if within(pos, point.pos(), ANCHOR_RADIUS) {
            PointKind::Anchor
        } else if point.cp2.is_some_and(|h| within(pos, h.pos(), HANDLE_RADIUS)) {
            PointKind::Handle(HandleKind::Cp2)
        } else if point.cp1.is_some_and(|h| within(pos, h.pos(), HANDLE_RADIUS)) {
            PointKind::Handle(HandleKind::Cp1)
        } else {
            continue;
        };
        return Some(HitTarget::Point {
            note_id: note.id,
            index,
            kind,
        });
    }
    None
}

/// Resolves what lies under `pos`.
///
/// In select mode the selected note's anchors and handles come first, then
/// the edge strips of any note, then note bodies. Other modes only see note
/// bodies. Notes later in the slice are on top.
pub fn hit_test(
    notes: &[PitchNote],
    selected: Option<NoteId>,
    mode: EditorMode,
    pos: Pos2,
    grid: &GridConfig,
) -> HitTarget {
    let selecting = mode == EditorMode::Select;
    if selecting {
        if let Some(note) = selected.and_then(|id| notes.iter().find(|n| n.id == id)) {
            if let Some(target) = hit_curve_point(note, pos) {
                return target;
            }
        }
    }

    for note in notes.iter().rev() {
        if !note.rect.contains(pos) {
            continue;
        }
        if selecting {
            let grab = grid.handle_size.min(note.rect.width / 4.0);
            if pos.x - note.rect.x < grab {
                return HitTarget::Edge {
                    note_id: note.id,
                    edge: ResizeEdge::Left,
                };
            }
            if note.rect.right() - pos.x < grab {
                return HitTarget::Edge {
                    note_id: note.id,
                    edge: ResizeEdge::Right,
                };
            }
        }
        return HitTarget::NoteBody(note.id);
    }
    HitTarget::Empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{add_curve_point, create_note};

    fn setup() -> (GridConfig, PitchNote) {
        let grid = GridConfig::default();
        let note = create_note(250.0, 100.0, &grid);
        (grid, note)
    }

    #[test]
    fn body_edges_and_empty() {
        let (grid, note) = setup();
        let notes = vec![note.clone()];
        let rect = note.rect;
        let y = rect.y + 2.0;
        let select = EditorMode::Select;

        assert_eq!(
            hit_test(&notes, None, select, Pos2::new(rect.middle_x(), y), &grid),
            HitTarget::NoteBody(note.id)
        );
        assert_eq!(
            hit_test(&notes, None, select, Pos2::new(rect.x + 1.0, y), &grid),
            HitTarget::Edge {
                note_id: note.id,
                edge: ResizeEdge::Left
            }
        );
        assert_eq!(
            hit_test(&notes, None, select, Pos2::new(rect.right() - 1.0, y), &grid),
            HitTarget::Edge {
                note_id: note.id,
                edge: ResizeEdge::Right
            }
        );
        assert_eq!(
            hit_test(&notes, None, select, Pos2::new(rect.x - 30.0, y), &grid),
            HitTarget::Empty
        );
    }

    #[test]
    fn points_only_hit_on_selected_note() {
        let (grid, note) = setup();
        let note = add_curve_point(&note);
        let notes = vec![note.clone()];
        let middle = note.points[1].pos();

        assert_eq!(
            hit_test(&notes, Some(note.id), EditorMode::Select, middle, &grid),
            HitTarget::Point {
                note_id: note.id,
                index: 1,
                kind: PointKind::Anchor
            }
        );
        assert_eq!(
            hit_test(&notes, None, EditorMode::Select, middle, &grid),
            HitTarget::NoteBody(note.id)
        );
    }

    #[test]
    fn handles_hit_on_selected_note() {
        let (grid, note) = setup();
        let notes = vec![note.clone()];
        let cp1 = note.points[0].cp1.unwrap().pos();
        assert_eq!(
            hit_test(&notes, Some(note.id), EditorMode::Select, cp1, &grid),
            HitTarget::Point {
                note_id: note.id,
                index: 0,
                kind: PointKind::Handle(HandleKind::Cp1)
            }
        );
        let cp2 = note.points[1].cp2.unwrap().pos();
        assert_eq!(
            hit_test(&notes, Some(note.id), EditorMode::Select, cp2, &grid),
            HitTarget::Point {
                note_id: note.id,
                index: 1,
                kind: PointKind::Handle(HandleKind::Cp2)
            }
        );
    }

    #[test]
    fn other_modes_only_see_bodies() {
        let (grid, note) = setup();
        let notes = vec![note.clone()];
        let edge = Pos2::new(note.rect.x + 1.0, note.rect.y + 2.0);
        let anchor = note.points[0].pos();
        assert_eq!(
            hit_test(&notes, Some(note.id), EditorMode::Delete, edge, &grid),
            HitTarget::NoteBody(note.id)
        );
        assert_eq!(
            hit_test(&notes, Some(note.id), EditorMode::Draw, anchor, &grid),
            HitTarget::NoteBody(note.id)
        );
    }
}
