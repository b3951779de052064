//! Note/curve model
//!
//! Pure operations over [`PitchNote`] values. Each function reads the note it
//! works on and returns a new one; requests that would break an invariant
//! (bad index, point cap, endpoint removal) hand back an unchanged copy, and
//! geometry that would leave the grid is clamped to the nearest legal value.
//!
//! Move and resize are always computed from the note as it was when the
//! gesture started plus the cumulative pointer delta. Feeding them the
//! previous frame's output instead makes repeated snapping drift.

use crate::connection::recompute_connections;
use crate::structure::{
    ControlHandle, GridConfig, HandleKind, NoteRect, PitchNote, PitchPoint, HANDLE_OFFSET,
    MAX_CURVE_POINTS, MIN_POINT_SPACING,
};
use egui::Pos2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Rounds `value` to the nearest multiple of `grid_size`, halves rounding up.
pub fn snap_to_grid(value: f32, grid_size: f32) -> f32 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snaps a horizontal position to the time grid, which starts at the piano keys.
fn snap_time(x: f32, grid: &GridConfig) -> f32 {
    grid.piano_key_width + snap_to_grid(x - grid.piano_key_width, grid.vertical_snap)
}

/// Straight two-point curve along the note's midline.
pub fn initial_pitch_points(rect: &NoteRect) -> Vec<PitchPoint> {
    let mid = rect.middle_y();
    vec![
        PitchPoint::new(rect.x, mid, 0.0)
            .with_cp1(ControlHandle::new(rect.x + HANDLE_OFFSET, mid, 0.0)),
        PitchPoint::new(rect.right(), mid, 0.0)
            .with_cp2(ControlHandle::new(rect.right() - HANDLE_OFFSET, mid, 0.0)),
    ]
}

/// Builds a minimum-width note centred on the grid cell nearest `(x, y)`.
pub fn create_note(x: f32, y: f32, grid: &GridConfig) -> PitchNote {
    let snapped_x = snap_time(x - grid.min_note_width / 2.0, grid);
    let snapped_y = snap_to_grid(y - grid.note_height / 2.0, grid.horizontal_snap);

    let mut rect = NoteRect::new(
        snapped_x.max(grid.piano_key_width),
        snapped_y.min(grid.grid_height - grid.note_height).max(0.0),
        grid.min_note_width,
        grid.note_height,
    );
    if rect.right() > grid.grid_width {
        rect.x = grid.grid_width - rect.width;
    }

    let points = initial_pitch_points(&rect);
    PitchNote::new(rect, points)
}

/// Recomputes every point's offsets from the rectangle's midline.
pub fn update_y_offsets(points: &[PitchPoint], rect: &NoteRect) -> Vec<PitchPoint> {
    let mid = rect.middle_y();
    points
        .iter()
        .map(|point| {
            let mut updated = *point;
            updated.y_offset = point.y - mid;
            if let Some(cp1) = updated.cp1.as_mut() {
                cp1.y_offset = cp1.y - mid;
            }
            if let Some(cp2) = updated.cp2.as_mut() {
                cp2.y_offset = cp2.y - mid;
            }
            updated
        })
        .collect()
}

fn fraction_within(x: f32, rect: &NoteRect) -> f32 {
    if rect.width == 0.0 {
        0.0
    } else {
        (x - rect.x) / rect.width
    }
}

fn rederive_handle(handle: ControlHandle, new_rect: &NoteRect, old_rect: &NoteRect) -> ControlHandle {
    let fraction = fraction_within(handle.x, old_rect);
    ControlHandle {
        x: new_rect.x + fraction * new_rect.width,
        y: new_rect.middle_y() + handle.y_offset,
        y_offset: handle.y_offset,
    }
}

/// Maps points captured against `old_rect` onto `new_rect`.
///
/// Horizontal positions keep their fraction of the note width (endpoints are
/// pinned to 0 and 1); vertical positions are the new midline plus the stored
/// offset.
pub fn adjust_pitch_points(
    new_rect: &NoteRect,
    old_rect: &NoteRect,
    points: &[PitchPoint],
) -> Vec<PitchPoint> {
    let mid = new_rect.middle_y();
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let fraction = if index == 0 {
                0.0
            } else if index == last {
                1.0
            } else {
                fraction_within(point.x, old_rect)
            };
            PitchPoint {
                x: new_rect.x + fraction * new_rect.width,
                y: mid + point.y_offset,
                y_offset: point.y_offset,
                cp1: point.cp1.map(|h| rederive_handle(h, new_rect, old_rect)),
                cp2: point.cp2.map(|h| rederive_handle(h, new_rect, old_rect)),
            }
        })
        .collect()
}

fn with_rect(snapshot: &PitchNote, rect: NoteRect) -> PitchNote {
    let points = adjust_pitch_points(&rect, &snapshot.rect, &snapshot.points);
    PitchNote::with_id(snapshot.id, rect, points)
}

/// Moves the note captured in `snapshot` by the cumulative pointer delta.
pub fn move_note(snapshot: &PitchNote, delta_x: f32, delta_y: f32, grid: &GridConfig) -> PitchNote {
    let origin = snapshot.rect;
    let x = snap_time(origin.x + delta_x, grid)
        .max(grid.piano_key_width)
        .min(grid.grid_width - origin.width);
    let y = snap_to_grid(origin.y + delta_y, grid.horizontal_snap)
        .min(grid.grid_height - origin.height)
        .max(0.0);
    with_rect(snapshot, NoteRect { x, y, ..origin })
}

/// Drags one edge of the note captured in `snapshot` by the cumulative delta.
pub fn resize_note(
    snapshot: &PitchNote,
    edge: ResizeEdge,
    delta_x: f32,
    grid: &GridConfig,
) -> PitchNote {
    let origin = snapshot.rect;
    let rect = match edge {
        ResizeEdge::Left => {
            let right = origin.right();
            // The edge is clamped, so the right side never moves.
            let x = snap_time(origin.x + delta_x, grid)
                .min(right - grid.min_note_width)
                .max(grid.piano_key_width);
            NoteRect {
                x,
                width: right - x,
                ..origin
            }
        }
        ResizeEdge::Right => {
            let snapped_right = snap_time(origin.right() + delta_x, grid);
            let width = (snapped_right - origin.x)
                .max(grid.min_note_width)
                .min(grid.grid_width - origin.x);
            NoteRect { width, ..origin }
        }
    };
    with_rect(snapshot, rect)
}

/// Index at which a point at `x` belongs: after the first adjacent pair whose
/// range contains it, or 1 when no pair does.
pub fn curve_insert_index(points: &[PitchPoint], x: f32) -> usize {
    points
        .windows(2)
        .position(|pair| pair[0].x <= x && x <= pair[1].x)
        .map(|i| i + 1)
        .unwrap_or(1)
}

/// Inserts a flat point at the centre of the note.
pub fn add_curve_point(note: &PitchNote) -> PitchNote {
    if note.points.len() >= MAX_CURVE_POINTS || note.points.len() < 2 {
        return note.clone();
    }
    let x = note.rect.middle_x();
    let y = note.rect.middle_y();
    let point = PitchPoint::new(x, y, 0.0)
        .with_cp1(ControlHandle::new(x + HANDLE_OFFSET, y, 0.0))
        .with_cp2(ControlHandle::new(x - HANDLE_OFFSET, y, 0.0));

    let mut updated = note.clone();
    let index = curve_insert_index(&updated.points, x);
    updated.points.insert(index, point);
    updated
}

/// Removes an interior point. Endpoints and two-point curves are left alone.
pub fn delete_curve_point(note: &PitchNote, index: usize) -> PitchNote {
    let len = note.points.len();
    if len <= 2 || index == 0 || index + 1 >= len {
        return note.clone();
    }
    let mut updated = note.clone();
    updated.points.remove(index);
    updated
}

/// Moves anchor `index` towards `pointer`.
///
/// Endpoints only move vertically and carry their own handle with them.
/// Interior anchors stay inside the note and at least [`MIN_POINT_SPACING`]
/// away from both neighbours; their handles shift by the same x delta.
pub fn drag_anchor(note: &PitchNote, index: usize, pointer: Pos2, grid: &GridConfig) -> PitchNote {
    let len = note.points.len();
    if index >= len {
        return note.clone();
    }
    let rect = note.rect;
    let y = grid.clamp_y(pointer.y);
    let mut points = note.points.clone();

    if note.is_endpoint(index) {
        let point = &mut points[index];
        point.y = y;
        let own_handle = if index == 0 {
            point.cp1.as_mut()
        } else {
            point.cp2.as_mut()
        };
        if let Some(handle) = own_handle {
            handle.y = y;
        }
    } else {
        let x = pointer
            .x
            .max(rect.x)
            .min(rect.right())
            .max(points[index - 1].x + MIN_POINT_SPACING)
            .min(points[index + 1].x - MIN_POINT_SPACING);
        let point = &mut points[index];
        let shift = x - point.x;
        point.x = x;
        point.y = y;
        if let Some(cp1) = point.cp1.as_mut() {
            cp1.x += shift;
        }
        if let Some(cp2) = point.cp2.as_mut() {
            cp2.x += shift;
        }
    }

    let points = update_y_offsets(&points, &rect);
    PitchNote::with_id(note.id, rect, points)
}

/// Moves one control handle of point `index` towards `pointer`.
///
/// `Cp1` stays between its anchor and the next anchor, `Cp2` between the
/// previous anchor and its own; both stay inside the note horizontally.
pub fn drag_control_handle(
    note: &PitchNote,
    index: usize,
    kind: HandleKind,
    pointer: Pos2,
    grid: &GridConfig,
) -> PitchNote {
    let Some(anchor) = note.points.get(index) else {
        return note.clone();
    };
    if anchor.handle(kind).is_none() {
        return note.clone();
    }

    let rect = note.rect;
    let y = grid.clamp_y(pointer.y);
    let mut x = pointer.x.max(rect.x).min(rect.right());
    match kind {
        HandleKind::Cp1 => {
            x = x.max(anchor.x);
            if let Some(next) = note.points.get(index + 1) {
                x = x.min(next.x);
            }
        }
        HandleKind::Cp2 => {
            x = x.min(anchor.x);
            if index > 0 {
                x = x.max(note.points[index - 1].x);
            }
        }
    }

    let mut points = note.points.clone();
    if let Some(handle) = points[index].handle_mut(kind) {
        handle.x = x;
        handle.y = y;
    }
    let points = update_y_offsets(&points, &rect);
    PitchNote::with_id(note.id, rect, points)
}

/// Three starter notes: a bent note with an interior point, a note joined to
/// its right edge, and a free-standing note one division further on.
pub fn demo_notes(grid: &GridConfig) -> Vec<PitchNote> {
    let vs = grid.vertical_snap;
    let hs = grid.horizontal_snap;

    let first_rect = NoteRect::new(grid.piano_key_width + vs * 3.0, hs * 12.0, vs * 4.0, grid.note_height);
    let mut first_points = initial_pitch_points(&first_rect);
    let mid = first_rect.middle_y();
    first_points[0].y = mid + hs;
    first_points[0].y_offset = hs;
    if let Some(cp1) = first_points[0].cp1.as_mut() {
        cp1.y = mid + hs;
        cp1.y_offset = hs;
    }
    let bend_x = first_rect.middle_x();
    let bend_y = mid - hs / 2.0;
    first_points.insert(
        1,
        PitchPoint::new(bend_x, bend_y, -hs / 2.0)
            .with_cp1(ControlHandle::new(bend_x + 15.0, bend_y - 5.0, -hs / 2.0 - 5.0))
            .with_cp2(ControlHandle::new(bend_x - 15.0, bend_y - 5.0, -hs / 2.0 - 5.0)),
    );

    let second_rect = NoteRect::new(first_rect.right(), hs * 10.0, vs * 3.0, grid.note_height);
    let third_rect = NoteRect::new(second_rect.right() + vs, hs * 8.0, vs * 3.0, grid.note_height);

    recompute_connections(vec![
        PitchNote::new(first_rect, first_points),
        PitchNote::new(second_rect, initial_pitch_points(&second_rect)),
        PitchNote::new(third_rect, initial_pitch_points(&third_rect)),
    ])
}
