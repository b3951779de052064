//! Note connections
//!
//! Two notes are connected when the right edge of the earlier one touches the
//! left edge of the later one. Connected curves are forced to meet at a
//! shared height with flat tangents so the pitch line stays smooth across
//! the boundary. Nothing here is cached: callers recompute after every edit.

use crate::structure::{NoteId, PitchNote, CONNECTION_TOLERANCE, HANDLE_OFFSET};

/// A joint between two notes, for drawing connection markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    /// Index of the earlier note in the slice that was scanned.
    pub from: usize,
    /// Index of the later note in the slice that was scanned.
    pub to: usize,
    pub from_id: NoteId,
    pub to_id: NoteId,
    pub x: f32,
    pub y: f32,
}

pub fn are_notes_connected(earlier: &PitchNote, later: &PitchNote) -> bool {
    (earlier.rect.right() - later.rect.x).abs() <= CONNECTION_TOLERANCE
}

fn order_by_start(notes: &[PitchNote]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..notes.len()).collect();
    order.sort_by(|&a, &b| notes[a].rect.x.total_cmp(&notes[b].rect.x));
    order
}

fn join(earlier: &mut PitchNote, later: &mut PitchNote) {
    let earlier_mid = earlier.rect.middle_y();
    let later_mid = later.rect.middle_y();
    let (Some(last), Some(first)) = (earlier.points.last_mut(), later.points.first_mut()) else {
        return;
    };

    let y = (last.y + first.y) / 2.0;
    last.y = y;
    last.y_offset = y - earlier_mid;
    first.y = y;
    first.y_offset = y - later_mid;

    let last_x = last.x;
    if let Some(cp2) = last.cp2.as_mut() {
        cp2.x = last_x - HANDLE_OFFSET;
        cp2.y = y;
        cp2.y_offset = y - earlier_mid;
    }
    let first_x = first.x;
    if let Some(cp1) = first.cp1.as_mut() {
        cp1.x = first_x + HANDLE_OFFSET;
        cp1.y = y;
        cp1.y_offset = y - later_mid;
    }
}

/// Sorts notes by start and joins every connected neighbour pair.
///
/// The shared height is the average of the two endpoint heights, so running
/// this repeatedly keeps pulling both sides towards each other. The returned
/// vector is in x order, not in the order it was given.
pub fn recompute_connections(notes: Vec<PitchNote>) -> Vec<PitchNote> {
    let mut sorted = notes;
    sorted.sort_by(|a, b| a.rect.x.total_cmp(&b.rect.x));
    for i in 1..sorted.len() {
        let (head, tail) = sorted.split_at_mut(i);
        let earlier = &mut head[i - 1];
        let later = &mut tail[0];
        if are_notes_connected(earlier, later) {
            join(earlier, later);
        }
    }
    sorted
}

/// Lists the joints between notes, with indices into `notes` as given.
pub fn find_connections(notes: &[PitchNote]) -> Vec<Connection> {
    let order = order_by_start(notes);
    order
        .windows(2)
        .filter_map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let earlier = &notes[from];
            let later = &notes[to];
            if !are_notes_connected(earlier, later) {
                return None;
            }
            let last_y = earlier.last_point()?.y;
            let first_y = later.first_point()?.y;
            Some(Connection {
                from,
                to,
                from_id: earlier.id,
                to_id: later.id,
                x: earlier.rect.right(),
                y: (last_y + first_y) / 2.0,
            })
        })
        .collect()
}
