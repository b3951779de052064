use crate::connection::Connection;
use crate::curve::curve_segments;
use crate::hit::{PointKind, ANCHOR_RADIUS, HANDLE_RADIUS};
use crate::interaction::ActivePoint;
use crate::structure::{GridConfig, GridLayout, HandleKind, PitchNote};
use egui::epaint::CubicBezierShape;
use egui::*;

const BLACK_KEYS: [u32; 5] = [1, 3, 6, 8, 10];

const NOTE_FILL: Color32 = Color32::from_rgb(70, 110, 160);
const NOTE_FILL_SELECTED: Color32 = Color32::from_rgb(90, 140, 200);
const CURVE_COLOR: Color32 = Color32::from_rgb(255, 200, 90);
const HANDLE_COLOR: Color32 = Color32::from_rgb(120, 220, 255);
const CONNECTED_EDGE: Color32 = Color32::from_rgb(120, 230, 140);

const GUIDE_DASH: f32 = 4.0;
const GUIDE_GAP: f32 = 3.0;

/// Dash segments of a vertical guide at `x` covering `rows`.
fn guide_dashes(x: f32, rows: Rangef) -> impl Iterator<Item = [Pos2; 2]> {
    let period = GUIDE_DASH + GUIDE_GAP;
    let count = (rows.span() / period).ceil().max(0.0) as usize;
    (0..count).map(move |i| {
        let y = rows.min + i as f32 * period;
        [pos2(x, y), pos2(x, (y + GUIDE_DASH).min(rows.max))]
    })
}

fn dashed_guide(painter: &Painter, x: f32, rows: Rangef, stroke: Stroke) {
    painter.extend(guide_dashes(x, rows).map(|dash| Shape::line_segment(dash, stroke)));
}

/// Piano keys down the left edge, pitch rows and the time-division lines.
pub fn draw_grid(painter: &Painter, origin: Pos2, grid: &GridConfig, layout: &GridLayout) {
    let area = Rect::from_min_size(origin, Vec2::new(grid.grid_width, grid.grid_height));
    painter.rect_filled(area, 0.0, Color32::from_gray(30));

    let row_height = grid.horizontal_snap;
    for row in 0..layout.pitch_count {
        let top = origin.y + row as f32 * row_height;
        // Row 0 is the highest pitch.
        let key = (layout.pitch_count - 1 - row) % 12;
        let is_black = BLACK_KEYS.contains(&key);

        let key_rect = Rect::from_min_size(
            Pos2::new(origin.x, top),
            Vec2::new(grid.piano_key_width, row_height),
        );
        let key_color = if is_black {
            Color32::from_gray(40)
        } else {
            Color32::from_gray(220)
        };
        painter.rect_filled(key_rect.shrink(0.5), 0.0, key_color);
        if key == 0 {
            painter.text(
                key_rect.right_center() - Vec2::new(4.0, 0.0),
                Align2::RIGHT_CENTER,
                format!("C{}", (layout.pitch_count - 1 - row) / 12),
                FontId::proportional(10.0),
                Color32::from_gray(60),
            );
        }

        if is_black {
            let lane = Rect::from_min_max(
                Pos2::new(origin.x + grid.piano_key_width, top),
                Pos2::new(origin.x + grid.grid_width, top + row_height),
            );
            painter.rect_filled(lane, 0.0, Color32::from_gray(26));
        }
        painter.line_segment(
            [
                Pos2::new(origin.x + grid.piano_key_width, top),
                Pos2::new(origin.x + grid.grid_width, top),
            ],
            Stroke::new(1.0, Color32::from_gray(45)),
        );
    }

    let beats_per_measure = u32::from(layout.time_signature.numerator.max(1));
    for division in 0..=grid.time_divisions {
        let x = origin.x + grid.piano_key_width + division as f32 * grid.vertical_snap;
        let stroke = if division % beats_per_measure == 0 {
            Stroke::new(1.5, Color32::from_gray(90))
        } else {
            Stroke::new(1.0, Color32::from_gray(55))
        };
        painter.line_segment(
            [Pos2::new(x, origin.y), Pos2::new(x, origin.y + grid.grid_height)],
            stroke,
        );
    }
}

pub struct NoteRenderer<'a> {
    note: &'a PitchNote,
    origin: Pos2,
    is_selected: bool,
    connected_left: bool,
    connected_right: bool,
}

impl<'a> NoteRenderer<'a> {
    pub fn new(note: &'a PitchNote, origin: Pos2) -> Self {
        Self {
            note,
            origin,
            is_selected: false,
            connected_left: false,
            connected_right: false,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }

    pub fn set_connected(&mut self, left: bool, right: bool) {
        self.connected_left = left;
        self.connected_right = right;
    }

    pub fn render(&self, painter: &Painter, grid: &GridConfig) {
        let rect = self.note.rect.to_egui(self.origin);

        if self.is_selected {
            let guide = Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 90));
            let rows = Rangef::new(self.origin.y, self.origin.y + grid.grid_height);
            dashed_guide(painter, rect.left(), rows, guide);
            dashed_guide(painter, rect.right(), rows, guide);
        }

        let fill = if self.is_selected {
            NOTE_FILL_SELECTED
        } else {
            NOTE_FILL
        };
        painter.rect_filled(rect, 3.0, fill);
        let border = if self.is_selected {
            Stroke::new(2.0, Color32::from_rgb(255, 255, 100))
        } else {
            Stroke::new(1.0, Color32::from_gray(200))
        };
        painter.rect_stroke(rect, 3.0, border);

        let edge = Stroke::new(3.0, CONNECTED_EDGE);
        if self.connected_left {
            painter.line_segment([rect.left_top(), rect.left_bottom()], edge);
        }
        if self.connected_right {
            painter.line_segment([rect.right_top(), rect.right_bottom()], edge);
        }

        self.render_curve(painter);
    }

    fn render_curve(&self, painter: &Painter) {
        let offset = self.origin.to_vec2();
        for segment in curve_segments(&self.note.points) {
            painter.add(CubicBezierShape::from_points_stroke(
                segment.translate(offset).points(),
                false,
                Color32::TRANSPARENT,
                Stroke::new(2.0, CURVE_COLOR),
            ));
        }
    }

    /// Anchors and control handles, drawn only for the note being edited.
    pub fn render_points(&self, painter: &Painter, active: Option<ActivePoint>) {
        let offset = self.origin.to_vec2();
        let active = active.filter(|a| a.note_id == self.note.id);
        let handle_line = Stroke::new(1.0, HANDLE_COLOR.gamma_multiply(0.6));

        for (index, point) in self.note.points.iter().enumerate() {
            let anchor = point.pos() + offset;
            for (handle, kind) in [
                (point.cp1, HandleKind::Cp1),
                (point.cp2, HandleKind::Cp2),
            ] {
                let Some(handle) = handle else { continue };
                let center = handle.pos() + offset;
                painter.line_segment([anchor, center], handle_line);
                let is_active = active
                    .is_some_and(|a| a.index == index && a.kind == PointKind::Handle(kind));
                let fill = if is_active { Color32::WHITE } else { HANDLE_COLOR };
                painter.circle_filled(center, HANDLE_RADIUS, fill);
            }

            let is_active =
                active.is_some_and(|a| a.index == index && a.kind == PointKind::Anchor);
            let fill = if is_active { Color32::WHITE } else { CURVE_COLOR };
            painter.circle_filled(anchor, ANCHOR_RADIUS, fill);
            painter.circle_stroke(anchor, ANCHOR_RADIUS, Stroke::new(1.0, Color32::BLACK));
        }
    }
}

pub fn draw_connection(painter: &Painter, origin: Pos2, connection: &Connection) {
    let center = origin + Vec2::new(connection.x, connection.y);
    painter.circle_filled(center, 3.0, CONNECTED_EDGE);
}
