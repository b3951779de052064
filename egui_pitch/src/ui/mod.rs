//! UI module
//!
//! egui front end for [`PitchEditor`]: paints the grid, notes and curves and
//! turns pointer and keyboard input into state-machine calls.

mod renderer;
mod toolbar;

use crate::editor::{EditorCommand, EditorMode};
use crate::hit::{hit_test, HitTarget};
use crate::interaction::PitchEditor;
use egui::*;

impl PitchEditor {
    pub fn ui(&mut self, ui: &mut Ui) {
        ui.vertical(|ui| {
            let mut commands: Vec<EditorCommand> = Vec::new();
            let mut toolbar = toolbar::Toolbar::new(self.layout(), self.mode());
            toolbar.set_note_count(self.notes().len());
            toolbar.set_selected_points(self.selected_note().map(|note| note.points.len()));
            toolbar.ui(ui, &mut |cmd| commands.push(cmd));
            for command in commands {
                self.apply_command(command);
            }

            ui.separator();

            ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.ui_grid(ui);
                });
        });

        let keys = ui.input(|i| {
            [Key::Delete, Key::Backspace]
                .into_iter()
                .filter(|key| i.key_pressed(*key))
                .collect::<Vec<_>>()
        });
        for key in keys {
            self.key_pressed(key);
        }
    }

    fn target_at(&self, local: Pos2) -> HitTarget {
        hit_test(self.notes(), self.selected(), self.mode(), local, self.grid())
    }

    fn ui_grid(&mut self, ui: &mut Ui) {
        let size = Vec2::new(self.grid().grid_width, self.grid().grid_height);
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let origin = response.rect.min;

        self.handle_grid_input(ui, &response, origin);

        let grid = *self.grid();
        renderer::draw_grid(&painter, origin, &grid, self.layout());

        let connections = self.connections();
        for (index, note) in self.notes().iter().enumerate() {
            let mut note_renderer = renderer::NoteRenderer::new(note, origin);
            note_renderer.set_selected(self.selected() == Some(note.id));
            note_renderer.set_connected(
                connections.iter().any(|c| c.to == index),
                connections.iter().any(|c| c.from == index),
            );
            note_renderer.render(&painter, &grid);
        }
        for connection in &connections {
            renderer::draw_connection(&painter, origin, connection);
        }

        // Points go on top of every note so neighbours never hide them.
        if self.mode() == EditorMode::Select {
            if let Some(note) = self.selected_note() {
                renderer::NoteRenderer::new(note, origin).render_points(&painter, self.active_point());
            }
        }
    }

    fn handle_grid_input(&mut self, ui: &mut Ui, response: &Response, origin: Pos2) {
        let to_local = |pos: Pos2| pos - origin.to_vec2();

        if let Some(hover) = response.hover_pos() {
            let icon = match self.target_at(to_local(hover)) {
                HitTarget::Edge { .. } => Some(CursorIcon::ResizeHorizontal),
                HitTarget::NoteBody(_) if self.mode() == EditorMode::Select => {
                    Some(CursorIcon::Grab)
                }
                HitTarget::Point { .. } => Some(CursorIcon::Crosshair),
                _ => None,
            };
            if let Some(icon) = icon {
                ui.output_mut(|o| o.cursor_icon = icon);
            }
        }

        if response.drag_started_by(PointerButton::Primary) {
            // The drag is only reported once the pointer has moved past the
            // threshold, so hit-test where the button went down.
            let press = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(press) = press {
                let local = to_local(press);
                let target = self.target_at(local);
                self.pointer_down(local, target);
            }
        }

        if response.dragged_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.pointer_move(to_local(pos));
            }
        }

        // Release can happen anywhere, including outside the grid.
        let primary_down = ui.input(|i| i.pointer.primary_down());
        if !self.gesture().is_idle() && (response.drag_stopped() || !primary_down) {
            self.pointer_up();
        }

        if response.double_clicked_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let target = self.target_at(to_local(pos));
                self.double_click(target);
            }
        } else if response.clicked_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = to_local(pos);
                let target = self.target_at(local);
                self.click(local, target);
            }
        }
    }
}
