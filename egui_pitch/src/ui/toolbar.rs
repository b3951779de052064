//! Toolbar module
//!
//! Mode buttons, grid layout pickers and curve-point actions shown above the
//! pitch grid.

use crate::editor::{EditorCommand, EditorMode};
use crate::structure::{GridLayout, TimeSignature, MAX_CURVE_POINTS, PITCH_COUNT_OPTIONS};
use egui::*;

pub struct Toolbar {
    layout: GridLayout,
    mode: EditorMode,
    note_count: usize,
    selected_points: Option<usize>,
}

impl Toolbar {
    pub fn new(layout: &GridLayout, mode: EditorMode) -> Self {
        Self {
            layout: layout.clone(),
            mode,
            note_count: 0,
            selected_points: None,
        }
    }

    pub fn set_note_count(&mut self, count: usize) {
        self.note_count = count;
    }

    /// Point count of the selected note, if any.
    pub fn set_selected_points(&mut self, points: Option<usize>) {
        self.selected_points = points;
    }

    pub fn ui(&mut self, ui: &mut Ui, command_callback: &mut dyn FnMut(EditorCommand)) {
        ui.horizontal(|ui| {
            for mode in EditorMode::ALL {
                if ui
                    .selectable_label(self.mode == mode, mode.label())
                    .clicked()
                    && self.mode != mode
                {
                    command_callback(EditorCommand::SetMode(mode));
                }
            }

            ui.separator();

            ui.label("Sig:");
            let current = self.layout.time_signature;
            ComboBox::from_id_salt("pitch_time_signature")
                .selected_text(current.label())
                .show_ui(ui, |ui| {
                    for signature in TimeSignature::SUPPORTED {
                        if ui
                            .selectable_label(signature == current, signature.label())
                            .clicked()
                            && signature != current
                        {
                            command_callback(EditorCommand::SetLayout(GridLayout {
                                time_signature: signature,
                                ..self.layout.clone()
                            }));
                        }
                    }
                });

            ui.label("Pitches:");
            let pitch_count = self.layout.pitch_count;
            ComboBox::from_id_salt("pitch_count")
                .selected_text(pitch_count.to_string())
                .show_ui(ui, |ui| {
                    for count in PITCH_COUNT_OPTIONS {
                        if ui
                            .selectable_label(count == pitch_count, count.to_string())
                            .clicked()
                            && count != pitch_count
                        {
                            command_callback(EditorCommand::SetLayout(GridLayout {
                                pitch_count: count,
                                ..self.layout.clone()
                            }));
                        }
                    }
                });

            ui.separator();

            let can_add = self.mode == EditorMode::Select
                && self
                    .selected_points
                    .is_some_and(|count| count < MAX_CURVE_POINTS);
            if ui
                .add_enabled(can_add, Button::new("Add point"))
                .clicked()
            {
                command_callback(EditorCommand::AddCurvePoint);
            }
            if ui
                .add_enabled(self.note_count > 0, Button::new("Clear"))
                .clicked()
            {
                command_callback(EditorCommand::ClearNotes);
            }

            ui.separator();
            ui.label(format!("Notes: {}", self.note_count));
            if let Some(points) = self.selected_points {
                ui.label(format!("Points: {}/{}", points, MAX_CURVE_POINTS));
            }
        });
    }
}
