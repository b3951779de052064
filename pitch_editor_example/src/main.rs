use eframe::egui;
use egui_pitch::curve::svg_path;
use egui_pitch::{EditorEvent, GridLayout, PitchEditor, PitchEditorOptions};
use std::path::PathBuf;

/// Optional path to a JSON grid layout.
const LAYOUT_ENV: &str = "PITCH_EDITOR_LAYOUT";

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "egui_pitch Example",
        native_options,
        Box::new(|_cc| Ok(Box::new(PitchEditorApp::new()))),
    )
}

fn load_layout() -> GridLayout {
    let Some(path) = std::env::var_os(LAYOUT_ENV).map(PathBuf::from) else {
        return GridLayout::default();
    };
    match GridLayout::load_from_path(&path) {
        Ok(layout) => {
            log::info!("Loaded grid layout from {}", path.display());
            layout
        }
        Err(err) => {
            log::error!("Failed to load grid layout from {}: {}", path.display(), err);
            GridLayout::default()
        }
    }
}

struct PitchEditorApp {
    editor: PitchEditor,
}

impl PitchEditorApp {
    fn new() -> Self {
        let options = PitchEditorOptions {
            with_demo_notes: true,
            ..PitchEditorOptions::with_layout(load_layout())
        };
        Self {
            editor: PitchEditor::new(options),
        }
    }
}

impl eframe::App for PitchEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor.ui(ui);
        });

        for event in self.editor.take_events() {
            match &event {
                EditorEvent::GestureStarted { .. } | EditorEvent::GestureEnded { .. } => {
                    log::debug!("[PitchEditorEvent] {:?}", event);
                }
                EditorEvent::NoteUpdated { after, .. } => {
                    log::info!("[PitchEditorEvent] {:?}", event);
                    log::debug!("note {:?} curve: {}", after.id, svg_path(&after.points));
                }
                _ => log::info!("[PitchEditorEvent] {:?}", event),
            }
        }
    }
}
