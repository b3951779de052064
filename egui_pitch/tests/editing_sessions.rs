use egui::{vec2, Key, Pos2};
use egui_pitch::{
    hit_test, EditorCommand, EditorEvent, EditorMode, GridLayout, HitTarget, NoteId, PitchEditor,
    PitchEditorOptions, PointKind,
};

const EPS: f32 = 1e-3;

/// Four measures of 160px in 4/4, so every time division is 40px wide.
fn even_layout() -> GridLayout {
    GridLayout {
        measure_width: 160.0,
        ..GridLayout::default()
    }
}

fn editor_with(layout: GridLayout) -> PitchEditor {
    PitchEditor::new(PitchEditorOptions::with_layout(layout))
}

fn target(editor: &PitchEditor, pos: Pos2) -> HitTarget {
    hit_test(editor.notes(), editor.selected(), editor.mode(), pos, editor.grid())
}

fn draw(editor: &mut PitchEditor, pos: Pos2) -> NoteId {
    editor.apply_command(EditorCommand::SetMode(EditorMode::Draw));
    let hit = target(editor, pos);
    editor.click(pos, hit);
    editor.apply_command(EditorCommand::SetMode(EditorMode::Select));
    editor.selected().expect("drawn note is selected")
}

fn drag(editor: &mut PitchEditor, from: Pos2, to: Pos2) {
    let hit = target(editor, from);
    assert!(editor.pointer_down(from, hit), "no gesture at {:?}", from);
    let steps = 8;
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        editor.pointer_move(from + (to - from) * t);
    }
    editor.pointer_up();
}

fn body_of(editor: &PitchEditor, id: NoteId) -> Pos2 {
    let rect = editor.note_by_id(id).unwrap().rect;
    Pos2::new(rect.middle_x(), rect.y + 3.0)
}

fn assert_invariants(editor: &PitchEditor) {
    let grid = editor.grid();
    let notes = editor.notes();
    for pair in notes.windows(2) {
        assert!(pair[0].rect.x <= pair[1].rect.x, "notes not sorted by start");
    }
    for note in notes {
        let rect = note.rect;
        assert!(rect.x >= grid.piano_key_width - EPS, "{:?}", rect);
        assert!(rect.right() <= grid.grid_width + EPS, "{:?}", rect);
        assert!(rect.y >= -EPS, "{:?}", rect);
        assert!(rect.bottom() <= grid.grid_height + EPS, "{:?}", rect);
        assert!(rect.width >= grid.min_note_width - EPS, "{:?}", rect);

        assert!((2..=5).contains(&note.points.len()));
        assert!((note.points[0].x - rect.x).abs() < EPS);
        assert!((note.points[note.points.len() - 1].x - rect.right()).abs() < EPS);
        for point in &note.points {
            assert!(point.x >= rect.x - EPS && point.x <= rect.right() + EPS);
            assert!((point.y - (rect.middle_y() + point.y_offset)).abs() < EPS);
        }
    }
    for connection in editor.connections() {
        let last = notes[connection.from].last_point().unwrap();
        let first = notes[connection.to].first_point().unwrap();
        assert!((last.y - first.y).abs() < EPS, "joint heights differ");
    }
}

#[test]
fn dragging_far_left_stops_at_the_piano_keys() {
    let mut editor = editor_with(even_layout());
    let id = draw(&mut editor, Pos2::new(300.0, 100.0));
    let from = body_of(&editor, id);
    drag(&mut editor, from, from - vec2(800.0, 0.0));

    let rect = editor.note_by_id(id).unwrap().rect;
    assert_eq!(rect.x, editor.grid().piano_key_width);
    assert_invariants(&editor);
}

#[test]
fn dragging_past_the_bottom_stops_at_the_last_row() {
    let mut editor = editor_with(even_layout());
    let id = draw(&mut editor, Pos2::new(300.0, 100.0));
    let from = body_of(&editor, id);
    drag(&mut editor, from, from + vec2(0.0, 2000.0));

    let rect = editor.note_by_id(id).unwrap().rect;
    assert!((rect.bottom() - editor.grid().grid_height).abs() < EPS);
}

#[test]
fn drawing_an_adjacent_note_joins_the_curves() {
    let mut editor = editor_with(even_layout());
    let a = draw(&mut editor, Pos2::new(150.0, 100.0));
    let b = draw(&mut editor, Pos2::new(250.0, 200.0));

    let note_a = editor.note_by_id(a).unwrap().clone();
    let note_b = editor.note_by_id(b).unwrap().clone();
    assert_eq!(note_a.rect.x, 130.0);
    assert_eq!(note_b.rect.x, note_a.rect.right());

    let joint_a = note_a.last_point().unwrap().y;
    let joint_b = note_b.first_point().unwrap().y;
    assert_eq!(joint_a, joint_b);
    assert_eq!(joint_a, (note_a.rect.middle_y() + note_b.rect.middle_y()) / 2.0);
    assert_eq!(editor.connections().len(), 1);
}

#[test]
fn moving_a_note_away_breaks_the_joint() {
    let mut editor = editor_with(even_layout());
    let a = draw(&mut editor, Pos2::new(150.0, 100.0));
    let b = draw(&mut editor, Pos2::new(250.0, 200.0));
    assert_eq!(editor.connections().len(), 1);

    let from = body_of(&editor, b);
    drag(&mut editor, from, from + vec2(120.0, 0.0));
    assert!(editor.connections().is_empty());
    assert!(editor.note_by_id(a).is_some());
}

#[test]
fn delete_mode_removes_the_clicked_note_only() {
    let mut editor = editor_with(even_layout());
    let first = draw(&mut editor, Pos2::new(150.0, 60.0));
    let second = draw(&mut editor, Pos2::new(400.0, 160.0));
    let third = draw(&mut editor, Pos2::new(600.0, 260.0));
    editor.apply_command(EditorCommand::SelectNote(Some(third)));
    editor.take_events();

    editor.apply_command(EditorCommand::SetMode(EditorMode::Delete));
    let pos = body_of(&editor, second);
    let hit = target(&editor, pos);
    assert_eq!(hit, HitTarget::NoteBody(second));
    editor.click(pos, hit);

    assert_eq!(editor.notes().len(), 2);
    assert!(editor.note_by_id(first).is_some());
    assert_eq!(editor.selected(), Some(third));
    assert_eq!(editor.selected_index(), Some(1));

    let events = editor.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EditorEvent::NoteDeleted(note) if note.id == second)));
}

#[test]
fn bending_and_deleting_a_curve_point() {
    let mut editor = editor_with(even_layout());
    let id = draw(&mut editor, Pos2::new(300.0, 150.0));
    editor.apply_command(EditorCommand::AddCurvePoint);
    assert_eq!(editor.note_by_id(id).unwrap().points.len(), 3);

    let anchor = editor.note_by_id(id).unwrap().points[1].pos();
    assert!(matches!(
        target(&editor, anchor),
        HitTarget::Point {
            index: 1,
            kind: PointKind::Anchor,
            ..
        }
    ));
    drag(&mut editor, anchor, anchor + vec2(500.0, -40.0));

    let note = editor.note_by_id(id).unwrap().clone();
    let bent = note.points[1];
    assert!(bent.x <= note.points[2].x - 10.0 + EPS);
    assert!((bent.y - (anchor.y - 40.0)).abs() < EPS);
    assert!((bent.y_offset - (bent.y - note.rect.middle_y())).abs() < EPS);
    assert_invariants(&editor);

    assert!(editor.key_pressed(Key::Delete));
    assert_eq!(editor.note_by_id(id).unwrap().points.len(), 2);
    assert!(editor.active_point().is_none());
}

#[test]
fn moving_keeps_the_curve_shape() {
    let mut editor = editor_with(even_layout());
    let id = draw(&mut editor, Pos2::new(300.0, 150.0));
    editor.apply_command(EditorCommand::AddCurvePoint);
    let anchor = editor.note_by_id(id).unwrap().points[1].pos();
    drag(&mut editor, anchor, anchor - vec2(0.0, 30.0));
    let before = editor.note_by_id(id).unwrap().clone();

    let from = body_of(&editor, id);
    drag(&mut editor, from, from + vec2(80.0, 32.0));
    let after = editor.note_by_id(id).unwrap().clone();

    let dx = after.rect.x - before.rect.x;
    let dy = after.rect.y - before.rect.y;
    assert_eq!((dx, dy), (80.0, 32.0));
    for (old, new) in before.points.iter().zip(&after.points) {
        assert!((new.x - old.x - dx).abs() < EPS);
        assert!((new.y - old.y - dy).abs() < EPS);
        assert_eq!(new.y_offset, old.y_offset);
    }
}

#[test]
fn scripted_session_keeps_every_note_valid() {
    let mut editor = editor_with(even_layout());
    let mut rng = fastrand::Rng::with_seed(7);
    let mut next = move |range: f32| rng.f32() * range;

    let ids: Vec<NoteId> = [
        Pos2::new(120.0, 40.0),
        Pos2::new(300.0, 120.0),
        Pos2::new(500.0, 250.0),
        Pos2::new(650.0, 330.0),
    ]
    .into_iter()
    .map(|pos| draw(&mut editor, pos))
    .collect();
    assert_invariants(&editor);

    for round in 0..60 {
        let id = ids[round % ids.len()];
        editor.apply_command(EditorCommand::SelectNote(Some(id)));
        let rect = editor.note_by_id(id).unwrap().rect;
        let delta = vec2(next(600.0) - 300.0, next(400.0) - 200.0);
        let from = match round % 3 {
            0 => Pos2::new(rect.middle_x(), rect.y + 3.0),
            1 => Pos2::new(rect.x + 1.0, rect.y + 3.0),
            _ => Pos2::new(rect.right() - 1.0, rect.y + 3.0),
        };
        let hit = target(&editor, from);
        if hit.note_id() == Some(id) && editor.pointer_down(from, hit) {
            editor.pointer_move(from + delta * 0.5);
            editor.pointer_move(from + delta);
            editor.pointer_up();
        }
        if round % 7 == 0 {
            editor.apply_command(EditorCommand::AddCurvePoint);
        }
        assert_invariants(&editor);
    }
    assert!(editor.gesture().is_idle());
}

#[test]
fn layout_from_json_drives_the_grid() {
    let layout = GridLayout::from_json(r#"{ "pitch_count": 12, "measure_width": 160.0 }"#)
        .expect("valid layout");
    let mut editor = editor_with(layout);
    assert_eq!(editor.grid().grid_height, 12.0 * 16.0);
    assert_eq!(editor.grid().vertical_snap, 40.0);

    editor.apply_command(EditorCommand::SetMode(EditorMode::Draw));
    let below = Pos2::new(300.0, 500.0);
    let hit = target(&editor, below);
    editor.click(below, hit);
    assert!(editor.notes().is_empty(), "clicks below the grid create nothing");
}

#[test]
fn host_listener_follows_commands() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    let mut editor = editor_with(even_layout());
    editor.set_event_listener(move |event| {
        if let EditorEvent::NoteUpdated { after, .. } = event {
            sink.borrow_mut().push(after.points.len());
        }
    });

    let id = draw(&mut editor, Pos2::new(300.0, 150.0));
    editor.apply_command(EditorCommand::AddCurvePoint);
    editor.apply_command(EditorCommand::AddCurvePoint);
    editor.apply_command(EditorCommand::DeleteCurvePoint { note_id: id, index: 1 });

    assert_eq!(*updates.borrow(), vec![3, 4, 3]);
    let queued = editor
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, EditorEvent::NoteUpdated { .. }))
        .count();
    assert_eq!(queued, 3);
}
