use inkboard_core::shapes::{Image, ImageFormat};
use inkboard_core::{
    DocumentError, PointerEvent, SerializableColor, Shape, ShapeTrait, ToolKind, Whiteboard,
};
use kurbo::{Point, Rect};
use std::io::Cursor;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn drag(board: &mut Whiteboard, from: (f64, f64), to: (f64, f64)) {
    board.handle_pointer(PointerEvent::down(from.0, from.1));
    board.handle_pointer(PointerEvent::moved((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
    board.handle_pointer(PointerEvent::moved(to.0, to.1));
    board.handle_pointer(PointerEvent::up(to.0, to.1));
}

#[test]
fn rectangle_example() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Rectangle);
    drag(&mut board, (100.0, 100.0), (160.0, 170.0));

    let doc = &board.canvas().document;
    assert_eq!(doc.len(), 1);
    let Shape::Rectangle(rect) = &doc.objects[0] else {
        panic!("expected a rectangle");
    };
    assert_eq!(rect.position, Point::new(100.0, 100.0));
    assert_eq!((rect.width, rect.height), (60.0, 70.0));
}

#[test]
fn every_shape_tool_normalizes_its_box() {
    for tool in [
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Triangle,
        ToolKind::Line,
    ] {
        let mut board = Whiteboard::default();
        board.select_tool(tool);
        drag(&mut board, (200.0, 150.0), (120.0, 90.0));

        let doc = &board.canvas().document;
        assert_eq!(doc.len(), 1, "{tool:?}");
        let bounds = doc.objects[0].bounds();
        assert!(bounds.width() >= 0.0 && bounds.height() >= 0.0);
        assert_eq!((bounds.x0, bounds.y0), (120.0, 90.0), "{tool:?}");
        assert_eq!((bounds.x1, bounds.y1), (200.0, 150.0), "{tool:?}");
    }
}

#[test]
fn shapes_use_current_style() {
    let mut board = Whiteboard::default();
    let red = SerializableColor::new(255, 0, 0, 255);
    board.set_color(red);
    board.set_width(9);
    board.set_fill(true);
    board.select_tool(ToolKind::Ellipse);
    drag(&mut board, (0.0, 0.0), (40.0, 20.0));

    let style = board.canvas().document.objects[0].style();
    assert_eq!(style.stroke_color, red);
    assert_eq!(style.stroke_width, 9.0);
    assert_eq!(style.fill_color, Some(red));
}

#[test]
fn switching_tools_unbinds_previous_shape() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Rectangle);
    board.handle_pointer(PointerEvent::down(10.0, 10.0));
    board.handle_pointer(PointerEvent::moved(50.0, 50.0));

    let transition = board.select_tool(ToolKind::Ellipse);
    assert_eq!(transition.from, ToolKind::Rectangle);
    assert!(transition.unbound.press && transition.unbound.moves && transition.unbound.release);

    board.handle_pointer(PointerEvent::moved(300.0, 300.0));
    board.handle_pointer(PointerEvent::up(300.0, 300.0));

    let doc = &board.canvas().document;
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.objects[0].bounds(), Rect::new(10.0, 10.0, 50.0, 50.0));
}

#[test]
fn width_is_clamped_and_reaches_brush() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Pencil);
    assert_eq!(board.set_width(0), 1);
    assert_eq!(board.set_width(21), 20);
    assert_eq!(board.tools().brush().unwrap().width, 20.0);

    drag(&mut board, (0.0, 0.0), (30.0, 30.0));
    let doc = &board.canvas().document;
    assert_eq!(doc.type_tags(), vec!["path"]);
    assert_eq!(doc.objects[0].style().stroke_width, 20.0);
}

#[test]
fn pencil_commits_one_path_per_stroke() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Pencil);
    drag(&mut board, (0.0, 0.0), (10.0, 10.0));
    drag(&mut board, (50.0, 0.0), (60.0, 40.0));
    assert_eq!(board.canvas().document.type_tags(), vec!["path", "path"]);
    assert!(board.stroke_preview().is_none());
}

#[test]
fn eraser_attaches_to_objects_but_keeps_them() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Line);
    drag(&mut board, (0.0, 50.0), (200.0, 50.0));
    let line_id = board.canvas().document.objects[0].id();

    board.select_tool(ToolKind::Eraser);
    board.set_width(10);
    drag(&mut board, (100.0, 30.0), (100.0, 70.0));

    let doc = &board.canvas().document;
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.erasures_for(line_id).len(), 1);
    assert_eq!(doc.erasures_for(line_id)[0].width, 10.0);
}

#[test]
fn drawing_tools_lock_objects() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Rectangle);
    drag(&mut board, (0.0, 0.0), (100.0, 100.0));
    let id = board.canvas().document.objects[0].id();
    assert!(!board.canvas().is_selectable(id));

    board.select_tool(ToolKind::Select);
    assert!(board.canvas().is_selectable(id));
    board.handle_pointer(PointerEvent::down(0.0, 50.0));
    board.handle_pointer(PointerEvent::up(0.0, 50.0));
    assert_eq!(board.canvas().selection, vec![id]);
    assert_eq!(board.delete_selected(), 1);
    assert!(board.canvas().document.is_empty());
}

fn saved_two_rectangles() -> serde_json::Value {
    let mut source = Whiteboard::default();
    source.select_tool(ToolKind::Rectangle);
    drag(&mut source, (0.0, 0.0), (40.0, 40.0));
    drag(&mut source, (60.0, 0.0), (100.0, 40.0));
    source.serialize().unwrap()
}

fn object_ids(board: &Whiteboard) -> Vec<inkboard_core::ShapeId> {
    board.canvas().document.objects.iter().map(|shape| shape.id()).collect()
}

#[test]
fn loading_while_drawing_keeps_objects_locked() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Rectangle);
    board.deserialize(saved_two_rectangles()).unwrap();

    let ids = object_ids(&board);
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| !board.canvas().is_selectable(*id)));
    assert!(!board.canvas().multi_select());
}

#[test]
fn loading_while_selecting_unlocks_objects() {
    let mut board = Whiteboard::default();
    assert_eq!(board.mode(), ToolKind::Select);
    board.deserialize(saved_two_rectangles()).unwrap();

    let ids = object_ids(&board);
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| board.canvas().is_selectable(*id)));
    assert!(board.canvas().multi_select());
}

#[test]
fn import_and_upload_follow_lock_policy() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Pencil);
    board
        .import_fabric(&serde_json::json!({
            "objects": [{"type": "rect", "left": 0, "top": 0, "width": 5, "height": 5}]
        }))
        .unwrap();
    let imported = object_ids(&board)[0];
    assert!(!board.canvas().is_selectable(imported));

    board.select_tool(ToolKind::Ellipse);
    let uploaded = board.upload_image(&png(4, 4)).unwrap();
    assert!(!board.canvas().is_selectable(uploaded));

    board.select_tool(ToolKind::Select);
    assert!(board.canvas().is_selectable(imported));
    assert!(board.canvas().is_selectable(uploaded));
}

#[test]
fn serialize_empty_canvas() {
    let board = Whiteboard::default();
    let value = board.serialize().unwrap();
    assert_eq!(value["objects"], serde_json::json!([]));
    assert!(value["backgroundImage"].is_null());
}

#[test]
fn round_trip_keeps_tags_and_count() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Rectangle);
    drag(&mut board, (0.0, 0.0), (10.0, 10.0));
    board.select_tool(ToolKind::Triangle);
    drag(&mut board, (20.0, 0.0), (40.0, 10.0));
    board.select_tool(ToolKind::Pencil);
    drag(&mut board, (0.0, 50.0), (40.0, 60.0));
    board.select_tool(ToolKind::Text);
    board.upload_image(&png(3, 2)).unwrap();

    let saved = board.serialize().unwrap();
    let mut other = Whiteboard::default();
    other.deserialize(saved).unwrap();
    assert_eq!(
        other.canvas().document.type_tags(),
        vec!["rect", "triangle", "path", "text", "image"]
    );
}

#[test]
fn failed_deserialize_leaves_board_unchanged() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Text);
    let before = board.serialize().unwrap();

    assert!(matches!(
        board.deserialize(serde_json::Value::Null),
        Err(DocumentError::Empty)
    ));
    assert!(matches!(
        board.deserialize(serde_json::json!({"objects": [{"type": "hexagon"}]})),
        Err(DocumentError::Malformed(_))
    ));
    assert!(matches!(
        board.deserialize_str("{"),
        Err(DocumentError::Parse(_))
    ));
    assert_eq!(board.serialize().unwrap(), before);
}

#[test]
fn clear_keeps_background_and_is_idempotent() {
    let mut board = Whiteboard::default();
    board.set_background_image(&png(10, 5)).unwrap();
    board.select_tool(ToolKind::Text);
    board.upload_image(&png(2, 2)).unwrap();

    board.clear();
    let once = board.serialize().unwrap();
    board.clear();
    let twice = board.serialize().unwrap();

    assert_eq!(once, twice);
    assert!(board.canvas().document.is_empty());
    let bg = board.canvas().document.background_image.as_ref().unwrap();
    // Scaled to cover the 720x400 canvas
    assert_eq!((bg.width, bg.height), (800.0, 400.0));
}

#[test]
fn upload_image_natural_size() {
    let mut board = Whiteboard::default();
    let id = board.upload_image(&png(30, 20)).unwrap();
    let shape = board.canvas().document.get_shape(id).unwrap();
    assert_eq!(shape.bounds(), Rect::new(0.0, 0.0, 30.0, 20.0));
    assert_eq!(shape.as_image().unwrap().format, ImageFormat::Png);

    assert!(board.upload_image(b"GIF89a....").is_err());
    assert_eq!(board.canvas().document.len(), 1);
}

#[test]
fn boards_are_independent() {
    let mut a = Whiteboard::default();
    let b = Whiteboard::default();
    a.select_tool(ToolKind::Text);
    a.set_width(17);
    assert!(b.canvas().document.is_empty());
    assert_eq!(b.controller().width(), 5);
}

#[test]
fn import_fabric_replaces_document() {
    let mut board = Whiteboard::default();
    board.select_tool(ToolKind::Text);
    board
        .import_fabric(&serde_json::json!({
            "version": "4.6.0",
            "objects": [
                {"type": "rect", "left": 1, "top": 2, "width": 3, "height": 4, "fill": "#000"},
                {"type": "triangle", "left": 0, "top": 0, "width": 10, "height": 10, "stroke": "black"}
            ]
        }))
        .unwrap();
    assert_eq!(board.canvas().document.type_tags(), vec!["rect", "triangle"]);
}

#[test]
fn image_shape_keeps_payload() {
    let data = png(4, 4);
    let img = Image::from_bytes(Point::new(1.0, 1.0), &data).unwrap();
    assert_eq!(img.data().unwrap(), data);
    assert_eq!(img.bounds(), Rect::new(1.0, 1.0, 5.0, 5.0));
}
