use base64::Engine as _;

use super::*;
use crate::assets::executor::InlineExecutor;
use crate::interact::controller::{InteractionState, WheelEvent};

fn png_data_uri(w: u32, h: u32, px: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn session() -> EditorSession {
    let mut s = EditorSession::with_executor(EditorOpts::default(), Arc::new(InlineExecutor)).unwrap();
    s.set_layout_width(320.0);
    s
}

fn settle(s: &mut EditorSession) {
    assert!(s.pump_until_idle(Duration::from_secs(5)));
}

#[track_caller]
fn assert_pixel_near(frame: &FrameRGBA, x: u32, y: u32, expected: [u8; 4]) {
    let actual = frame.pixel(x, y).unwrap();
    let close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 2);
    assert!(close, "pixel ({x}, {y}) = {actual:?}, expected ~{expected:?}");
}

#[test]
fn fresh_session_renders_placeholder() {
    let mut s = session();
    assert!(s.overlays().is_empty());
    assert_eq!(s.selection(), None);

    let placeholder = RenderStyle::default().placeholder.to_premul_array();
    let frame = s.frame().unwrap();
    assert_eq!((frame.width, frame.height), (320, 320));
    assert_pixel_near(frame, 160, 160, placeholder);
}

#[test]
fn default_layout_is_the_largest_surface() {
    let s = EditorSession::with_executor(EditorOpts::default(), Arc::new(InlineExecutor)).unwrap();
    assert_eq!(s.viewport().unwrap().size, MAX_VIEWPORT);
}

#[test]
fn invalid_options_are_rejected() {
    let opts = EditorOpts {
        device_pixel_ratio: 0.0,
        ..EditorOpts::default()
    };
    assert!(EditorSession::with_executor(opts, Arc::new(InlineExecutor)).is_err());

    let opts = EditorOpts {
        font_path: Some(PathBuf::from("/definitely/not/a/font.ttf")),
        ..EditorOpts::default()
    };
    assert!(EditorSession::with_executor(opts, Arc::new(InlineExecutor)).is_err());

    let opts = EditorOpts {
        decode_threads: Some(0),
        ..EditorOpts::default()
    };
    assert!(EditorSession::new(opts).is_err());

    let mut s = session();
    assert!(s.set_device_pixel_ratio(f64::NAN).is_err());
    assert!(s.set_device_pixel_ratio(2.0).is_ok());
    assert_eq!(s.frame().unwrap().width, 640);
}

#[test]
fn factory_assigns_unique_ids_and_centers_new_overlays() {
    let mut s = session();
    let a = s.add_image(png_data_uri(4, 4, [0, 255, 0, 255])).unwrap();
    let t = s.add_text("hello").unwrap();
    assert_ne!(a, t);

    let overlays = s.overlays();
    assert_eq!(overlays[0].id, a);
    assert_eq!(overlays[0].position, Point::new(160.0, 160.0));
    assert_eq!(overlays[0].scale, NEW_IMAGE_SCALE);
    assert_eq!(overlays[0].rotation, 0.0);
    assert_eq!(overlays[1].id, t);
    assert_eq!(overlays[1].label(), Some("hello"));
    assert_eq!(overlays[1].scale, NEW_TEXT_SCALE);
}

#[test]
fn image_overlay_appears_once_resolved() {
    let mut s = session();
    let id = s.add_image(png_data_uri(20, 20, [0, 255, 0, 255])).unwrap();
    let placeholder = RenderStyle::default().placeholder.to_premul_array();

    // Completions are only applied on pump.
    assert_pixel_near(s.frame().unwrap(), 160, 160, placeholder);
    settle(&mut s);
    assert!(s.cache().overlay_bitmap(&id).is_some());

    let frame = s.frame().unwrap();
    // 20px at scale 0.6 spans 154..166.
    assert_pixel_near(frame, 160, 160, [0, 255, 0, 255]);
    assert_pixel_near(frame, 150, 160, placeholder);
}

#[test]
fn base_photo_replaces_placeholder() {
    let mut s = session();
    assert!(s.set_base_source(Some(&png_data_uri(8, 8, [0, 0, 255, 255]))));
    settle(&mut s);
    assert!(s.cache().base().is_some());
    assert_pixel_near(s.frame().unwrap(), 5, 5, [0, 0, 255, 255]);

    assert!(s.set_base_source(None));
    assert!(s.cache().base().is_none());
}

#[test]
fn select_then_zoom_in() {
    let mut s = session();
    s.set_layout_width(600.0);
    let id = s.add_image(png_data_uri(10, 10, [255, 0, 0, 255])).unwrap();
    settle(&mut s);
    assert_eq!(s.overlays()[0].position, Point::new(300.0, 300.0));

    assert_eq!(s.pointer_down(PointerEvent::at(300.0, 300.0)), Some(id.as_str()));
    s.pointer_up(PointerEvent::at(300.0, 300.0));

    assert!(s.wheel(WheelEvent {
        delta_y: -1.0,
        modifier: false,
    }));
    assert!((s.overlays()[0].scale - 0.648).abs() < 1e-12);
    assert_eq!(s.overlays()[0].rotation, 0.0);
}

#[test]
fn drag_moves_overlay_and_bumps_revision() {
    let mut s = session();
    s.add_text("drag me").unwrap();
    let before = s.overlays_revision();

    s.pointer_down(PointerEvent::at(170.0, 150.0));
    assert!(matches!(
        s.controller().state(),
        InteractionState::Dragging { .. }
    ));
    assert!(s.pointer_move(PointerEvent::at(200.0, 100.0)));
    assert_eq!(s.overlays()[0].position, Point::new(190.0, 110.0));
    assert!(s.overlays_revision() > before);

    s.pointer_up(PointerEvent::at(200.0, 100.0));
    assert!(!s.pointer_move(PointerEvent::at(10.0, 10.0)));
    assert_eq!(s.overlays()[0].position, Point::new(190.0, 110.0));
}

#[test]
fn wheel_without_selection_does_not_suppress_scrolling() {
    let mut s = session();
    s.add_text("idle").unwrap();
    let revision = s.overlays_revision();
    assert!(!s.wheel(WheelEvent {
        delta_y: 1.0,
        modifier: false,
    }));
    assert_eq!(s.overlays_revision(), revision);
}

#[test]
fn undo_and_clear_prune_selection() {
    let mut s = session();
    s.add_text("bottom").unwrap();
    let top = s.add_text("top").unwrap();
    s.pointer_down(PointerEvent::at(160.0, 160.0));
    s.pointer_up(PointerEvent::at(160.0, 160.0));
    // Both anchors coincide; the lower overlay wins the tie.
    assert_ne!(s.selection(), Some(top.as_str()));
    let bottom = s.selection().map(str::to_owned);

    assert!(s.undo_last());
    assert_eq!(s.overlays().len(), 1);
    assert_eq!(s.selection().map(str::to_owned), bottom);

    s.clear();
    assert!(s.overlays().is_empty());
    assert_eq!(s.selection(), None);
    assert!(!s.undo_last());
}

#[test]
fn failed_decode_keeps_overlay_selectable() {
    let mut s = session();
    let id = s.add_image("missing/sticker.png").unwrap();
    settle(&mut s);
    assert!(s.cache().is_failed(&id));
    assert!(s.cache().overlay_bitmap(&id).is_none());

    assert_eq!(s.pointer_down(PointerEvent::at(160.0, 160.0)), Some(id.as_str()));
    assert!(s.pointer_move(PointerEvent::at(100.0, 100.0)));
    settle(&mut s);
    // Failed ids are not re-requested by later revisions.
    assert!(s.cache().is_idle());
    assert!(s.cache().is_failed(&id));
}

#[test]
fn set_overlays_rejects_duplicate_ids() {
    let mut s = session();
    let dup = vec![
        OverlayItem::text("x", "a", Point::new(1.0, 1.0)),
        OverlayItem::text("x", "b", Point::new(2.0, 2.0)),
    ];
    assert!(s.set_overlays(dup).is_err());
    assert!(s.overlays().is_empty());

    let ok = vec![OverlayItem::text("x", "a", Point::new(1.0, 1.0))];
    s.set_overlays(ok.clone()).unwrap();
    assert_eq!(s.overlays(), ok.as_slice());
}

#[test]
fn frame_is_memoized_until_an_input_changes() {
    let mut s = session();
    s.add_text("memo").unwrap();
    let first = s.frame().unwrap().data.as_ptr();
    let second = s.frame().unwrap().data.as_ptr();
    assert_eq!(first, second);

    s.pointer_down(PointerEvent::at(160.0, 160.0));
    let selected = s.frame().unwrap().clone();
    s.pointer_up(PointerEvent::at(160.0, 160.0));
    s.pointer_down(PointerEvent::at(900.0, 900.0));
    let deselected = s.frame().unwrap().clone();
    assert_ne!(selected, deselected);
}

#[test]
fn export_writes_png() {
    let dir = std::env::temp_dir().join(format!(
        "overlayer_session_export_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let out = dir.join("frame.png");

    let mut s = session();
    s.export_png(&out).unwrap();
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (320, 320));

    std::fs::remove_dir_all(&dir).ok();
}
