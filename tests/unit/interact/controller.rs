use super::*;

#[derive(Default)]
struct RecordingCapture {
    captured: Vec<u64>,
    released: Vec<u64>,
    fail_release: bool,
}

impl PointerCapture for RecordingCapture {
    fn capture(&mut self, pointer_id: u64) {
        self.captured.push(pointer_id);
    }

    fn release(&mut self, pointer_id: u64) -> OverlayerResult<()> {
        self.released.push(pointer_id);
        if self.fail_release {
            return Err(crate::foundation::error::OverlayerError::validation(
                "pointer not captured",
            ));
        }
        Ok(())
    }
}

fn sticker(id: &str, x: f64, y: f64) -> OverlayItem {
    OverlayItem::image(id, format!("{id}.png"), Point::new(x, y))
}

fn wheel(delta_y: f64, modifier: bool) -> WheelEvent {
    WheelEvent { delta_y, modifier }
}

fn select(c: &mut InteractionController, overlays: &[OverlayItem], x: f64, y: f64) {
    c.pointer_down(PointerEvent::at(x, y), overlays, &mut NoCapture);
    c.pointer_up(PointerEvent::at(x, y), &mut NoCapture);
}

#[test]
fn hit_test_picks_nearest_anchor() {
    let overlays = vec![sticker("a", 100.0, 100.0), sticker("b", 200.0, 100.0)];
    assert_eq!(hit_test(&overlays, Point::new(140.0, 100.0)).unwrap().id, "a");
    assert_eq!(hit_test(&overlays, Point::new(160.0, 100.0)).unwrap().id, "b");
}

#[test]
fn hit_test_ties_go_to_the_lower_overlay() {
    let overlays = vec![sticker("a", 100.0, 100.0), sticker("b", 200.0, 100.0)];
    assert_eq!(hit_test(&overlays, Point::new(150.0, 100.0)).unwrap().id, "a");

    let stacked = vec![sticker("under", 50.0, 50.0), sticker("over", 50.0, 50.0)];
    assert_eq!(hit_test(&stacked, Point::new(60.0, 60.0)).unwrap().id, "under");
}

#[test]
fn hit_test_radius_is_inclusive() {
    let overlays = vec![sticker("a", 0.0, 0.0)];
    assert!(hit_test(&overlays, Point::new(HIT_RADIUS, 0.0)).is_some());
    assert!(hit_test(&overlays, Point::new(HIT_RADIUS + 0.5, 0.0)).is_none());
    assert!(hit_test(&[], Point::ZERO).is_none());
}

#[test]
fn pointer_down_selects_and_starts_drag() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    let mut cap = RecordingCapture::default();

    let ev = PointerEvent {
        position: Point::new(110.0, 95.0),
        pointer_id: 7,
    };
    assert_eq!(c.pointer_down(ev, &overlays, &mut cap), Some("a"));
    assert_eq!(
        c.state(),
        &InteractionState::Dragging {
            id: "a".to_string(),
            grab_offset: Vec2::new(10.0, -5.0),
        }
    );
    assert_eq!(cap.captured, vec![7]);
}

#[test]
fn pointer_down_on_empty_space_clears_selection() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 100.0, 100.0);
    assert_eq!(c.selected(), Some("a"));

    let mut cap = RecordingCapture::default();
    assert_eq!(c.pointer_down(PointerEvent::at(600.0, 600.0), &overlays, &mut cap), None);
    assert_eq!(c.selected(), None);
    assert_eq!(c.state(), &InteractionState::Idle);
    assert!(cap.captured.is_empty());
}

#[test]
fn drag_keeps_grab_point_under_pointer() {
    let overlays = vec![sticker("a", 100.0, 100.0).with_scale(1.7), sticker("b", 400.0, 400.0)];
    let mut c = InteractionController::new();
    c.pointer_down(PointerEvent::at(130.0, 80.0), &overlays, &mut NoCapture);

    let mut current = overlays.clone();
    for (x, y) in [(140.0, 90.0), (250.0, 300.0), (-20.0, 5.0)] {
        current = c.pointer_move(PointerEvent::at(x, y), &current).unwrap();
        let a = &current[0];
        assert_eq!(a.position, Point::new(x - 30.0, y + 20.0));
        assert_eq!(a.scale, 1.7);
        assert_eq!(current[1], overlays[1]);
    }
    assert_eq!(current.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn drag_accounts_for_surface_origin() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    c.set_surface_origin(Point::new(40.0, 60.0));

    assert_eq!(c.pointer_down(PointerEvent::at(140.0, 160.0), &overlays, &mut NoCapture), Some("a"));
    let next = c.pointer_move(PointerEvent::at(150.0, 170.0), &overlays).unwrap();
    assert_eq!(next[0].position, Point::new(110.0, 110.0));
}

#[test]
fn move_without_drag_changes_nothing() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    assert!(c.pointer_move(PointerEvent::at(100.0, 100.0), &overlays).is_none());

    select(&mut c, &overlays, 100.0, 100.0);
    assert!(c.pointer_move(PointerEvent::at(120.0, 100.0), &overlays).is_none());
}

#[test]
fn move_after_dragged_overlay_vanished_is_ignored() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    c.pointer_down(PointerEvent::at(100.0, 100.0), &overlays, &mut NoCapture);
    assert!(c.pointer_move(PointerEvent::at(120.0, 100.0), &[]).is_none());
}

#[test]
fn pointer_up_ends_drag_and_tolerates_release_failure() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    let mut cap = RecordingCapture {
        fail_release: true,
        ..Default::default()
    };
    c.pointer_down(PointerEvent::at(100.0, 100.0), &overlays, &mut cap);
    c.pointer_up(PointerEvent::at(100.0, 100.0), &mut cap);

    assert_eq!(c.state(), &InteractionState::Idle);
    assert_eq!(c.selected(), Some("a"));
    assert_eq!(cap.released, vec![0]);
}

#[test]
fn wheel_without_selection_is_a_no_op() {
    let overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    let out = c.wheel(wheel(1.0, false), &overlays);
    assert_eq!(
        out,
        WheelOutcome {
            prevent_default: false,
            next: None,
        }
    );
}

#[test]
fn wheel_zoom_in_from_point_six() {
    let overlays = vec![sticker("a", 300.0, 300.0).with_scale(0.6)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 300.0, 300.0);

    let out = c.wheel(wheel(-3.0, false), &overlays);
    assert!(out.prevent_default);
    let next = out.next.unwrap();
    assert!((next[0].scale - 0.648).abs() < 1e-12);
    assert_eq!(next[0].rotation, 0.0);
}

#[test]
fn wheel_only_touches_the_selected_overlay() {
    let overlays = vec![sticker("a", 100.0, 100.0), sticker("b", 400.0, 400.0)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 400.0, 400.0);

    let next = c.wheel(wheel(1.0, false), &overlays).next.unwrap();
    assert_eq!(next[0], overlays[0]);
    assert!((next[1].scale - 0.92).abs() < 1e-12);
}

#[test]
fn wheel_scale_converges_to_exact_bounds() {
    let mut overlays = vec![sticker("a", 100.0, 100.0)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 100.0, 100.0);

    for _ in 0..200 {
        overlays = c.wheel(wheel(1.0, false), &overlays).next.unwrap();
        assert!(overlays[0].scale >= MIN_SCALE);
    }
    assert_eq!(overlays[0].scale, MIN_SCALE);

    for _ in 0..200 {
        overlays = c.wheel(wheel(-1.0, false), &overlays).next.unwrap();
        assert!(overlays[0].scale <= MAX_SCALE);
    }
    assert_eq!(overlays[0].scale, MAX_SCALE);
}

#[test]
fn wheel_with_modifier_rotates_without_bounds() {
    let mut overlays = vec![sticker("a", 100.0, 100.0).with_scale(1.3)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 100.0, 100.0);

    let once = c.wheel(wheel(5.0, true), &overlays).next.unwrap();
    assert!((once[0].rotation - ROTATE_STEP).abs() < 1e-12);
    assert_eq!(once[0].scale, 1.3);

    for _ in 0..100 {
        overlays = c.wheel(wheel(-0.1, true), &overlays).next.unwrap();
    }
    assert!((overlays[0].rotation + 100.0 * ROTATE_STEP).abs() < 1e-9);
    assert_eq!(overlays[0].scale, 1.3);
}

#[test]
fn zero_wheel_delta_zooms_in() {
    let overlays = vec![sticker("a", 100.0, 100.0).with_scale(0.6).with_rotation(0.3)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 100.0, 100.0);

    let out = c.wheel(wheel(0.0, false), &overlays);
    assert!(out.prevent_default);
    let next = out.next.unwrap();
    assert!((next[0].scale - 0.648).abs() < 1e-12);
    assert_eq!(next[0].rotation, 0.3);

    let rotated = c.wheel(wheel(0.0, true), &overlays).next.unwrap();
    assert_eq!(rotated[0].rotation, 0.3);
    assert_eq!(rotated[0].scale, 0.6);
}

#[test]
fn prune_drops_selection_of_removed_overlay() {
    let overlays = vec![sticker("a", 100.0, 100.0), sticker("b", 300.0, 300.0)];
    let mut c = InteractionController::new();
    select(&mut c, &overlays, 300.0, 300.0);

    c.prune_selection(&overlays);
    assert_eq!(c.selected(), Some("b"));

    c.prune_selection(&overlays[..1]);
    assert_eq!(c.selected(), None);
    assert_eq!(c.state(), &InteractionState::Idle);
}
