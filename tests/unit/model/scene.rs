use super::*;

#[test]
fn parse_full_document() {
    let json = r#"{
        "base": "photo.jpg",
        "layout_width": 640,
        "dpr": 2,
        "overlays": [
            { "id": "a", "kind": { "image": { "source": "star.png" } }, "position": { "x": 300, "y": 300 }, "scale": 0.6 },
            { "id": "b", "kind": { "text": { "text": "hey" } }, "position": { "x": 100, "y": 80 } }
        ],
        "interactions": [
            { "pointer_down": { "x": 300, "y": 300 } },
            { "pointer_move": { "x": 320, "y": 310 } },
            "pointer_up",
            { "wheel": { "delta_y": -1 } },
            { "wheel": { "delta_y": 3, "modifier": true } }
        ]
    }"#;
    let doc = SceneDoc::from_reader(json.as_bytes()).unwrap();
    assert_eq!(doc.base.as_deref(), Some("photo.jpg"));
    assert_eq!(doc.layout_width, Some(640.0));
    assert_eq!(doc.dpr, Some(2.0));
    assert_eq!(doc.overlays.len(), 2);
    assert_eq!(doc.interactions.len(), 5);
    assert_eq!(doc.interactions[2], InteractionEvent::PointerUp);
    assert_eq!(
        doc.interactions[3],
        InteractionEvent::Wheel {
            delta_y: -1.0,
            modifier: false
        }
    );
}

#[test]
fn empty_document_is_valid() {
    let doc = SceneDoc::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(doc, SceneDoc::default());
}

#[test]
fn duplicate_ids_are_rejected() {
    let json = r#"{ "overlays": [
        { "id": "a", "kind": { "text": { "text": "1" } }, "position": { "x": 0, "y": 0 } },
        { "id": "a", "kind": { "text": { "text": "2" } }, "position": { "x": 0, "y": 0 } }
    ] }"#;
    let err = SceneDoc::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("duplicate overlay id"));
}

#[test]
fn malformed_json_is_serde_error() {
    let err = SceneDoc::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(matches!(err, OverlayerError::Serde(_)));
}

#[test]
fn missing_file_is_validation_error() {
    let err = SceneDoc::from_path("definitely/not/here.json").unwrap_err();
    assert!(matches!(err, OverlayerError::Validation(_)));
}
