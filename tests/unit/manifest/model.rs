use super::*;

#[test]
fn parses_camel_case_and_aliases() {
    let m = Manifest::from_json_str(
        r#"{
            "theme": "dark",
            "total_duration": 9,
            "scenes": [
                {
                    "duration": 3,
                    "transitionIn": "zoom",
                    "transitionOut": "swipe",
                    "media": { "src": "a.jpg", "credit": "Photo: A", "kenburns": "left" },
                    "text": [ { "role": "title", "html": "Hello", "at": 0.5, "effects": ["glow"] } ],
                    "callouts": [ { "html": "look", "at": 1, "x": 0.2, "y": 0.8 } ]
                },
                { "start": 4, "duration": 2 }
            ]
        }"#,
    )
    .unwrap();

    let def = m.def();
    assert_eq!(def.theme.as_deref(), Some("dark"));
    assert_eq!(def.total_duration, Some(9.0));
    assert_eq!(m.scene_count(), 2);

    let scenes = def.scenes.as_ref().unwrap();
    assert_eq!(scenes[0].transition.as_deref(), Some("zoom"));
    assert_eq!(scenes[0].transition_out.as_deref(), Some("swipe"));
    assert_eq!(scenes[0].text[0].effects, vec!["glow".to_string()]);
    assert_eq!(scenes[0].callouts[0].x, Some(0.2));
    assert_eq!(scenes[1].t, Some(4.0));
}

#[test]
fn scenes_must_be_present_and_an_array() {
    let err = Manifest::from_json_str(r#"{ "theme": "dark" }"#).unwrap_err();
    assert!(err.to_string().contains("missing 'scenes'"));

    let err = Manifest::from_json_str(r#"{ "scenes": { "a": 1 } }"#).unwrap_err();
    assert!(err.to_string().contains("'scenes' must be an array"));

    let err = Manifest::from_json_str(r#"[1, 2]"#).unwrap_err();
    assert!(err.to_string().contains("must be a JSON object"));

    let err = Manifest::from_json_str("{ nope").unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn bad_scene_shapes_are_validation_errors() {
    let err = Manifest::from_json_str(r#"{ "scenes": [ { "duration": "long" } ] }"#).unwrap_err();
    assert!(err.to_string().contains("parse manifest JSON"));
}

#[test]
fn from_value_does_not_consume_the_template() {
    let value = serde_json::json!({ "scenes": [ { "duration": 2 } ] });
    let a = Manifest::from_value(&value).unwrap();
    let b = Manifest::from_value(&value).unwrap();
    assert_eq!(a, b);
    assert_eq!(value["scenes"][0]["duration"], 2);
    assert_eq!(a.normalize("").unwrap().scenes.len(), 1);
}

#[test]
fn serializes_back_without_empty_fields() {
    let m = Manifest::from_json_str(r#"{ "scenes": [ { "duration": 2 } ] }"#).unwrap();
    let out = serde_json::to_value(m.def()).unwrap();
    assert_eq!(out, serde_json::json!({ "scenes": [ { "duration": 2.0 } ] }));
}
