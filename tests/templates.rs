use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use storyboard_rs::{
    chart::Chart,
    config::default_config,
    ids::SequentialIds,
    storyboard::{Storyboard, StoryboardError},
    template::Templates,
    unit::Viewport,
};

fn load(document: &Value) -> Result<Storyboard, StoryboardError> {
    Storyboard::from_value(
        document,
        &Chart::default(),
        &Viewport::default(),
        default_config(),
        SequentialIds::default(),
    )
    .map(|output| output.storyboard)
}

#[test]
fn test_merge_never_overwrites_and_is_idempotent() {
    let templates = Templates::from_section(&json!({
        "fade": {
            "relative_time": 3,
            "add_time": 1,
            "states": [{"opacity": 0}],
            "opacity": 1,
        },
    }))
    .unwrap();
    let mut declaration = json!({"template": "fade", "relative_time": 0.5, "add_time": null})
        .as_object()
        .unwrap()
        .clone();

    templates.merge_into(&mut declaration).unwrap();
    let once = declaration.clone();
    templates.merge_into(&mut declaration).unwrap();

    assert_eq!(declaration, once);
    assert_eq!(declaration["relative_time"], json!(0.5));
    assert_eq!(declaration["add_time"], json!(1));
    assert_eq!(declaration["states"], json!([{"opacity": 0}]));
    assert!(!declaration.contains_key("opacity"));
}

#[test]
fn test_template_fields_under_declaration_fields() {
    let storyboard = load(&json!({
        "templates": {
            "title": {"text": "Title", "size": 40, "color": "red", "time": 2},
        },
        "texts": [{"template": "title", "text": "Override"}],
    }))
    .unwrap();
    let state = &storyboard.texts()[0].states[0];
    assert_eq!(state.text.as_deref(), Some("Override"));
    assert_eq!(state.size, Some(40));
    assert_eq!(state.base.time, 2.0);
    assert!(state.color.is_some());
}

#[test]
fn test_template_states_are_inherited() {
    let storyboard = load(&json!({
        "templates": {
            "blink": {"states": [{"add_time": 1, "opacity": 0}, {"add_time": 1, "opacity": 1}]},
        },
        "sprites": [
            {"template": "blink", "time": 1, "opacity": 1},
            {"template": "blink", "time": 1, "states": [{"add_time": 5}]},
        ],
    }))
    .unwrap();
    let times = |index: usize| -> Vec<f32> {
        storyboard.sprites()[index]
            .states
            .iter()
            .map(|state| state.base.time)
            .collect()
    };
    assert_eq!(times(0), [1.0, 2.0, 3.0]);
    assert_eq!(times(1), [1.0, 6.0]);
}

#[test]
fn test_state_level_template() {
    let storyboard = load(&json!({
        "templates": {"hide": {"opacity": 0, "easing": "easeInQuad"}},
        "texts": [{"time": 0, "opacity": 1, "states": [{"template": "hide", "time": 1}]}],
    }))
    .unwrap();
    let states = &storyboard.texts()[0].states;
    assert_eq!(states[1].canvas.opacity, Some(0.0));
    assert_eq!(states[1].base.easing, storyboard_rs::easing::Easing::EaseInQuad);
}

#[test]
fn test_unknown_template_is_fatal() {
    let err = load(&json!({"texts": [{"template": "missing", "time": 0}]})).unwrap_err();
    assert_eq!(err, StoryboardError::UnknownTemplate("missing".into()));

    let err = load(&json!({
        "templates": {},
        "texts": [{"time": 0, "states": [{"template": "nested"}]}],
    }))
    .unwrap_err();
    assert_eq!(err, StoryboardError::UnknownTemplate("nested".into()));
}

#[test]
fn test_malformed_templates_section() {
    let err = load(&json!({"templates": {"bad": 1}})).unwrap_err();
    assert!(matches!(
        err,
        StoryboardError::MalformedDocument { ref path, .. } if path == "templates.bad"
    ));
}
