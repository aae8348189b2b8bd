use serde_json::{Map, Value, json};
use storyboard_rs::{
    chart::{Chart, ChartNote, NoteType},
    config::default_config,
    ids::SequentialIds,
    storyboard::{Storyboard, StoryboardError},
    time::{TimeError, TimeResolver, UNSET_TIME},
    unit::Viewport,
};

fn chart() -> Chart {
    Chart::new(vec![
        ChartNote {
            id: 5,
            kind: NoteType::Hold.id(),
            intro_time: 1.0,
            start_time: 2.0,
            end_time: 3.0,
        },
        ChartNote::tap(7, NoteType::Click, 4.0, 5.0),
    ])
    .unwrap()
}

fn resolve(token: Value) -> Result<Option<f32>, TimeError> {
    let chart = chart();
    let mut resolver = TimeResolver::new(&chart);
    resolver.resolve(&Map::new(), Some(&token))
}

fn load(document: &Value) -> Result<Storyboard, StoryboardError> {
    Storyboard::from_value(
        document,
        &chart(),
        &Viewport::default(),
        default_config(),
        SequentialIds::default(),
    )
    .map(|output| output.storyboard)
}

fn text_times(document: &Value) -> Vec<f32> {
    load(document).unwrap().texts()[0]
        .states
        .iter()
        .map(|state| state.base.time)
        .collect()
}

#[test]
fn test_note_phases() {
    assert_eq!(resolve(json!("at:5:0.5")), Ok(Some(2.5)));
    assert_eq!(resolve(json!("end:5")), Ok(Some(3.0)));
    assert_eq!(resolve(json!("intro:5:-0.5")), Ok(Some(0.5)));
    let start = resolve(json!("start:5:0.2")).unwrap().unwrap();
    assert!((start - 2.2).abs() < 1e-6);
}

#[test]
fn test_numbers_and_null() {
    assert_eq!(resolve(json!(1.25)), Ok(Some(1.25)));
    assert_eq!(resolve(json!(null)), Ok(None));
}

#[test]
fn test_fatal_time_errors() {
    assert_eq!(
        resolve(json!("hit:5")),
        Err(TimeError::UnknownPhase("hit".into()))
    );
    assert_eq!(resolve(json!("start:6")), Err(TimeError::UnknownNote(6)));
    assert_eq!(
        resolve(json!("start:$note")),
        Err(TimeError::UnboundPlaceholder("note".into()))
    );
    assert_eq!(
        resolve(json!("start:$combo")),
        Err(TimeError::UnknownPlaceholder("combo".into()))
    );
    assert!(matches!(resolve(json!(true)), Err(TimeError::Malformed(_))));
}

#[test]
fn test_fatal_time_errors_abort_the_load() {
    let err = load(&json!({"texts": [{"time": "start:99"}]})).unwrap_err();
    assert_eq!(err, StoryboardError::UnknownNote(99));

    let err = load(&json!({"texts": [{"time": "beat:5"}]})).unwrap_err();
    assert_eq!(err, StoryboardError::UnknownTimePhase("beat".into()));

    let err = load(&json!({"sprites": [{"time": "end:$note"}]})).unwrap_err();
    assert_eq!(err, StoryboardError::UnboundPlaceholder("note".into()));
}

#[test]
fn test_add_time_chains_off_any_previous_time() {
    let literal = text_times(&json!({"texts": [{"time": 0, "states": [
        {"time": 1},
        {"add_time": 0.5},
    ]}]}));
    let relative = text_times(&json!({"texts": [{"time": 0.5, "states": [
        {"relative_time": 0.5},
        {"add_time": 0.5},
    ]}]}));
    let chained = text_times(&json!({"texts": [{"time": 0.25, "states": [
        {"add_time": 0.75},
        {"add_time": 0.5},
    ]}]}));
    assert_eq!(literal[2], 1.5);
    assert_eq!(relative[2], 1.5);
    assert_eq!(chained[2], 1.5);
}

#[test]
fn test_relative_time_uses_declaration_base() {
    let times = text_times(&json!({"texts": [{"time": "start:5", "states": [
        {"add_time": 1},
        {"relative_time": 0.5},
    ]}]}));
    assert_eq!(times, [2.0, 2.5, 3.0]);
}

#[test]
fn test_note_placeholder_binds_to_enclosing_note() {
    let storyboard = load(&json!({"note_controllers": [{
        "note": 7,
        "time": "intro:$note",
        "states": [{"time": "start:$note"}, {"time": "end:5"}, {"time": "at:$note:1"}],
    }]}))
    .unwrap();
    let object = &storyboard.note_controllers()[0];
    let times: Vec<f32> = object.states.iter().map(|state| state.base.time).collect();
    assert_eq!(times, [3.0, 4.0, 5.0, 5.0]);
    assert!(object.states.iter().all(|state| state.note == Some(7)));
}

#[test]
fn test_untimed_object_never_appears() {
    let storyboard = load(&json!({"texts": [{"text": "hidden"}]})).unwrap();
    let object = &storyboard.texts()[0];
    assert_eq!(object.states[0].base.time, UNSET_TIME);
    assert_eq!(object.start_time(), None);
    assert!(object.bracket(100.0).is_none());
}
