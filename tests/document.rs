use gametime::TimeSpan;
use pretty_assertions::assert_eq;
use serde_json::json;
use storyboard_rs::{
    chart::{Chart, ChartNote, NoteType},
    config::{StoryboardConfig, default_config},
    event::{GameEvent, GameEventBus, GameState},
    ids::SequentialIds,
    render::Renderer,
    state::ObjectKind,
    storyboard::{Storyboard, StoryboardError, StoryboardOutput, parse_storyboard},
    trigger::Trigger,
    unit::Viewport,
};

#[derive(Default)]
struct RecordingRenderer {
    fail: bool,
    prepared: usize,
    spawned: Vec<(String, Option<ObjectKind>)>,
    frames: Vec<f32>,
    bloom_frames: Vec<f32>,
}

impl Renderer for RecordingRenderer {
    async fn initialize(&mut self, storyboard: &Storyboard) -> Result<(), StoryboardError> {
        if self.fail {
            return Err(StoryboardError::Render("no GPU".into()));
        }
        self.prepared = storyboard.objects().count();
        Ok(())
    }

    fn on_trigger(&mut self, storyboard: &Storyboard, trigger: &Trigger) {
        for id in &trigger.spawn {
            let kind = storyboard.find_object(id).map(|object| object.kind());
            self.spawned.push((id.clone(), kind));
        }
    }

    fn on_game_update(&mut self, storyboard: &Storyboard, elapsed: f32) {
        self.frames.push(elapsed);
        if !storyboard.config().use_effects {
            return;
        }
        let bloom = storyboard.controllers().iter().any(|controller| {
            controller
                .bracket(elapsed)
                .is_some_and(|bracket| bracket.from.bloom == Some(true))
        });
        if bloom {
            self.bloom_frames.push(elapsed);
        }
    }
}

const SOURCE: &str = r#"{
    "templates": {"fade_in": {"opacity": 0, "states": [{"add_time": 1, "opacity": 1}]}},
    "texts": [{"id": "title", "template": "fade_in", "text": "Stage 1", "time": "start:1"}],
    "sprites": [{"id": "flash", "path": "flash.png", "time": ["start:2", "start:3"]}],
    "controllers": [{"id": "camera", "size": 5}],
    "note_controllers": [{"note": {"type": 0}, "time": "intro:$note", "opacity_multiplier": 0.5}],
    "lines": [{"id": "border", "time": 0, "pos": [{"x": 0, "y": 0}, {"x": 1, "y": 0}]}],
    "triggers": [
        {"type": "noteClear", "notes": [2], "spawn": ["flash", "missing"], "uses": 1},
        {"type": "combo", "combo": 3, "spawn": ["border"]}
    ]
}"#;

fn chart() -> Chart {
    Chart::new(vec![
        ChartNote::tap(1, NoteType::Click, 0.5, 1.0),
        ChartNote::tap(2, NoteType::Flick, 1.5, 2.0),
        ChartNote::tap(3, NoteType::Click, 2.5, 3.0),
    ])
    .unwrap()
}

fn load(source: &str) -> StoryboardOutput {
    Storyboard::load(
        source,
        &chart(),
        &Viewport::default(),
        default_config(),
        SequentialIds::default(),
    )
    .unwrap()
}

#[test]
fn test_loads_every_section() {
    let StoryboardOutput { storyboard, warnings } = load(SOURCE);
    assert!(warnings.is_empty());
    assert_eq!(storyboard.templates().len(), 1);
    assert_eq!(storyboard.texts().len(), 1);
    assert_eq!(storyboard.sprites().len(), 2);
    assert_eq!(storyboard.controllers().len(), 1);
    assert_eq!(storyboard.note_controllers().len(), 2);
    assert_eq!(storyboard.lines().len(), 1);
    assert_eq!(storyboard.triggers().len(), 2);

    let title = &storyboard.texts()[0];
    let times: Vec<f32> = title.states.iter().map(|state| state.base.time).collect();
    assert_eq!(times, [1.0, 2.0]);
    assert_eq!(storyboard.sprites()[1].id, "flash");
    assert_eq!(storyboard.controllers()[0].states[0].base.time, 0.0);

    let note_times: Vec<f32> = storyboard
        .note_controllers()
        .iter()
        .map(|object| object.states[0].base.time)
        .collect();
    assert_eq!(note_times, [0.5, 2.5]);
    assert_eq!(
        storyboard.find_object("border").map(|object| object.kind()),
        Some(ObjectKind::Line)
    );
}

#[test]
fn test_no_triggers_or_templates() {
    let StoryboardOutput { storyboard, warnings } =
        load(r#"{"texts": [{"text": "plain", "time": 0}]}"#);
    assert!(warnings.is_empty());
    assert!(storyboard.triggers().is_empty());
    assert!(storyboard.templates().is_empty());

    let StoryboardOutput { storyboard, .. } = load("{}");
    assert_eq!(storyboard.objects().count(), 0);
}

#[test]
fn test_malformed_documents() {
    let load = |source: &str| {
        Storyboard::load(
            source,
            &chart(),
            &Viewport::default(),
            default_config(),
            SequentialIds::default(),
        )
        .map(|_| ())
    };
    assert!(matches!(load("{\"texts\": ["), Err(StoryboardError::Json { line: 1, .. })));
    assert_eq!(
        load("[]"),
        Err(StoryboardError::MalformedDocument {
            path: "$".into(),
            message: "expected an object".into(),
        })
    );
    assert!(matches!(
        load(r#"{"sprites": {"id": "a"}}"#),
        Err(StoryboardError::MalformedDocument { ref path, .. }) if path == "sprites"
    ));
    assert!(matches!(
        load(r#"{"lines": [1]}"#),
        Err(StoryboardError::MalformedDocument { ref path, .. }) if path == "lines[0]"
    ));
}

#[test]
fn test_unknown_sections_are_warnings() {
    let StoryboardOutput { storyboard, warnings } =
        load(r#"{"meta": {"author": "someone"}, "texts": []}"#);
    assert_eq!(
        warnings,
        [storyboard_rs::storyboard::StoryboardWarning::UnknownSection("meta".into())]
    );
    assert_eq!(storyboard.compile()["meta"], json!({"author": "someone"}));
}

#[test]
fn test_initialize_gates_updates() {
    let StoryboardOutput { mut storyboard, .. } = load(SOURCE);
    let mut renderer = RecordingRenderer::default();

    assert!(!storyboard.on_game_update(0.5, &mut renderer));
    pollster::block_on(storyboard.initialize(&mut renderer)).unwrap();
    assert!(storyboard.is_ready());
    assert_eq!(renderer.prepared, 7);
    assert!(storyboard.on_game_update(1.0, &mut renderer));
    assert_eq!(renderer.frames, [1.0]);

    let StoryboardOutput { mut storyboard, .. } = load(SOURCE);
    let mut failing = RecordingRenderer {
        fail: true,
        ..RecordingRenderer::default()
    };
    let err = pollster::block_on(storyboard.initialize(&mut failing)).unwrap_err();
    assert_eq!(err, StoryboardError::Render("no GPU".into()));
    assert!(!storyboard.is_ready());
    assert!(!storyboard.on_game_update(1.0, &mut failing));
}

#[test]
fn test_renderer_honors_use_effects() {
    let source = r#"{"controllers": [{"time": 0, "bloom": true}]}"#;
    let load_with = |use_effects| {
        Storyboard::load(
            source,
            &chart(),
            &Viewport::default(),
            StoryboardConfig {
                use_effects,
                ..default_config()
            },
            SequentialIds::default(),
        )
        .unwrap()
        .storyboard
    };

    for (use_effects, expected) in [(true, vec![1.0_f32]), (false, vec![])] {
        let mut storyboard = load_with(use_effects);
        let mut renderer = RecordingRenderer::default();
        pollster::block_on(storyboard.initialize(&mut renderer)).unwrap();
        assert!(storyboard.on_game_update(1.0, &mut renderer));
        assert_eq!(storyboard.controllers()[0].states[0].bloom, Some(true));
        assert_eq!(renderer.frames, [1.0]);
        assert_eq!(renderer.bloom_frames, expected);
    }
}

#[test]
fn test_note_clear_fires_triggers() {
    let StoryboardOutput { mut storyboard, .. } = load(SOURCE);
    let mut renderer = RecordingRenderer::default();
    let chart = chart();

    let fired = storyboard.on_note_clear(
        chart.note(2).unwrap(),
        GameState { combo: 2, score: 100 },
        &mut renderer,
    );
    assert_eq!(fired, 1);
    assert_eq!(
        renderer.spawned,
        [
            ("flash".to_string(), Some(ObjectKind::Sprite)),
            ("missing".to_string(), None),
        ]
    );
    assert_eq!(storyboard.triggers().len(), 1);

    let fired = storyboard.on_note_clear(
        chart.note(3).unwrap(),
        GameState { combo: 3, score: 200 },
        &mut renderer,
    );
    assert_eq!(fired, 1);
    assert_eq!(renderer.spawned.last(), Some(&("border".to_string(), Some(ObjectKind::Line))));
}

#[test]
fn test_events_through_the_bus() {
    let StoryboardOutput { mut storyboard, .. } = load(SOURCE);
    let mut renderer = RecordingRenderer::default();
    let mut bus = GameEventBus::new();
    pollster::block_on(storyboard.initialize(&mut renderer)).unwrap();
    storyboard.attach_events(&mut bus);
    assert_eq!(bus.subscriber_count(), 1);

    bus.publish(&GameEvent::Update(TimeSpan::MILLISECOND * 500));
    bus.publish(&GameEvent::NoteClear {
        note: chart().note(2).cloned().unwrap(),
        state: GameState { combo: 1, score: 10 },
    });
    assert_eq!(storyboard.pump_events(&mut renderer), 2);
    assert_eq!(renderer.frames, [0.5]);
    assert_eq!(renderer.spawned.len(), 2);
    assert_eq!(storyboard.pump_events(&mut renderer), 0);

    bus.publish(&GameEvent::Disposed);
    bus.publish(&GameEvent::Update(TimeSpan::SECOND));
    assert_eq!(storyboard.pump_events(&mut renderer), 1);
    assert!(storyboard.is_disposed());
    assert_eq!(renderer.frames, [0.5]);
    assert_eq!(bus.publish(&GameEvent::Update(TimeSpan::SECOND)), 0);
}

#[test]
fn test_detach_events() {
    let StoryboardOutput { mut storyboard, .. } = load(SOURCE);
    let mut bus = GameEventBus::new();
    storyboard.attach_events(&mut bus);
    storyboard.detach_events(&mut bus);
    assert_eq!(bus.subscriber_count(), 0);
    assert_eq!(storyboard.pump_events(&mut RecordingRenderer::default()), 0);
}

#[test]
fn test_dispose_clears_everything() {
    let StoryboardOutput { mut storyboard, .. } = load(SOURCE);
    let mut renderer = RecordingRenderer::default();
    pollster::block_on(storyboard.initialize(&mut renderer)).unwrap();

    storyboard.dispose();
    assert!(storyboard.is_disposed());
    assert!(storyboard.texts().is_empty());
    assert!(storyboard.sprites().is_empty());
    assert!(storyboard.controllers().is_empty());
    assert!(storyboard.note_controllers().is_empty());
    assert!(storyboard.lines().is_empty());
    assert!(storyboard.triggers().is_empty());
    assert!(storyboard.templates().is_empty());
    assert!(storyboard.find_object("title").is_none());
    assert_eq!(storyboard.compile(), &json!({}));

    let clear = storyboard.on_note_clear(
        chart().note(2).unwrap(),
        GameState::default(),
        &mut renderer,
    );
    assert_eq!(clear, 0);
    assert!(!storyboard.on_game_update(3.0, &mut renderer));
    assert!(renderer.frames.is_empty());
}

#[test]
fn test_compile_exports_resolved_times() {
    let StoryboardOutput { storyboard, .. } = load(SOURCE);
    let compiled = storyboard.compile();

    assert_eq!(compiled["triggers"].as_array().map(Vec::len), Some(2));
    assert_eq!(compiled["templates"]["fade_in"]["opacity"], json!(0));
    assert_eq!(
        compiled["texts"],
        json!([{
            "id": "title",
            "template": "fade_in",
            "text": "Stage 1",
            "time": 1.0,
            "states": [{"add_time": 1, "opacity": 1}],
        }])
    );
    let sprite_times: Vec<_> = compiled["sprites"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sprite| sprite["time"].clone())
        .collect();
    assert_eq!(sprite_times, [json!(2.0), json!(3.0)]);
    assert_eq!(compiled["controllers"][0]["time"], json!(0.0));
    assert_eq!(compiled["note_controllers"][1]["note"], json!(3));
    assert_eq!(compiled["note_controllers"][1]["time"], json!(2.5));
}

#[test]
fn test_parse_storyboard_generates_ids() {
    let StoryboardOutput { storyboard, .. } =
        parse_storyboard(r#"{"texts": [{"time": 0}]}"#, &chart(), &Viewport::default()).unwrap();
    assert!(!storyboard.texts()[0].id.is_empty());
}
