//! Storyboard documents.
//!
//! A storyboard is compiled once, when it is loaded:
//!
//! 1. `templates` is read,
//! 2. each object section (`texts`, `sprites`, `controllers`, `note_controllers`, `lines`) is
//!    expanded and compiled into [`TimelineObject`]s,
//! 3. `triggers` is read and armed.
//!
//! Fatal problems abort the load with a [`StoryboardError`]; the caller decides how to go on
//! without the storyboard. Other problems are collected as [`StoryboardWarning`]s in the
//! [`StoryboardOutput`].
//!
//! After loading, the owner drives the storyboard through its play session:
//! [`Storyboard::initialize`] once, then gameplay events either directly
//! ([`Storyboard::on_note_clear`], [`Storyboard::on_game_update`]) or through a
//! [`GameEventBus`] subscription pumped every frame ([`Storyboard::pump_events`]).

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    chart::{Chart, ChartNote},
    compile::Compiler,
    config::{StoryboardConfig, default_config},
    event::{GameEvent, GameEventBus, GameState, Subscription, span_seconds},
    ids::IdSource,
    render::Renderer,
    state::{
        ControllerState, FieldContext, LineState, NoteControllerState, ObjectKind, SpriteState,
        StateKind, TextState,
    },
    template::Templates,
    time::{TimeError, TimeResolver},
    timeline::TimelineObject,
    trigger::{Trigger, TriggerEngine},
    unit::Viewport,
};

/// An error which aborts loading a storyboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryboardError {
    /// The source is not valid JSON.
    #[error("invalid JSON at {line}:{column}: {message}")]
    Json {
        /// Line of the error, starting at 1.
        line: usize,
        /// Column of the error, starting at 1.
        column: usize,
        /// Description from the JSON parser.
        message: String,
    },
    /// A part of the document has the wrong shape.
    #[error("malformed document at `{path}`: {message}")]
    MalformedDocument {
        /// Dotted path of the offending value.
        path: String,
        /// What was expected.
        message: String,
    },
    /// A declaration references a template that does not exist.
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),
    /// `$note` is used where no note is bound.
    #[error("`${0}` is used but no note is bound to it")]
    UnboundPlaceholder(String),
    /// A `$` placeholder other than `$note`.
    #[error("unknown placeholder `${0}`")]
    UnknownPlaceholder(String),
    /// A time expression uses a phase other than `intro`, `start`, `end` and `at`.
    #[error("unknown time phase `{0}`")]
    UnknownTimePhase(String),
    /// A time token has a shape that is not a time expression.
    #[error("malformed time expression `{0}`")]
    MalformedTimeExpression(String),
    /// A time expression references a note the chart does not have.
    #[error("note {0} is not in the chart")]
    UnknownNote(i32),
    /// An object kind name that is not known.
    #[error("unknown object kind `{0}`")]
    UnknownObjectKind(String),
    /// An entry of the `triggers` section is invalid.
    #[error("invalid trigger #{index} at `{path}`: {message}")]
    InvalidTrigger {
        /// Position of the trigger in its section.
        index: usize,
        /// Path of the offending field inside the trigger.
        path: String,
        /// What went wrong.
        message: String,
    },
    /// The renderer failed to prepare.
    #[error("renderer failed: {0}")]
    Render(String),
}

impl From<TimeError> for StoryboardError {
    fn from(err: TimeError) -> Self {
        match err {
            TimeError::UnknownPhase(phase) => Self::UnknownTimePhase(phase),
            TimeError::UnknownNote(note) => Self::UnknownNote(note),
            TimeError::UnboundPlaceholder(name) => Self::UnboundPlaceholder(name),
            TimeError::UnknownPlaceholder(name) => Self::UnknownPlaceholder(name),
            TimeError::Malformed(token) => Self::MalformedTimeExpression(token),
        }
    }
}

impl From<serde_json::Error> for StoryboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// A problem found while loading a storyboard which does not stop it.
///
/// The field or object concerned is left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum StoryboardWarning {
    /// A colour field is not an HTML colour.
    #[error("`{field}` is not a colour: {value}")]
    InvalidColor {
        /// Name of the field.
        field: String,
        /// The rejected value.
        value: String,
    },
    /// A field has a value of the wrong type.
    #[error("`{field}` has an invalid value: {value}")]
    InvalidFieldValue {
        /// Name of the field.
        field: String,
        /// The rejected value, as JSON.
        value: String,
    },
    /// The easing name is not known, the state eases linearly.
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),
    /// A number token has an unknown unit prefix.
    #[error("`{field}` has an unknown unit `{unit}`")]
    UnknownReferenceUnit {
        /// Name of the field.
        field: String,
        /// The unit prefix.
        unit: String,
    },
    /// A note selector matched no note, the declaration yields no object.
    #[error("note selector of {} matches no note", id.as_deref().unwrap_or("a declaration"))]
    EmptyNoteSelector {
        /// Id of the declaration, if it has one.
        id: Option<String>,
    },
    /// The `type` of a note selector is neither a type id nor an array of them.
    #[error("note selector type {0} is not a note type or an array of note types")]
    InvalidNoteSelectorType(String),
    /// A top-level section that is not known, it is ignored.
    #[error("unknown section `{0}`")]
    UnknownSection(String),
}

/// Output of loading a storyboard.
#[derive(Debug)]
pub struct StoryboardOutput {
    /// The compiled storyboard.
    pub storyboard: Storyboard,
    /// Problems which did not stop the load.
    pub warnings: Vec<StoryboardWarning>,
}

/// Sections read by the loader besides the object sections.
const TEMPLATES: &str = "templates";
const TRIGGERS: &str = "triggers";

/// Loads a storyboard with the [default configuration](default_config).
///
/// Objects without an `id` get random ids when the `rand` feature is enabled, sequential ones
/// otherwise.
///
/// # Errors
///
/// Returns [`StoryboardError`] when the document cannot be compiled.
///
/// # Example
///
/// ```
/// use storyboard_rs::{
///     chart::{Chart, ChartNote, NoteType},
///     storyboard::{StoryboardOutput, parse_storyboard},
///     unit::Viewport,
/// };
///
/// let chart = Chart::new(vec![ChartNote::tap(5, NoteType::Click, 1.0, 2.0)]).unwrap();
/// let source = r#"{"texts": [{"id": "hello", "text": "Hello", "time": "start:5"}]}"#;
/// let StoryboardOutput { storyboard, warnings } =
///     parse_storyboard(source, &chart, &Viewport::default()).unwrap();
/// assert!(warnings.is_empty());
/// assert_eq!(storyboard.texts()[0].states[0].base.time, 2.0);
/// ```
pub fn parse_storyboard(
    source: &str,
    chart: &Chart,
    viewport: &Viewport,
) -> Result<StoryboardOutput, StoryboardError> {
    #[cfg(feature = "rand")]
    let ids = {
        use rand::{SeedableRng, rngs::StdRng};
        crate::ids::RandIds(StdRng::from_os_rng())
    };
    #[cfg(not(feature = "rand"))]
    let ids = crate::ids::SequentialIds::default();
    Storyboard::load(source, chart, viewport, default_config(), ids)
}

/// A compiled storyboard and its play session state.
#[derive(Debug)]
pub struct Storyboard {
    config: StoryboardConfig,
    templates: Templates,
    texts: Vec<TimelineObject<TextState>>,
    sprites: Vec<TimelineObject<SpriteState>>,
    controllers: Vec<TimelineObject<ControllerState>>,
    note_controllers: Vec<TimelineObject<NoteControllerState>>,
    lines: Vec<TimelineObject<LineState>>,
    triggers: TriggerEngine,
    compiled: Value,
    subscription: Option<Subscription>,
    ready: bool,
    disposed: bool,
}

/// A timeline object of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectRef<'a> {
    /// A text.
    Text(&'a TimelineObject<TextState>),
    /// A sprite.
    Sprite(&'a TimelineObject<SpriteState>),
    /// A controller.
    Controller(&'a TimelineObject<ControllerState>),
    /// A note controller.
    NoteController(&'a TimelineObject<NoteControllerState>),
    /// A line.
    Line(&'a TimelineObject<LineState>),
}

impl ObjectRef<'_> {
    /// Kind of the object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Text(_) => ObjectKind::Text,
            Self::Sprite(_) => ObjectKind::Sprite,
            Self::Controller(_) => ObjectKind::Controller,
            Self::NoteController(_) => ObjectKind::NoteController,
            Self::Line(_) => ObjectKind::Line,
        }
    }

    /// Id of the object.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Text(object) => &object.id,
            Self::Sprite(object) => &object.id,
            Self::Controller(object) => &object.id,
            Self::NoteController(object) => &object.id,
            Self::Line(object) => &object.id,
        }
    }
}

impl Storyboard {
    /// Loads a storyboard from its JSON source.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError`] when the source is not JSON or the document cannot be
    /// compiled.
    pub fn load(
        source: &str,
        chart: &Chart,
        viewport: &Viewport,
        config: StoryboardConfig,
        ids: impl IdSource,
    ) -> Result<StoryboardOutput, StoryboardError> {
        let root: Value = serde_json::from_str(source)?;
        Self::from_value(&root, chart, viewport, config, ids)
    }

    /// Loads a storyboard from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError`] when the document cannot be compiled.
    pub fn from_value(
        root: &Value,
        chart: &Chart,
        viewport: &Viewport,
        config: StoryboardConfig,
        mut ids: impl IdSource,
    ) -> Result<StoryboardOutput, StoryboardError> {
        let document = root
            .as_object()
            .ok_or_else(|| StoryboardError::MalformedDocument {
                path: "$".into(),
                message: "expected an object".into(),
            })?;
        let mut warnings: Vec<StoryboardWarning> = document
            .keys()
            .filter(|name| {
                *name != TEMPLATES
                    && *name != TRIGGERS
                    && name.parse::<ObjectKind>().is_err()
            })
            .map(|name| StoryboardWarning::UnknownSection(name.clone()))
            .collect();
        let section = |name: &str| document.get(name).filter(|value| !value.is_null());

        let templates = section(TEMPLATES)
            .map(Templates::from_section)
            .transpose()?
            .unwrap_or_default();

        let mut compiled = document.clone();
        let mut resolver = TimeResolver::new(chart);
        let mut compiler = Compiler {
            cx: FieldContext {
                resolver: &mut resolver,
                viewport,
                config: &config,
                warnings: &mut warnings,
            },
            chart,
            templates: &templates,
            ids: &mut ids,
        };
        let mut sections = Sections::default();
        for kind in ObjectKind::ALL {
            let Some(declarations) = section(kind.section()) else {
                continue;
            };
            let mut export = Vec::new();
            sections.absorb(load_section_as(&mut compiler, kind, declarations, &mut export)?);
            compiled.insert(kind.section().to_string(), Value::Array(export));
        }

        let triggers = section(TRIGGERS)
            .map(TriggerEngine::from_section)
            .transpose()?
            .unwrap_or_default();

        let storyboard = Self {
            config,
            templates,
            texts: sections.texts,
            sprites: sections.sprites,
            controllers: sections.controllers,
            note_controllers: sections.note_controllers,
            lines: sections.lines,
            triggers,
            compiled: Value::Object(compiled),
            subscription: None,
            ready: false,
            disposed: false,
        };
        Ok(StoryboardOutput {
            storyboard,
            warnings,
        })
    }

    /// The configuration the storyboard was compiled with.
    #[must_use]
    pub const fn config(&self) -> &StoryboardConfig {
        &self.config
    }

    /// Templates of the document.
    #[must_use]
    pub const fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Compiled texts, in declaration order.
    #[must_use]
    pub fn texts(&self) -> &[TimelineObject<TextState>] {
        &self.texts
    }

    /// Compiled sprites, in declaration order.
    #[must_use]
    pub fn sprites(&self) -> &[TimelineObject<SpriteState>] {
        &self.sprites
    }

    /// Compiled controllers, in declaration order.
    #[must_use]
    pub fn controllers(&self) -> &[TimelineObject<ControllerState>] {
        &self.controllers
    }

    /// Compiled note controllers, in declaration order.
    #[must_use]
    pub fn note_controllers(&self) -> &[TimelineObject<NoteControllerState>] {
        &self.note_controllers
    }

    /// Compiled lines, in declaration order.
    #[must_use]
    pub fn lines(&self) -> &[TimelineObject<LineState>] {
        &self.lines
    }

    /// Triggers still armed.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        self.triggers.triggers()
    }

    /// Every object of every kind, kinds in section order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        let texts = self.texts.iter().map(ObjectRef::Text);
        let sprites = self.sprites.iter().map(ObjectRef::Sprite);
        let controllers = self.controllers.iter().map(ObjectRef::Controller);
        let note_controllers = self.note_controllers.iter().map(ObjectRef::NoteController);
        let lines = self.lines.iter().map(ObjectRef::Line);
        texts
            .chain(sprites)
            .chain(controllers)
            .chain(note_controllers)
            .chain(lines)
    }

    /// Finds an object by id, as named by the `spawn` and `destroy` lists of triggers.
    #[must_use]
    pub fn find_object(&self, id: &str) -> Option<ObjectRef<'_>> {
        self.objects().find(|object| object.id() == id)
    }

    /// The document with its object sections expanded, templates merged into the declarations,
    /// and every `time` replaced with the resolved number of seconds.
    ///
    /// Times that are never reached are `null`.
    #[must_use]
    pub const fn compile(&self) -> &Value {
        &self.compiled
    }

    /// Lets `renderer` prepare its resources, then opens the storyboard to frame updates.
    ///
    /// # Errors
    ///
    /// Returns the error of the renderer, the storyboard then stays closed to frame updates.
    pub async fn initialize<R: Renderer>(&mut self, renderer: &mut R) -> Result<(), StoryboardError> {
        if self.disposed {
            return Ok(());
        }
        renderer.initialize(self).await?;
        self.ready = true;
        Ok(())
    }

    /// Whether [`Storyboard::initialize`] has completed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether [`Storyboard::dispose`] has been called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Subscribes to gameplay events of `bus`, replacing any earlier subscription.
    pub fn attach_events(&mut self, bus: &mut GameEventBus) {
        if !self.disposed {
            self.subscription = Some(bus.subscribe());
        }
    }

    /// Unsubscribes from `bus`.
    pub fn detach_events(&mut self, bus: &mut GameEventBus) {
        if let Some(subscription) = self.subscription.take() {
            bus.unsubscribe(subscription.id());
        }
    }

    /// Handles every gameplay event received since the last call. Returns how many were handled.
    pub fn pump_events<R: Renderer>(&mut self, renderer: &mut R) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };
        let events = subscription.drain();
        let mut handled = 0;
        for event in events {
            if self.disposed {
                break;
            }
            match event {
                GameEvent::NoteClear { note, state } => {
                    self.on_note_clear(&note, state, renderer);
                }
                GameEvent::Update(elapsed) => {
                    self.on_game_update(span_seconds(elapsed), renderer);
                }
                GameEvent::Disposed => self.dispose(),
            }
            handled += 1;
        }
        handled
    }

    /// Evaluates the triggers against a note clear, calling `renderer` for each fire.
    ///
    /// Returns the number of fired triggers.
    pub fn on_note_clear<R: Renderer>(
        &mut self,
        note: &ChartNote,
        state: GameState,
        renderer: &mut R,
    ) -> usize {
        if self.disposed {
            return 0;
        }
        let fired = self.triggers.on_note_clear(note, state);
        for trigger in &fired {
            renderer.on_trigger(self, trigger);
        }
        fired.len()
    }

    /// Forwards a frame to `renderer`. Returns whether it was forwarded, which needs the
    /// storyboard to be initialized and not disposed.
    pub fn on_game_update<R: Renderer>(&mut self, elapsed: f32, renderer: &mut R) -> bool {
        if self.disposed || !self.ready {
            return false;
        }
        renderer.on_game_update(self, elapsed);
        true
    }

    /// Ends the play session: clears every object, template and trigger, and drops the event
    /// subscription. Later events and updates are ignored.
    pub fn dispose(&mut self) {
        self.texts.clear();
        self.sprites.clear();
        self.controllers.clear();
        self.note_controllers.clear();
        self.lines.clear();
        self.triggers.clear();
        self.templates.clear();
        self.compiled = Value::Object(Map::new());
        self.subscription = None;
        self.ready = false;
        self.disposed = true;
    }
}

/// The object sections while they are being loaded.
#[derive(Default)]
struct Sections {
    texts: Vec<TimelineObject<TextState>>,
    sprites: Vec<TimelineObject<SpriteState>>,
    controllers: Vec<TimelineObject<ControllerState>>,
    note_controllers: Vec<TimelineObject<NoteControllerState>>,
    lines: Vec<TimelineObject<LineState>>,
}

/// Objects of one compiled section.
enum SectionObjects {
    Texts(Vec<TimelineObject<TextState>>),
    Sprites(Vec<TimelineObject<SpriteState>>),
    Controllers(Vec<TimelineObject<ControllerState>>),
    NoteControllers(Vec<TimelineObject<NoteControllerState>>),
    Lines(Vec<TimelineObject<LineState>>),
}

impl Sections {
    fn absorb(&mut self, objects: SectionObjects) {
        match objects {
            SectionObjects::Texts(objects) => self.texts = objects,
            SectionObjects::Sprites(objects) => self.sprites = objects,
            SectionObjects::Controllers(objects) => self.controllers = objects,
            SectionObjects::NoteControllers(objects) => self.note_controllers = objects,
            SectionObjects::Lines(objects) => self.lines = objects,
        }
    }
}

fn load_section_as(
    compiler: &mut Compiler<'_, '_>,
    kind: ObjectKind,
    declarations: &Value,
    export: &mut Vec<Value>,
) -> Result<SectionObjects, StoryboardError> {
    fn load<S: StateKind>(
        compiler: &mut Compiler<'_, '_>,
        declarations: &Value,
        export: &mut Vec<Value>,
    ) -> Result<Vec<TimelineObject<S>>, StoryboardError> {
        compiler.load_section(declarations, export)
    }
    Ok(match kind {
        ObjectKind::Text => SectionObjects::Texts(load(compiler, declarations, export)?),
        ObjectKind::Sprite => SectionObjects::Sprites(load(compiler, declarations, export)?),
        ObjectKind::Controller => {
            SectionObjects::Controllers(load(compiler, declarations, export)?)
        }
        ObjectKind::NoteController => {
            SectionObjects::NoteControllers(load(compiler, declarations, export)?)
        }
        ObjectKind::Line => SectionObjects::Lines(load(compiler, declarations, export)?),
    })
}
