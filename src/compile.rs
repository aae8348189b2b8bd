//! Compilation of declarations into timeline objects.
//!
//! One expanded declaration becomes one [`TimelineObject`]:
//!
//! 1. The declaration itself is compiled into the first state, overlaying its template's
//!    fields and then its own onto a default state.
//! 2. Each entry of its `states` array is expanded and compiled in order, starting from a copy of
//!    the state before it (or from a default state if the entry sets `reset`).
//! 3. Entries with nested `states` are compiled recursively right after themselves.
//!
//! Times chain as follows. An entry with an explicit `time` (its own or its template's) moves
//! the base time of the entries after it. `relative_time` is added to that base time, while
//! `add_time` is added to the time of the entry just before. An entry without any of them keeps
//! the time it copied.

use serde_json::{Map, Value};

use crate::{
    chart::Chart,
    expand::expand_declaration,
    ids::IdSource,
    state::{FieldContext, ObjectKind, StateKind, non_null},
    storyboard::StoryboardError,
    template::Templates,
    time::{TimeError, scalar_note},
    timeline::TimelineObject,
};

/// Compiles the object sections of one storyboard.
pub(crate) struct Compiler<'c, 'a> {
    pub(crate) cx: FieldContext<'c, 'a>,
    pub(crate) chart: &'a Chart,
    pub(crate) templates: &'c Templates,
    pub(crate) ids: &'c mut dyn IdSource,
}

/// A state fresh from its declaration, before the chained times are applied.
struct CreatedState<S> {
    state: S,
    /// Whether the declaration or its template gave a `time`.
    explicit_time: bool,
}

impl Compiler<'_, '_> {
    /// Compiles a whole object section.
    ///
    /// The expanded declarations, with their templates merged and their times resolved, are
    /// pushed to `export`.
    pub(crate) fn load_section<S: StateKind>(
        &mut self,
        section: &Value,
        export: &mut Vec<Value>,
    ) -> Result<Vec<TimelineObject<S>>, StoryboardError> {
        let name = S::KIND.section();
        let declarations = section
            .as_array()
            .ok_or_else(|| malformed(name, "expected an array of declarations"))?;
        let mut objects = Vec::with_capacity(declarations.len());
        for (index, declaration) in declarations.iter().enumerate() {
            let declaration = declaration
                .as_object()
                .ok_or_else(|| malformed(format!("{name}[{index}]"), "expected an object"))?;
            for expanded in expand_declaration(declaration, self.chart, self.cx.warnings) {
                let (object, exported) = self.load_object::<S>(expanded)?;
                objects.push(object);
                export.push(Value::Object(exported));
            }
        }
        Ok(objects)
    }

    /// Compiles one expanded declaration. Returns the object and the exported declaration.
    pub(crate) fn load_object<S: StateKind>(
        &mut self,
        mut declaration: Map<String, Value>,
    ) -> Result<(TimelineObject<S>, Map<String, Value>), StoryboardError> {
        if S::KIND == ObjectKind::Controller && non_null(&declaration, "time").is_none() {
            declaration.insert(
                "time".into(),
                Value::from(self.cx.config.default_controller_time),
            );
        }

        let CreatedState { state: first, .. } = self.create_state::<S>(None, &mut declaration)?;
        let base_time = first.time();
        let mut states = vec![first.clone()];
        self.add_states(&mut states, &first, &declaration, base_time)?;

        let id = match non_null(&declaration, "id") {
            Some(Value::String(id)) => id.clone(),
            Some(id @ Value::Number(_)) => id.to_string(),
            _ => self.ids.next_id(),
        };
        let mut exported = declaration;
        exported.insert("id".into(), Value::from(id.as_str()));
        self.resolve_times(&mut exported)?;
        Ok((TimelineObject::new(id, states), exported))
    }

    /// Compiles the nested `states` of `fields`, appending them to `states`.
    fn add_states<S: StateKind>(
        &mut self,
        states: &mut Vec<S>,
        parent: &S,
        fields: &Map<String, Value>,
        mut base_time: f32,
    ) -> Result<(), StoryboardError> {
        let Some(children) = non_null(fields, "states") else {
            return Ok(());
        };
        let children = children
            .as_array()
            .ok_or_else(|| malformed("states", "expected an array of states"))?;
        let mut expanded = Vec::with_capacity(children.len());
        for (index, child) in children.iter().enumerate() {
            let child = child
                .as_object()
                .ok_or_else(|| malformed(format!("states[{index}]"), "expected an object"))?;
            expanded.extend(expand_declaration(child, self.chart, self.cx.warnings));
        }

        let mut previous = parent.clone();
        let mut last_time = parent.time();
        for mut child in expanded {
            let CreatedState {
                mut state,
                explicit_time,
            } = self.create_state(Some(&previous), &mut child)?;
            if explicit_time {
                base_time = state.time();
            }
            if let Some(relative_time) = self.offset(&child, "relative_time")? {
                let base = state.base_mut();
                base.relative_time = Some(relative_time);
                base.time = base_time + relative_time;
            }
            if let Some(add_time) = self.offset(&child, "add_time")? {
                let base = state.base_mut();
                base.add_time = Some(add_time);
                base.time = last_time + add_time;
            }
            last_time = state.time();

            states.push(state.clone());
            self.add_states(states, &state, &child, base_time)?;
            previous = state;
        }
        Ok(())
    }

    /// Builds a state from `fields` on top of `previous`, merging the referenced template into
    /// `fields` first.
    fn create_state<S: StateKind>(
        &mut self,
        previous: Option<&S>,
        fields: &mut Map<String, Value>,
    ) -> Result<CreatedState<S>, StoryboardError> {
        let previous = if fields.get("reset").and_then(Value::as_bool) == Some(true) {
            None
        } else {
            previous
        };
        if let Some(note) = scalar_note(fields) {
            self.cx.resolver.bind_note(note);
        }

        let templates = self.templates;
        let template = templates.merge_into(fields)?;

        let mut state = previous.cloned().map_or_else(S::default, |mut state| {
            state.base_mut().forget_transition();
            state
        });
        if let Some(template) = template {
            state.overlay(template, previous, &mut self.cx)?;
        }
        state.overlay(fields, previous, &mut self.cx)?;

        let explicit_time = non_null(fields, "time").is_some()
            || template.is_some_and(|template| non_null(template, "time").is_some());
        Ok(CreatedState {
            state,
            explicit_time,
        })
    }

    /// Reads `relative_time` or `add_time`. An array left over from expansion is an error.
    fn offset(&mut self, fields: &Map<String, Value>, key: &str) -> Result<Option<f32>, TimeError> {
        match fields.get(key) {
            Some(value @ Value::Array(_)) => Err(TimeError::Malformed(value.to_string())),
            _ => Ok(self.cx.float(fields, key)),
        }
    }

    /// Replaces every `time` in the declaration tree with its resolved number.
    fn resolve_times(&mut self, declaration: &mut Map<String, Value>) -> Result<(), TimeError> {
        if let Some(note) = scalar_note(declaration) {
            self.cx.resolver.bind_note(note);
        }
        let resolved = match declaration.get("time") {
            Some(Value::Array(times)) => Some(Value::Array(
                times
                    .iter()
                    .map(|time| self.resolve_token(declaration, time))
                    .collect::<Result<_, _>>()?,
            )),
            Some(time) => Some(self.resolve_token(declaration, time)?),
            None => None,
        };
        if let Some(resolved) = resolved {
            declaration.insert("time".into(), resolved);
        }

        for (key, value) in declaration.iter_mut() {
            if key != "time" {
                self.resolve_nested_times(value)?;
            }
        }
        Ok(())
    }

    fn resolve_nested_times(&mut self, value: &mut Value) -> Result<(), TimeError> {
        match value {
            Value::Object(object) => self.resolve_times(object),
            Value::Array(values) => values
                .iter_mut()
                .try_for_each(|value| self.resolve_nested_times(value)),
            _ => Ok(()),
        }
    }

    fn resolve_token(
        &mut self,
        scope: &Map<String, Value>,
        token: &Value,
    ) -> Result<Value, TimeError> {
        Ok(self
            .cx
            .resolver
            .resolve(scope, Some(token))?
            .map_or(Value::Null, Value::from))
    }
}

fn malformed(path: impl Into<String>, message: &str) -> StoryboardError {
    StoryboardError::MalformedDocument {
        path: path.into(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        chart::{ChartNote, NoteType},
        config::StoryboardConfig,
        ids::SequentialIds,
        state::TextState,
        time::TimeResolver,
        unit::Viewport,
    };

    fn compile_text(declaration: Value) -> TimelineObject<TextState> {
        let chart = Chart::new(vec![ChartNote::tap(1, NoteType::Click, 0.5, 1.0)]).unwrap();
        let mut resolver = TimeResolver::new(&chart);
        let viewport = Viewport::default();
        let config = StoryboardConfig::default();
        let mut warnings = Vec::new();
        let templates = Templates::default();
        let mut ids = SequentialIds::default();
        let mut compiler = Compiler {
            cx: FieldContext {
                resolver: &mut resolver,
                viewport: &viewport,
                config: &config,
                warnings: &mut warnings,
            },
            chart: &chart,
            templates: &templates,
            ids: &mut ids,
        };
        let declaration = declaration.as_object().unwrap().clone();
        compiler.load_object(declaration).unwrap().0
    }

    #[test]
    fn relative_time_uses_latest_explicit_base() {
        let object = compile_text(json!({
            "time": 1,
            "states": [
                {"relative_time": 1},
                {"time": 5},
                {"relative_time": 0.5},
                {"add_time": 2},
            ],
        }));
        let times: Vec<f32> = object.states.iter().map(StateKind::time).collect();
        assert_eq!(times, [1.0, 2.0, 5.0, 5.5, 7.5]);
        assert_eq!(object.states[3].base.relative_time, Some(0.5));
        assert_eq!(object.states[4].base.add_time, Some(2.0));
    }

    #[test]
    fn nested_states_follow_their_parent() {
        let object = compile_text(json!({
            "time": "start:1",
            "text": "a",
            "states": [
                {"add_time": 1, "states": [{"add_time": 1, "text": "c"}]},
                {"add_time": 3, "text": "b"},
            ],
        }));
        let summary: Vec<_> = object
            .states
            .iter()
            .map(|state| (state.base.time, state.text.as_deref()))
            .collect();
        assert_eq!(
            summary,
            [
                (1.0, Some("a")),
                (2.0, Some("a")),
                (3.0, Some("c")),
                (5.0, Some("b")),
            ]
        );
        assert_eq!(object.id, "object_0");
    }
}
