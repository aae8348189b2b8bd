//! Triggers reacting to gameplay.
//!
//! A trigger is armed until it has fired `uses` times. It fires on a note clear when:
//!
//! - it is a [`TriggerType::NoteClear`] trigger listing the cleared note,
//! - it is a [`TriggerType::Combo`] trigger and the combo equals its `combo`,
//! - it is a [`TriggerType::Score`] trigger and the score is at least its `score`.
//!
//! Score triggers fire once whatever their `uses`, as the score never goes back down.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{chart::ChartNote, event::GameState, storyboard::StoryboardError};

/// What a trigger reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TriggerType {
    /// Never fires.
    #[default]
    None,
    /// Clear of one of the listed notes.
    NoteClear,
    /// Combo reaching a value.
    Combo,
    /// Score reaching a value.
    Score,
}

impl FromStr for TriggerType {
    type Err = String;

    /// Parses a type name case-insensitively, such as `noteClear` or `SCORE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "noteclear" => Self::NoteClear,
            "combo" => Self::Combo,
            "score" => Self::Score,
            _ => return Err(s.to_string()),
        })
    }
}

/// A trigger of the `triggers` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trigger {
    /// What the trigger reacts to.
    #[serde(rename = "type")]
    pub kind: TriggerType,
    /// Notes whose clear fires a [`TriggerType::NoteClear`] trigger.
    pub notes: Vec<i32>,
    /// Combo firing a [`TriggerType::Combo`] trigger.
    pub combo: Option<i32>,
    /// Score firing a [`TriggerType::Score`] trigger.
    pub score: Option<i32>,
    /// Ids of objects to spawn.
    pub spawn: Vec<String>,
    /// Ids of objects to destroy.
    pub destroy: Vec<String>,
    /// Number of fires before the trigger retires, `None` for unlimited.
    pub uses: Option<u32>,
    /// Number of fires so far.
    pub current_uses: u32,
    /// The note whose clear fired the trigger last.
    pub triggerer: Option<ChartNote>,
}

#[derive(Deserialize)]
struct RawTrigger {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    notes: Vec<i32>,
    combo: Option<i32>,
    score: Option<i32>,
    #[serde(default)]
    spawn: Vec<String>,
    #[serde(default)]
    destroy: Vec<String>,
    uses: Option<i64>,
}

impl Trigger {
    /// Reads the `index`-th entry of the `triggers` section.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError::InvalidTrigger`] if a field has the wrong shape or the type is
    /// unknown.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, StoryboardError> {
        let raw: RawTrigger = serde_path_to_error::deserialize(value.clone()).map_err(|err| {
            StoryboardError::InvalidTrigger {
                index,
                path: err.path().to_string(),
                message: err.inner().to_string(),
            }
        })?;
        let kind = raw
            .kind
            .as_deref()
            .map(str::parse::<TriggerType>)
            .transpose()
            .map_err(|kind| StoryboardError::InvalidTrigger {
                index,
                path: "type".into(),
                message: format!("unknown trigger type `{kind}`"),
            })?
            .unwrap_or_default();
        Ok(Self {
            kind,
            notes: raw.notes,
            combo: raw.combo,
            score: raw.score,
            spawn: raw.spawn,
            destroy: raw.destroy,
            uses: raw
                .uses
                .filter(|&uses| uses > 0)
                .map(|uses| u32::try_from(uses).unwrap_or(u32::MAX)),
            current_uses: 0,
            triggerer: None,
        })
    }

    /// Whether clearing `note` in `state` fires the trigger.
    #[must_use]
    pub fn matches(&self, note: &ChartNote, state: GameState) -> bool {
        match self.kind {
            TriggerType::None => false,
            TriggerType::NoteClear => self.notes.contains(&note.id),
            TriggerType::Combo => self.combo == Some(state.combo),
            TriggerType::Score => self.score.is_some_and(|score| state.score >= score),
        }
    }

    /// Whether the trigger has used up its fires.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        match self.kind {
            TriggerType::Score => self.current_uses > 0,
            _ => self.uses.is_some_and(|uses| self.current_uses >= uses),
        }
    }
}

/// The armed triggers of a storyboard, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerEngine {
    triggers: Vec<Trigger>,
}

impl TriggerEngine {
    /// Arms `triggers`.
    #[must_use]
    pub const fn new(triggers: Vec<Trigger>) -> Self {
        Self { triggers }
    }

    /// Reads the `triggers` section.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError`] if the section is not an array or an entry is invalid.
    pub fn from_section(section: &Value) -> Result<Self, StoryboardError> {
        let entries = section
            .as_array()
            .ok_or_else(|| StoryboardError::MalformedDocument {
                path: "triggers".into(),
                message: "expected an array of triggers".into(),
            })?;
        let triggers = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Trigger::from_json(index, entry))
            .collect::<Result<_, _>>()?;
        Ok(Self::new(triggers))
    }

    /// Evaluates every armed trigger against a note clear, in declaration order.
    ///
    /// Returns a snapshot of each fired trigger taken before its use is counted. Triggers retired
    /// by this clear are removed after every trigger has been evaluated.
    pub fn on_note_clear(&mut self, note: &ChartNote, state: GameState) -> Vec<Trigger> {
        let mut fired = Vec::new();
        for trigger in &mut self.triggers {
            if !trigger.matches(note, state) {
                continue;
            }
            trigger.triggerer = Some(note.clone());
            fired.push(trigger.clone());
            trigger.current_uses += 1;
        }
        self.triggers.retain(|trigger| !trigger.is_retired());
        fired
    }

    /// The armed triggers.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Number of armed triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether no trigger is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.triggers.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_loose_fields() {
        let trigger = Trigger::from_json(
            0,
            &json!({"type": "NoteClear", "notes": [1, 2], "spawn": ["a"], "uses": 0}),
        )
        .unwrap();
        assert_eq!(trigger.kind, TriggerType::NoteClear);
        assert_eq!(trigger.notes, [1, 2]);
        assert_eq!(trigger.spawn, ["a"]);
        assert_eq!(trigger.uses, None);

        let trigger = Trigger::from_json(0, &json!({})).unwrap();
        assert_eq!(trigger.kind, TriggerType::None);
    }

    #[test]
    fn reports_the_bad_field() {
        let err = Trigger::from_json(3, &json!({"notes": [1, "x"]})).unwrap_err();
        assert!(matches!(
            err,
            StoryboardError::InvalidTrigger { index: 3, ref path, .. } if path == "notes[1]"
        ));

        let err = Trigger::from_json(0, &json!({"type": "hit"})).unwrap_err();
        assert!(matches!(
            err,
            StoryboardError::InvalidTrigger { ref path, .. } if path == "type"
        ));
    }
}
