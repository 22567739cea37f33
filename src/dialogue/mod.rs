//! Interview state machine
//!
//! A [`Dialogue`] is an ordered list of [`DialogueStep`]s and a cursor. Steps
//! move Unvisited → Active → Completed; the dialogue is done once the cursor
//! sits one past the last step.
//!
//! ## Step sequence
//!
//! ```text
//! [author] [title] typeOfUse editing [change creator licence] compilation
//!  └ only when the asset lacks it      └ only while edited = true
//! ```
//!
//! Every completion appends an entry to the snapshot log; navigating back to
//! step `n` truncates both the step list and the log, so the answers after
//! `n` are gone and the state is exactly what it was when `n` was answered.
//! Once `n` is answered again, the questions the truncation removed are asked
//! again as fresh steps.

pub mod result;

pub use result::*;

use crate::asset::Asset;
use crate::evaluation::{AttributionGenerator, AttributionOptions, DialogueEvaluation};
use crate::licence::{Licence, LicenceStore};
use crate::{AttributionError, AttributionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// Step names
pub const STEP_AUTHOR: &str = "author";
pub const STEP_TITLE: &str = "title";
pub const STEP_TYPE_OF_USE: &str = "typeOfUse";
pub const STEP_EDITING: &str = "editing";
pub const STEP_CHANGE: &str = "change";
pub const STEP_CREATOR: &str = "creator";
pub const STEP_LICENCE: &str = "licence";
pub const STEP_COMPILATION: &str = "compilation";

/// Regular questions every interview asks, in order
const BASE_STEPS: [&str; 3] = [STEP_TYPE_OF_USE, STEP_EDITING, STEP_COMPILATION];

/// Steps inserted after `editing` while the asset counts as edited
const EDITING_FOLLOW_UPS: [&str; 3] = [STEP_CHANGE, STEP_CREATOR, STEP_LICENCE];

// ─── Answers ────────────────────────────────────────────────────────

/// A single answer field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Answer record of one step
pub type AnswerData = BTreeMap<String, AnswerValue>;

/// Build an answer record from key/value pairs
pub fn answer<const N: usize>(pairs: [(&str, AnswerValue); N]) -> AnswerData {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ─── Steps ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    Unvisited,
    Active,
    Completed,
}

/// Why a step is part of the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOrigin {
    /// Regular interview question
    Base,
    /// Supplies a fact the asset lacks
    Corrective,
    /// Inserted by an answer to another step; removed when that answer flips
    ConditionalOn(StepId),
}

/// One interview question
#[derive(Debug, Clone, Serialize)]
pub struct DialogueStep {
    id: StepId,
    name: String,
    data: Option<AnswerData>,
    state: StepState,
    origin: StepOrigin,
}

impl DialogueStep {
    fn new(id: StepId, name: &str, origin: StepOrigin) -> Self {
        Self {
            id,
            name: name.to_string(),
            data: None,
            state: StepState::Unvisited,
            origin,
        }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Answer given on the latest visit; kept while a revisited step is active
    pub fn data(&self) -> Option<&AnswerData> {
        self.data.as_ref()
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn origin(&self) -> StepOrigin {
        self.origin
    }

    pub fn is_completed(&self) -> bool {
        self.state == StepState::Completed
    }

    fn complete(&mut self, data: AnswerData) {
        self.data = Some(data);
        self.state = StepState::Completed;
    }
}

/// Answer snapshot recorded after a completion or a backward jump
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub step_index: usize,
    pub answers: BTreeMap<String, AnswerData>,
}

// ─── Dialogue ───────────────────────────────────────────────────────

/// Ordered, mutable interview over one asset
#[derive(Debug, Clone)]
pub struct Dialogue {
    asset: Arc<Asset>,
    store: Arc<LicenceStore>,
    steps: Vec<DialogueStep>,
    cursor: usize,
    log: Vec<LogEntry>,
    next_id: u64,
}

impl Dialogue {
    /// Seed the interview for `asset`. Corrective steps come first when the
    /// asset has no author or no title.
    pub fn new(asset: Arc<Asset>, store: Arc<LicenceStore>) -> Self {
        let mut dialogue = Self {
            asset,
            store,
            steps: Vec::new(),
            cursor: 0,
            log: Vec::new(),
            next_id: 0,
        };
        dialogue.ensure_corrective_steps();
        dialogue.restore_missing_steps();
        dialogue.sync_cursor();
        dialogue.log.push(LogEntry {
            step_index: 0,
            answers: BTreeMap::new(),
        });
        dialogue
    }

    fn new_step(&mut self, name: &str, origin: StepOrigin) -> DialogueStep {
        let id = StepId(self.next_id);
        self.next_id += 1;
        DialogueStep::new(id, name, origin)
    }

    pub fn asset(&self) -> &Arc<Asset> {
        &self.asset
    }

    pub fn store(&self) -> &Arc<LicenceStore> {
        &self.store
    }

    pub fn steps(&self) -> &[DialogueStep] {
        &self.steps
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn is_done(&self) -> bool {
        self.cursor == self.steps.len()
    }

    /// Step at the cursor, `None` once the dialogue is done
    pub fn current_step(&self) -> Option<&DialogueStep> {
        self.steps.get(self.cursor)
    }

    /// Index of the first step called `name`
    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// Append a custom step; only while the dialogue is still running
    pub fn add_step(&mut self, name: &str) -> AttributionResult<StepId> {
        if self.is_done() {
            return Err(AttributionError::DialogueDone);
        }
        let step = self.new_step(name, StepOrigin::Base);
        let id = step.id;
        self.steps.push(step);
        Ok(id)
    }

    /// Record `data` on the step at `index`.
    ///
    /// Completing the current step advances the cursor; completing an
    /// earlier step re-answers it in place. Answering `editing` inserts or
    /// removes its follow-up steps.
    pub fn complete_step(&mut self, index: usize, data: AnswerData) -> AttributionResult<()> {
        if index >= self.steps.len() || index > self.cursor {
            return Err(AttributionError::StepOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        self.validate_answer(&self.steps[index].name, &data)?;

        self.steps[index].complete(data);
        if self.steps[index].name == STEP_EDITING {
            self.apply_editing_answer(index);
        }
        self.restore_missing_steps();
        self.sync_cursor();

        let answers = self.get_data();
        self.log.push(LogEntry {
            step_index: index,
            answers,
        });
        tracing::debug!(
            "Completed step {} ({}), cursor at {}/{}",
            index,
            self.steps[index].name,
            self.cursor,
            self.steps.len()
        );
        Ok(())
    }

    /// Navigate back to step `n`: drop every later step, reopen `n` with its
    /// previous answer, and rewind the snapshot log to match. The dropped
    /// questions come back, unanswered, once `n` is completed again.
    pub fn set_step(&mut self, n: usize) -> AttributionResult<()> {
        if n >= self.steps.len() || n > self.cursor {
            return Err(AttributionError::StepOutOfRange {
                index: n,
                len: self.steps.len(),
            });
        }

        self.steps.truncate(n + 1);
        self.steps[n].state = StepState::Active;
        self.ensure_corrective_steps();
        self.sync_cursor();

        self.log.retain(|e| e.step_index <= n);
        let answers = self.get_data();
        self.log.push(LogEntry {
            step_index: self.cursor,
            answers,
        });
        tracing::debug!("Moved back to step {}, {} steps remain", n, self.steps.len());
        Ok(())
    }

    /// Answers per step name; a later step with the same name wins
    pub fn get_data(&self) -> BTreeMap<String, AnswerData> {
        let mut data = BTreeMap::new();
        for step in &self.steps {
            if let Some(d) = &step.data {
                data.insert(step.name.clone(), d.clone());
            }
        }
        data
    }

    /// Rebuild the result snapshot from the asset and all logged answers
    pub fn get_result(&self) -> DialogueResult {
        let mut layered: BTreeMap<String, AnswerValue> = BTreeMap::new();
        for step in &self.steps {
            if let Some(d) = &step.data {
                for (key, value) in d {
                    layered.insert(key.clone(), value.clone());
                }
            }
        }
        DialogueResult::from_answers(&self.asset, &self.store, &layered)
    }

    /// Licences the edited version may be released under: the asset's own
    /// licence first, then every compatible one in store order
    pub fn licence_choices(&self) -> Vec<Licence> {
        let own = self.asset.licence();
        let mut choices = vec![own.clone()];
        choices.extend(self.store.find_compatibilities(own.id()));
        choices
    }

    /// Owned evaluation of the current state, safe to move into async tasks
    pub fn evaluation(&self) -> DialogueEvaluation {
        DialogueEvaluation::new(self.asset.clone(), self.get_result())
    }

    /// Generator for the current answers. The editor segment is filled from
    /// the editing answers unless `options` already carries one.
    pub fn attribution_generator(
        &self,
        options: AttributionOptions,
    ) -> AttributionResult<AttributionGenerator> {
        self.evaluation().attribution_generator(options)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn validate_answer(&self, step: &str, data: &AnswerData) -> AttributionResult<()> {
        let text = |key: &str| data.get(key).and_then(AnswerValue::as_text);
        let flag = |key: &str| data.get(key).and_then(AnswerValue::as_flag);
        let invalid = |msg: String| Err(AttributionError::InvalidAnswer(msg));

        match step {
            STEP_TYPE_OF_USE => match text(KEY_TYPE) {
                Some(t) if UseCase::parse(t).is_some() => {}
                other => return invalid(format!("unknown type of use {:?}", other)),
            },
            STEP_EDITING => {
                if flag(KEY_EDITED).is_none() {
                    return invalid("editing needs an 'edited' flag".into());
                }
            }
            STEP_COMPILATION => {
                if flag(KEY_COMPILATION).is_none() {
                    return invalid("compilation needs a 'compilation' flag".into());
                }
            }
            STEP_LICENCE => {
                let id = text(KEY_LICENCE).unwrap_or_default();
                if !self.licence_choices().iter().any(|l| l.id() == id) {
                    return invalid(format!(
                        "licence '{}' is not compatible with {}",
                        id,
                        self.asset.licence().id()
                    ));
                }
            }
            STEP_AUTHOR | STEP_TITLE | STEP_CHANGE | STEP_CREATOR => {
                let key = match step {
                    STEP_AUTHOR => KEY_AUTHOR,
                    STEP_TITLE => KEY_TITLE,
                    STEP_CHANGE => KEY_CHANGE,
                    _ => KEY_CREATOR,
                };
                if text(key).map_or(true, |t| t.trim().is_empty()) {
                    return invalid(format!("{} needs a non-empty '{}'", step, key));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Insert the follow-ups after `editing` on `edited = true`; remove
    /// exactly those follow-ups on `edited = false`
    fn apply_editing_answer(&mut self, index: usize) {
        let parent = self.steps[index].id;
        let edited = self.steps[index]
            .data
            .as_ref()
            .and_then(|d| d.get(KEY_EDITED))
            .and_then(AnswerValue::as_flag)
            .unwrap_or(false);
        let has_follow_ups = self
            .steps
            .iter()
            .any(|s| s.origin == StepOrigin::ConditionalOn(parent));

        if edited && !has_follow_ups {
            for (offset, name) in EDITING_FOLLOW_UPS.iter().enumerate() {
                let step = self.new_step(name, StepOrigin::ConditionalOn(parent));
                self.steps.insert(index + 1 + offset, step);
            }
            tracing::debug!("Inserted editing follow-ups after step {}", index);
        } else if !edited && has_follow_ups {
            self.steps
                .retain(|s| s.origin != StepOrigin::ConditionalOn(parent));
            tracing::debug!("Removed editing follow-ups after step {}", index);
        }
    }

    /// Bring back follow-ups and base steps that a backward jump removed.
    ///
    /// Walks the full step order; a step already present only moves the
    /// insertion point, a missing one is inserted there, unanswered.
    fn restore_missing_steps(&mut self) {
        let mut position = self
            .steps
            .iter()
            .take_while(|s| s.origin == StepOrigin::Corrective)
            .count();

        for base in BASE_STEPS {
            match self
                .steps
                .iter()
                .position(|s| s.name == base && s.origin == StepOrigin::Base)
            {
                Some(i) => position = i + 1,
                None => {
                    let step = self.new_step(base, StepOrigin::Base);
                    self.steps.insert(position, step);
                    tracing::debug!("Restored step {} at {}", base, position);
                    position += 1;
                }
            }

            if base != STEP_EDITING || !self.edited_at(position - 1) {
                continue;
            }
            let parent = StepOrigin::ConditionalOn(self.steps[position - 1].id);
            for name in EDITING_FOLLOW_UPS {
                match self
                    .steps
                    .iter()
                    .position(|s| s.name == name && s.origin == parent)
                {
                    Some(i) => position = i + 1,
                    None => {
                        let step = self.new_step(name, parent);
                        self.steps.insert(position, step);
                        tracing::debug!("Restored follow-up {} at {}", name, position);
                        position += 1;
                    }
                }
            }
        }
    }

    /// Whether the step at `index` is an answered `editing = true`
    fn edited_at(&self, index: usize) -> bool {
        self.steps[index].is_completed()
            && self.steps[index]
                .data
                .as_ref()
                .and_then(|d| d.get(KEY_EDITED))
                .and_then(AnswerValue::as_flag)
                .unwrap_or(false)
    }

    /// Insert corrective steps for facts the asset does not provide
    fn ensure_corrective_steps(&mut self) {
        let mut position = 0;
        for (name, missing) in [
            (STEP_AUTHOR, !self.asset.has_author()),
            (STEP_TITLE, !self.asset.has_title()),
        ] {
            if !missing {
                continue;
            }
            if self.step_index(name).is_none() {
                let step = self.new_step(name, StepOrigin::Corrective);
                self.steps.insert(position, step);
            }
            position += 1;
        }
    }

    /// Cursor = first step not completed; only that step is active
    fn sync_cursor(&mut self) {
        self.cursor = self
            .steps
            .iter()
            .position(|s| !s.is_completed())
            .unwrap_or(self.steps.len());
        for (i, step) in self.steps.iter_mut().enumerate() {
            if step.state != StepState::Completed {
                step.state = if i == self.cursor {
                    StepState::Active
                } else {
                    StepState::Unvisited
                };
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
