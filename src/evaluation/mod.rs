//! Dialogue evaluation — attribution and advisory notes for a result snapshot
//!
//! Notes ("dos") and restrictions ("don'ts") are identifiers into the
//! caller's message catalogue. They are selected by walking fixed rule
//! tables in order, so output order is stable:
//!
//! 1. use-case and licence notes
//! 2. restrictions
//! 3. compilation and full-licence notes, appended last to the notes

pub mod generator;
pub mod supplement;

pub use generator::*;
pub use supplement::*;

use crate::asset::Asset;
use crate::dialogue::{DialogueResult, UseCase};
use crate::licence::{GROUP_CC1, GROUP_CC2, GROUP_PORTED, GROUP_SA};
use crate::AttributionResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── Advisory output ────────────────────────────────────────────────

/// A "don't" with its catalogue keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub headline: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosAndDonts {
    pub dos: Vec<String>,
    pub donts: Vec<Restriction>,
}

// ─── Rule tables ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Condition {
    Always,
    UseCase(UseCase),
    Edited,
    InGroup(&'static str),
    InAnyGroup(&'static [&'static str]),
    EditedInGroup(&'static str),
}

impl Condition {
    fn holds(&self, result: &DialogueResult) -> bool {
        match self {
            Self::Always => true,
            Self::UseCase(u) => result.use_case == *u,
            Self::Edited => result.edited,
            Self::InGroup(g) => result.licence.is_in_group(g),
            Self::InAnyGroup(gs) => gs.iter().any(|g| result.licence.is_in_group(g)),
            Self::EditedInGroup(g) => result.edited && result.licence.is_in_group(g),
        }
    }
}

struct NoteRule {
    id: &'static str,
    when: Condition,
}

struct RestrictionRule {
    headline: &'static str,
    text: &'static str,
    when: Condition,
}

pub const NOTE_PRIVATE_USE: &str = "private-use";
pub const NOTE_NO_ATTRIBUTION: &str = "no-attribution-required";
pub const NOTE_COMPILATION: &str = "compilation";
pub const NOTE_FULL_LICENCE: &str = "full-licence";

const NOTES: &[NoteRule] = &[
    NoteRule { id: "print-placement", when: Condition::UseCase(UseCase::Print) },
    NoteRule { id: "print-licence-url", when: Condition::UseCase(UseCase::Print) },
    NoteRule { id: "online-placement", when: Condition::UseCase(UseCase::Online) },
    NoteRule { id: "online-licence-link", when: Condition::UseCase(UseCase::Online) },
    NoteRule { id: "other-placement", when: Condition::UseCase(UseCase::Other) },
    NoteRule { id: "indicate-changes", when: Condition::Edited },
    NoteRule { id: "sharealike-edited", when: Condition::EditedInGroup(GROUP_SA) },
    NoteRule { id: "ported-jurisdiction", when: Condition::InGroup(GROUP_PORTED) },
    NoteRule { id: "legacy-version", when: Condition::InAnyGroup(&[GROUP_CC1, GROUP_CC2]) },
];

const RESTRICTIONS: &[RestrictionRule] = &[
    RestrictionRule {
        headline: "dont-endorsement-headline",
        text: "dont-endorsement-text",
        when: Condition::Always,
    },
    RestrictionRule {
        headline: "dont-technical-measures-headline",
        text: "dont-technical-measures-text",
        when: Condition::Always,
    },
    RestrictionRule {
        headline: "dont-detach-attribution-headline",
        text: "dont-detach-attribution-text",
        when: Condition::UseCase(UseCase::Print),
    },
    RestrictionRule {
        headline: "dont-relicense-headline",
        text: "dont-relicense-text",
        when: Condition::EditedInGroup(GROUP_SA),
    },
];

// ─── Evaluation ─────────────────────────────────────────────────────

/// Owned view of an asset and one result snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEvaluation {
    asset: Arc<Asset>,
    result: DialogueResult,
}

impl DialogueEvaluation {
    pub fn new(asset: Arc<Asset>, result: DialogueResult) -> Self {
        Self { asset, result }
    }

    pub fn asset(&self) -> &Arc<Asset> {
        &self.asset
    }

    pub fn result(&self) -> &DialogueResult {
        &self.result
    }

    /// Generator for this snapshot; an unset editor is filled from the
    /// editing answers
    pub fn attribution_generator(
        &self,
        mut options: AttributionOptions,
    ) -> AttributionResult<AttributionGenerator> {
        if options.editor.is_none() {
            options.editor = self.result.editor_note();
        }
        AttributionGenerator::new(self.asset.clone(), &self.result, options)
    }

    /// Advisory notes and restrictions for this snapshot
    pub fn dos_and_donts(&self) -> DosAndDonts {
        let result = &self.result;

        if result.use_case == UseCase::Private {
            return DosAndDonts {
                dos: vec![NOTE_PRIVATE_USE.to_string()],
                donts: Vec::new(),
            };
        }
        if !result.requires_attribution() {
            return DosAndDonts {
                dos: vec![NOTE_NO_ATTRIBUTION.to_string()],
                donts: Vec::new(),
            };
        }

        let mut dos: Vec<String> = NOTES
            .iter()
            .filter(|r| r.when.holds(result))
            .map(|r| r.id.to_string())
            .collect();
        let donts = RESTRICTIONS
            .iter()
            .filter(|r| r.when.holds(result))
            .map(|r| Restriction {
                headline: r.headline.to_string(),
                text: r.text.to_string(),
            })
            .collect();

        if result.compilation {
            dos.push(NOTE_COMPILATION.to_string());
        }
        if result.full_licence {
            dos.push(NOTE_FULL_LICENCE.to_string());
        }

        DosAndDonts { dos, donts }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
