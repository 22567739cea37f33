//! # attribution-engine — Licence Resolution & Attribution Decisions
//!
//! Works out how a reused media asset has to be credited. Given an asset and
//! its licence tokens, the engine resolves a concrete licence, walks the
//! user through a short interview, and renders the attribution together with
//! the dos and don'ts that apply to the intended use.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  LicenceStore (ordered catalogue + ported table)            │
//! │    detect_licence ──▶ Licence ──▶ Asset                     │
//! │                                    │                        │
//! │  Dialogue (steps + cursor + snapshot log)  ◀── answers      │
//! │    get_result ──▶ DialogueResult                            │
//! │                     │                                       │
//! │  DialogueEvaluation ├──▶ AttributionGenerator ──▶ text/html │
//! │                     └──▶ DosAndDonts                        │
//! │                                                             │
//! │  SupplementCoordinator (async legal code, last-write-wins)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page routing for the interview UI lives in [`questionnaire`]; rendering
//! defaults and extra ported licences are read from `.attribution.toml`
//! by [`config`].

pub mod asset;
pub mod config;
pub mod dialogue;
pub mod evaluation;
pub mod licence;
pub mod questionnaire;

// Re-exports for convenience
pub use asset::{Asset, AssetRecord, Author, MediaType};
pub use config::AttributionConfig;
pub use dialogue::{AnswerData, AnswerValue, Dialogue, DialogueResult, DialogueStep, UseCase};
pub use evaluation::{
    AttributionFormat, AttributionGenerator, AttributionOptions, DialogueEvaluation, DosAndDonts,
    LegalCodeSource, Supplement, SupplementCoordinator,
};
pub use licence::{Licence, LicenceStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Invalid licence: {0}")]
    InvalidLicence(String),

    #[error("Asset has no {fact} and none was supplied")]
    MissingAssetFact { fact: &'static str },

    #[error("Step {index} out of range (dialogue has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Dialogue is already done")]
    DialogueDone,

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Legal code fetch failed: {0}")]
    LegalCodeFetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type AttributionResult<T> = Result<T, AttributionError>;
