//! Async supplement — attribution, advice and optional legal code
//!
//! Fetching a licence's full legal code is the only I/O the engine needs and
//! it belongs to the caller, behind [`LegalCodeSource`]. Requests may overlap:
//! every call to [`SupplementCoordinator::generate_supplement`] takes a
//! sequence number up front, and a response is published only while no newer
//! request has been issued. In-flight fetches are not cancelled; their stale
//! results are dropped.

use super::{AttributionOptions, DialogueEvaluation, DosAndDonts};
use crate::licence::Licence;
use crate::{AttributionError, AttributionResult};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Supplies the full legal-code text of a licence
#[async_trait]
pub trait LegalCodeSource: Send + Sync {
    async fn fetch_legal_code(&self, licence: &Licence) -> AttributionResult<String>;
}

/// Everything rendered for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Supplement {
    pub sequence: u64,
    pub attribution: Option<String>,
    pub dos_and_donts: DosAndDonts,
    /// Present when the full licence text was requested
    pub legal_code: Option<String>,
}

impl Supplement {
    /// Pretty-printed JSON for handing the supplement to a UI layer
    pub fn to_json(&self) -> AttributionResult<String> {
        serde_json::to_string_pretty(self).map_err(AttributionError::Serde)
    }
}

/// Last-write-wins holder for one interview session's supplements
#[derive(Debug, Default)]
pub struct SupplementCoordinator {
    issued: AtomicU64,
    latest: RwLock<Option<Supplement>>,
}

impl SupplementCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next request sequence number
    pub fn next_sequence(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Highest sequence number handed out so far
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Render `evaluation`, fetching the legal code if it was requested.
    ///
    /// Returns `Ok(None)` when a newer request was issued while this one was
    /// in flight; the newer request's output stays authoritative.
    pub async fn generate_supplement(
        &self,
        evaluation: DialogueEvaluation,
        options: AttributionOptions,
        source: &dyn LegalCodeSource,
    ) -> AttributionResult<Option<Supplement>> {
        let sequence = self.next_sequence();

        let attribution = evaluation.attribution_generator(options)?.generate(false);
        let dos_and_donts = evaluation.dos_and_donts();
        let result = evaluation.result();

        let legal_code = if result.full_licence && result.licence.url().is_some() {
            Some(source.fetch_legal_code(&result.licence).await?)
        } else {
            None
        };

        Ok(self
            .publish(Supplement {
                sequence,
                attribution,
                dos_and_donts,
                legal_code,
            })
            .await)
    }

    /// Store `supplement` unless a newer request exists
    pub async fn publish(&self, supplement: Supplement) -> Option<Supplement> {
        let mut latest = self.latest.write().await;
        let stored = latest.as_ref().map(|s| s.sequence).unwrap_or(0);
        if supplement.sequence < self.latest_issued() || supplement.sequence <= stored {
            tracing::warn!(
                "Discarding stale supplement #{} (latest issued #{})",
                supplement.sequence,
                self.latest_issued()
            );
            return None;
        }
        *latest = Some(supplement.clone());
        Some(supplement)
    }

    /// Most recently published supplement
    pub async fn latest(&self) -> Option<Supplement> {
        self.latest.read().await.clone()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
