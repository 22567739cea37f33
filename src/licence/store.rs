//! Ordered licence catalogue with detection and compatibility queries
//!
//! Store order is both detection precedence and restrictiveness rank.
//! Detection collects every match across all tokens and returns the one
//! whose stored licence comes first, so the result never depends on the
//! order in which a caller lists its tokens.

use super::{default_licences, Licence, GROUP_DE, GROUP_PORTED, PORTED_LICENCES};
use crate::config::AttributionConfig;
use crate::{AttributionError, AttributionResult};
use std::collections::BTreeMap;

/// A candidate found during detection
#[derive(Debug, Clone)]
struct DetectionMatch {
    /// Position of the stored licence that matched
    rank: usize,
    licence: Licence,
}

/// Ordered licence catalogue
#[derive(Debug, Clone, Default)]
pub struct LicenceStore {
    licences: Vec<Licence>,
    ported: BTreeMap<String, String>,
}

impl LicenceStore {
    /// Empty store with the built-in ported table
    pub fn new() -> Self {
        Self {
            licences: Vec::new(),
            ported: PORTED_LICENCES.clone(),
        }
    }

    /// Store filled with the default catalogue
    pub fn with_defaults() -> AttributionResult<Self> {
        let mut store = Self::new();
        for licence in default_licences()? {
            store.append_licence(licence)?;
        }
        Ok(store)
    }

    /// Default catalogue plus the ported entries named in the configuration
    pub fn from_config(config: &AttributionConfig) -> AttributionResult<Self> {
        let mut store = Self::with_defaults()?;
        for (token, url) in &config.ported_licences {
            store.add_ported_licence(token, url);
        }
        Ok(store)
    }

    /// Append a licence at the lowest precedence. A malformed record or a
    /// duplicate id is rejected and leaves the store untouched.
    pub fn append_licence(&mut self, licence: Licence) -> AttributionResult<()> {
        licence.validate()?;
        if self.licences.iter().any(|l| l.id() == licence.id()) {
            return Err(AttributionError::InvalidLicence(format!(
                "licence '{}' is already stored",
                licence.id()
            )));
        }
        tracing::debug!("Stored licence {} at rank {}", licence.id(), self.licences.len());
        self.licences.push(licence);
        Ok(())
    }

    /// Register or replace a ported-table entry
    pub fn add_ported_licence(&mut self, token: &str, url: &str) {
        self.ported.insert(token.trim().to_lowercase(), url.to_string());
    }

    /// Exact lookup by id. Abstract templates are never returned.
    pub fn get_licence(&self, id: &str) -> Option<&Licence> {
        self.licences
            .iter()
            .find(|l| l.id() == id && !l.is_abstract())
    }

    /// Restrictiveness rank (store position) of a licence id
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.licences.iter().position(|l| l.id() == id)
    }

    pub fn len(&self) -> usize {
        self.licences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.licences.is_empty()
    }

    /// Stored licences in store order
    pub fn all(&self) -> &[Licence] {
        &self.licences
    }

    /// Resolve a single raw licence token
    pub fn detect_licence_str(&self, token: &str) -> Option<Licence> {
        self.detect_licence(&[token])
    }

    /// Resolve raw licence tokens to the best-matching licence.
    ///
    /// Every token is tested against every stored pattern. Among all matches
    /// the one whose stored licence sits earliest in store order wins. `None`
    /// means nothing matched; callers fall back to [`Licence::unknown`].
    pub fn detect_licence<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Licence> {
        let mut matches: Vec<DetectionMatch> = Vec::new();

        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            for (rank, stored) in self.licences.iter().enumerate() {
                if !stored.matches(token) {
                    continue;
                }
                if let Some(licence) = self.instantiate(stored, token) {
                    matches.push(DetectionMatch { rank, licence });
                }
            }
        }

        // min_by_key keeps the first of equal ranks
        let best = matches.into_iter().min_by_key(|m| m.rank)?;
        tracing::debug!("Detected licence {} (rank {})", best.licence.id(), best.rank);
        Some(best.licence)
    }

    /// Turn a matched stored licence into the concrete value for `token`
    fn instantiate(&self, stored: &Licence, token: &str) -> Option<Licence> {
        if stored.is_abstract() {
            return stored.materialize(token);
        }
        if stored.is_in_group(GROUP_PORTED) {
            let key = token.to_lowercase();
            if let Some(url) = self.ported.get(&key) {
                let jurisdiction = key.rsplit('-').next().unwrap_or("");
                return Some(stored.with_ported_url(url, jurisdiction));
            }
        }
        Some(stored.clone())
    }

    /// Every stored licence at least as restrictive as `id`, excluding `id`.
    ///
    /// A `-de` regional variant reaches one rank further so that it and its
    /// unported twin list each other. Unknown ids yield an empty list.
    pub fn find_compatibilities(&self, id: &str) -> Vec<Licence> {
        let Some(mut index) = self.rank(id) else {
            return Vec::new();
        };
        if self.licences[index].is_in_group(GROUP_DE) {
            index = (index + 1).min(self.licences.len() - 1);
        }

        self.licences[..=index]
            .iter()
            .filter(|l| l.id() != id && !l.is_abstract())
            .cloned()
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
