//! Licence value type
//!
//! A `Licence` describes one licence variant: identifier, group tags, display
//! name, detection pattern and legal-code URL. Policy decisions elsewhere in
//! the crate look at group membership only, never at identifier strings.
//!
//! Two kinds of record live in a [`LicenceStore`]:
//!
//! - **concrete** licences carry a resolved name and URL and can be handed to
//!   callers as they are;
//! - **abstract** licences carry only a pattern plus name/URL templates. They
//!   never leave the store: detection materializes them from the matched token
//!   into a fresh concrete value.

pub mod catalogue;
pub mod store;

pub use catalogue::*;
pub use store::*;

use crate::{AttributionError, AttributionResult};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

// ─── Groups ─────────────────────────────────────────────────────────

/// Public domain: no attribution required
pub const GROUP_PD: &str = "pd";
/// CC0 waiver: no attribution required
pub const GROUP_CC0: &str = "cc0";
/// Any Creative Commons licence
pub const GROUP_CC: &str = "cc";
pub const GROUP_CC1: &str = "cc1";
pub const GROUP_CC2: &str = "cc2";
pub const GROUP_CC3: &str = "cc3";
pub const GROUP_CC4: &str = "cc4";
/// ShareAlike: edited versions must keep a compatible licence
pub const GROUP_SA: &str = "sa";
/// German regional variant, mutually compatible with its unported twin
pub const GROUP_DE: &str = "de";
/// Jurisdiction port of an international licence
pub const GROUP_PORTED: &str = "ported";
/// Licences the interview cannot produce attributions for
pub const GROUP_UNSUPPORTED: &str = "unsupported";

pub const UNKNOWN_LICENCE_ID: &str = "unknown";
pub const UNKNOWN_LICENCE_NAME: &str = "Unknown licence";

// ─── Licence ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum LicenceKind {
    Concrete {
        name: String,
        url: Option<String>,
    },
    /// Name and URL are `$name` templates expanded against the pattern's captures
    Abstract {
        name_template: String,
        url_template: String,
    },
}

/// One licence variant
#[derive(Debug, Clone, Serialize)]
pub struct Licence {
    id: String,
    groups: BTreeSet<String>,
    #[serde(skip)]
    pattern: Option<Regex>,
    #[serde(skip)]
    kind: LicenceKind,
    /// Display name (empty for abstract templates)
    name: String,
    /// Legal-code URL, with any ported override already applied
    url: Option<String>,
    /// Jurisdiction-specific legal code that replaced the generic `url`
    ported_url: Option<String>,
}

impl Licence {
    /// Build a concrete licence. `pattern` is a regular expression tested
    /// against raw licence tokens during detection.
    pub fn new(
        id: impl Into<String>,
        groups: &[&str],
        name: impl Into<String>,
        pattern: &str,
        url: impl Into<String>,
    ) -> AttributionResult<Self> {
        let id = id.into();
        let name = name.into();
        let url = url.into();
        let pattern = compile_pattern(&id, pattern)?;
        Ok(Self {
            id,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            pattern: Some(pattern),
            kind: LicenceKind::Concrete {
                name: name.clone(),
                url: Some(url.clone()),
            },
            name,
            url: Some(url),
            ported_url: None,
        })
    }

    /// Build an abstract licence whose name and URL are derived from the
    /// token it matches. Templates use `$capture` syntax: the name is
    /// expanded against the upper-cased token, the URL against the
    /// lower-cased token.
    pub fn new_abstract(
        id: impl Into<String>,
        groups: &[&str],
        pattern: &str,
        name_template: impl Into<String>,
        url_template: impl Into<String>,
    ) -> AttributionResult<Self> {
        let id = id.into();
        let pattern = compile_pattern(&id, pattern)?;
        Ok(Self {
            id,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            pattern: Some(pattern),
            kind: LicenceKind::Abstract {
                name_template: name_template.into(),
                url_template: url_template.into(),
            },
            name: String::new(),
            url: None,
            ported_url: None,
        })
    }

    /// The sentinel used when no stored licence matches
    pub fn unknown() -> Self {
        Self {
            id: UNKNOWN_LICENCE_ID.into(),
            groups: [GROUP_UNSUPPORTED.to_string()].into_iter().collect(),
            pattern: None,
            kind: LicenceKind::Concrete {
                name: UNKNOWN_LICENCE_NAME.into(),
                url: None,
            },
            name: UNKNOWN_LICENCE_NAME.into(),
            url: None,
            ported_url: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn ported_url(&self) -> Option<&str> {
        self.ported_url.as_deref()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, LicenceKind::Abstract { .. })
    }

    pub fn is_unknown(&self) -> bool {
        self.pattern.is_none() && self.url.is_none()
    }

    /// Public domain and CC0 assets need no attribution
    pub fn requires_attribution(&self) -> bool {
        !(self.is_in_group(GROUP_PD) || self.is_in_group(GROUP_CC0))
    }

    /// Test a raw licence token against the detection pattern
    pub fn matches(&self, token: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|p| p.is_match(token.trim()))
            .unwrap_or(false)
    }

    /// Materialize the licence for a matched token. Concrete licences are
    /// cloned; abstract ones get their id, name and URL from the token.
    pub fn materialize(&self, token: &str) -> Option<Licence> {
        let LicenceKind::Abstract {
            name_template,
            url_template,
        } = &self.kind
        else {
            return Some(self.clone());
        };
        let pattern = self.pattern.as_ref()?;
        let token = token.trim();

        let upper = token.to_uppercase();
        let lower = token.to_lowercase();
        let upper_caps = pattern.captures(&upper)?;
        let lower_caps = pattern.captures(&lower)?;

        let mut name = String::new();
        upper_caps.expand(name_template, &mut name);
        let mut url = String::new();
        lower_caps.expand(url_template, &mut url);
        let id = lower_caps.get(0)?.as_str().to_string();

        Some(Licence {
            id,
            groups: self.groups.clone(),
            pattern: self.pattern.clone(),
            kind: LicenceKind::Concrete {
                name: name.clone(),
                url: Some(url.clone()),
            },
            name,
            url: Some(url),
            ported_url: None,
        })
    }

    /// Copy of this licence pointing at a jurisdiction's legal code
    pub fn with_ported_url(&self, url: &str, jurisdiction: &str) -> Licence {
        let mut ported = self.clone();
        ported.url = Some(url.to_string());
        ported.ported_url = Some(url.to_string());
        if !jurisdiction.is_empty() {
            ported.name = format!("{} {}", base_ported_name(&self.name), jurisdiction.to_uppercase());
        }
        ported
    }

    pub(crate) fn validate(&self) -> AttributionResult<()> {
        if self.id.trim().is_empty() || self.id.chars().any(char::is_whitespace) {
            return Err(AttributionError::InvalidLicence(format!(
                "licence id {:?} must be non-empty and contain no whitespace",
                self.id
            )));
        }
        if self.pattern.is_none() {
            return Err(AttributionError::InvalidLicence(format!(
                "licence '{}' has no detection pattern",
                self.id
            )));
        }
        match &self.kind {
            LicenceKind::Concrete { name, url } => {
                if name.trim().is_empty() {
                    return Err(AttributionError::InvalidLicence(format!(
                        "licence '{}' has an empty name",
                        self.id
                    )));
                }
                match url {
                    Some(u) if u.starts_with("http://") || u.starts_with("https://") => Ok(()),
                    _ => Err(AttributionError::InvalidLicence(format!(
                        "licence '{}' needs an http(s) legal-code URL",
                        self.id
                    ))),
                }
            }
            LicenceKind::Abstract {
                name_template,
                url_template,
            } => {
                if name_template.is_empty() || url_template.is_empty() {
                    return Err(AttributionError::InvalidLicence(format!(
                        "abstract licence '{}' needs name and URL templates",
                        self.id
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Structural equality; the compiled pattern is ignored
impl PartialEq for Licence {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.groups == other.groups
            && self.name == other.name
            && self.url == other.url
            && self.ported_url == other.ported_url
    }
}

impl Eq for Licence {}

impl fmt::Display for Licence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn compile_pattern(id: &str, pattern: &str) -> AttributionResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        AttributionError::InvalidLicence(format!("licence '{}' has a bad pattern: {}", id, e))
    })
}

/// "CC BY-SA 2.0 (ported)" -> "CC BY-SA 2.0"
fn base_ported_name(name: &str) -> &str {
    name.trim_end_matches(" (ported)")
}

// ─── Tests ──────────────────────────────────────────────────────────
