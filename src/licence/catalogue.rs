//! Built-in licence catalogue
//!
//! The order of [`DEFAULT_CATALOGUE`] is significant twice over: it is the
//! detection precedence (earliest match wins) and the restrictiveness ranking
//! used by [`LicenceStore::find_compatibilities`](super::LicenceStore::find_compatibilities).
//! Index 0 is the most demanding licence; every licence may be relicensed
//! under the entries that precede it.
//!
//! Regional `-de` variants sit directly before their unported twin so the
//! two are mutually compatible.

use super::{
    Licence, GROUP_CC, GROUP_CC0, GROUP_CC1, GROUP_CC2, GROUP_CC3, GROUP_CC4, GROUP_DE,
    GROUP_PD, GROUP_PORTED, GROUP_SA, GROUP_UNSUPPORTED,
};
use crate::AttributionResult;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// One catalogue row: `(id, groups, display name, detection pattern, legal-code URL)`
#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub id: &'static str,
    pub groups: &'static [&'static str],
    pub name: &'static str,
    pub pattern: &'static str,
    pub url: &'static str,
}

const fn entry(
    id: &'static str,
    groups: &'static [&'static str],
    name: &'static str,
    pattern: &'static str,
    url: &'static str,
) -> CatalogueEntry {
    CatalogueEntry {
        id,
        groups,
        name,
        pattern,
        url,
    }
}

pub const DEFAULT_CATALOGUE: &[CatalogueEntry] = &[
    // ── BY-SA ──
    entry(
        "cc-by-sa-4.0",
        &[GROUP_CC, GROUP_CC4, GROUP_SA],
        "CC BY-SA 4.0",
        r"(?i)^cc-by-sa-4\.0$",
        "https://creativecommons.org/licenses/by-sa/4.0/legalcode",
    ),
    entry(
        "cc-by-sa-3.0-de",
        &[GROUP_CC, GROUP_CC3, GROUP_SA, GROUP_DE],
        "CC BY-SA 3.0 DE",
        r"(?i)^cc-by-sa-3\.0-de$",
        "https://creativecommons.org/licenses/by-sa/3.0/de/legalcode",
    ),
    entry(
        "cc-by-sa-3.0",
        &[GROUP_CC, GROUP_CC3, GROUP_SA],
        "CC BY-SA 3.0",
        r"(?i)^cc-by-sa-3\.0(-migrated)?(,[\d.,]+)?$",
        "https://creativecommons.org/licenses/by-sa/3.0/legalcode",
    ),
    entry(
        "cc-by-sa-3.0-ported",
        &[GROUP_CC, GROUP_CC3, GROUP_SA, GROUP_PORTED],
        "CC BY-SA 3.0 (ported)",
        r"(?i)^cc-by-sa-3\.0-[a-z]{2,}$",
        "https://creativecommons.org/licenses/by-sa/3.0/legalcode",
    ),
    entry(
        "cc-by-sa-2.5",
        &[GROUP_CC, GROUP_CC2, GROUP_SA],
        "CC BY-SA 2.5",
        r"(?i)^cc-by-sa-2\.5(,[\d.,]+)?$",
        "https://creativecommons.org/licenses/by-sa/2.5/legalcode",
    ),
    entry(
        "cc-by-sa-2.5-ported",
        &[GROUP_CC, GROUP_CC2, GROUP_SA, GROUP_PORTED],
        "CC BY-SA 2.5 (ported)",
        r"(?i)^cc-by-sa-2\.5-[a-z]{2,}$",
        "https://creativecommons.org/licenses/by-sa/2.5/legalcode",
    ),
    entry(
        "cc-by-sa-2.0-de",
        &[GROUP_CC, GROUP_CC2, GROUP_SA, GROUP_DE],
        "CC BY-SA 2.0 DE",
        r"(?i)^cc-by-sa-2\.0-de$",
        "https://creativecommons.org/licenses/by-sa/2.0/de/legalcode",
    ),
    entry(
        "cc-by-sa-2.0",
        &[GROUP_CC, GROUP_CC2, GROUP_SA],
        "CC BY-SA 2.0",
        r"(?i)^cc-by-sa-2\.0(,[\d.,]+)?$",
        "https://creativecommons.org/licenses/by-sa/2.0/legalcode",
    ),
    entry(
        "cc-by-sa-2.0-ported",
        &[GROUP_CC, GROUP_CC2, GROUP_SA, GROUP_PORTED],
        "CC BY-SA 2.0 (ported)",
        r"(?i)^cc-by-sa-2\.0-[a-z]{2,}$",
        "https://creativecommons.org/licenses/by-sa/2.0/legalcode",
    ),
    entry(
        "cc-by-sa-1.0",
        &[GROUP_CC, GROUP_CC1, GROUP_SA],
        "CC BY-SA 1.0",
        r"(?i)^cc-by-sa-1\.0$",
        "https://creativecommons.org/licenses/by-sa/1.0/legalcode",
    ),
    // ── BY ──
    entry(
        "cc-by-4.0",
        &[GROUP_CC, GROUP_CC4],
        "CC BY 4.0",
        r"(?i)^cc-by-4\.0$",
        "https://creativecommons.org/licenses/by/4.0/legalcode",
    ),
    entry(
        "cc-by-3.0-de",
        &[GROUP_CC, GROUP_CC3, GROUP_DE],
        "CC BY 3.0 DE",
        r"(?i)^cc-by-3\.0-de$",
        "https://creativecommons.org/licenses/by/3.0/de/legalcode",
    ),
    entry(
        "cc-by-3.0",
        &[GROUP_CC, GROUP_CC3],
        "CC BY 3.0",
        r"(?i)^cc-by-3\.0(-migrated)?(,[\d.,]+)?$",
        "https://creativecommons.org/licenses/by/3.0/legalcode",
    ),
    entry(
        "cc-by-3.0-ported",
        &[GROUP_CC, GROUP_CC3, GROUP_PORTED],
        "CC BY 3.0 (ported)",
        r"(?i)^cc-by-3\.0-[a-z]{2,}$",
        "https://creativecommons.org/licenses/by/3.0/legalcode",
    ),
    entry(
        "cc-by-2.5",
        &[GROUP_CC, GROUP_CC2],
        "CC BY 2.5",
        r"(?i)^cc-by-2\.5(,[\d.,]+)?$",
        "https://creativecommons.org/licenses/by/2.5/legalcode",
    ),
    entry(
        "cc-by-2.5-ported",
        &[GROUP_CC, GROUP_CC2, GROUP_PORTED],
        "CC BY 2.5 (ported)",
        r"(?i)^cc-by-2\.5-[a-z]{2,}$",
        "https://creativecommons.org/licenses/by/2.5/legalcode",
    ),
    entry(
        "cc-by-2.0-de",
        &[GROUP_CC, GROUP_CC2, GROUP_DE],
        "CC BY 2.0 DE",
        r"(?i)^cc-by-2\.0-de$",
        "https://creativecommons.org/licenses/by/2.0/de/legalcode",
    ),
    entry(
        "cc-by-2.0",
        &[GROUP_CC, GROUP_CC2],
        "CC BY 2.0",
        r"(?i)^cc-by-2\.0(,[\d.,]+)?$",
        "https://creativecommons.org/licenses/by/2.0/legalcode",
    ),
    entry(
        "cc-by-2.0-ported",
        &[GROUP_CC, GROUP_CC2, GROUP_PORTED],
        "CC BY 2.0 (ported)",
        r"(?i)^cc-by-2\.0-[a-z]{2,}$",
        "https://creativecommons.org/licenses/by/2.0/legalcode",
    ),
    entry(
        "cc-by-1.0",
        &[GROUP_CC, GROUP_CC1],
        "CC BY 1.0",
        r"(?i)^cc-by-1\.0$",
        "https://creativecommons.org/licenses/by/1.0/legalcode",
    ),
    // ── No attribution required ──
    entry(
        "cc-zero",
        &[GROUP_CC0],
        "CC0 1.0",
        r"(?i)^(cc-zero|cc0(-1\.0)?)$",
        "https://creativecommons.org/publicdomain/zero/1.0/legalcode",
    ),
    entry(
        "PD",
        &[GROUP_PD],
        "Public Domain",
        r"(?i)^(bild-)?(pd|public[ -]domain)\b",
        "https://creativecommons.org/publicdomain/mark/1.0/",
    ),
];

/// Catch-all for CC variants the interview does not support (NC, ND, ...).
/// Last in store order so every concrete entry takes precedence.
pub const ABSTRACT_CC_ID: &str = "cc";
const ABSTRACT_CC_GROUPS: &[&str] = &[GROUP_CC, GROUP_UNSUPPORTED];
const ABSTRACT_CC_PATTERN: &str =
    r"(?i)^cc-(?P<kind>by(?:-nc)?(?:-nd)?(?:-sa)?)-(?P<version>\d\.\d)";
const ABSTRACT_CC_NAME: &str = "CC $kind $version";
const ABSTRACT_CC_URL: &str = "https://creativecommons.org/licenses/$kind/$version/legalcode";

/// Jurisdiction ports per version; each yields a BY and a BY-SA table entry
const PORTS: &[(&str, &[&str])] = &[
    (
        "2.0",
        &[
            "at", "au", "be", "br", "ca", "cl", "es", "fr", "hr", "it", "jp", "kr", "nl", "pl",
            "tw", "uk",
        ],
    ),
    (
        "2.5",
        &[
            "ar", "au", "bg", "br", "ca", "ch", "cn", "co", "dk", "es", "hr", "hu", "il", "in",
            "it", "mk", "mt", "mx", "my", "nl", "pe", "pl", "pt", "scotland", "se", "si", "tw",
            "za",
        ],
    ),
    (
        "3.0",
        &[
            "at", "au", "br", "ch", "cl", "cn", "cr", "cz", "ec", "ee", "es", "fr", "gr", "gt",
            "hk", "hr", "ie", "igo", "it", "lu", "nl", "no", "nz", "ph", "pl", "pr", "pt", "ro",
            "rs", "sg", "th", "tw", "ug", "us", "ve", "vn", "za",
        ],
    ),
];

/// Lower-cased regional token → jurisdiction legal-code URL
pub static PORTED_LICENCES: Lazy<BTreeMap<String, String>> = Lazy::new(|| {
    let mut table = BTreeMap::new();
    for (version, jurisdictions) in PORTS {
        for jurisdiction in *jurisdictions {
            for kind in ["by", "by-sa"] {
                table.insert(
                    format!("cc-{}-{}-{}", kind, version, jurisdiction),
                    format!(
                        "https://creativecommons.org/licenses/{}/{}/{}/legalcode",
                        kind, version, jurisdiction
                    ),
                );
            }
        }
    }
    table
});

/// The default catalogue in store order, abstract CC template last
pub fn default_licences() -> AttributionResult<Vec<Licence>> {
    let mut licences = DEFAULT_CATALOGUE
        .iter()
        .map(|e| Licence::new(e.id, e.groups, e.name, e.pattern, e.url))
        .collect::<AttributionResult<Vec<_>>>()?;
    licences.push(Licence::new_abstract(
        ABSTRACT_CC_ID,
        ABSTRACT_CC_GROUPS,
        ABSTRACT_CC_PATTERN,
        ABSTRACT_CC_NAME,
        ABSTRACT_CC_URL,
    )?);
    Ok(licences)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_compiles() {
        let licences = default_licences().unwrap();
        assert_eq!(licences.len(), DEFAULT_CATALOGUE.len() + 1);
        assert!(licences.last().unwrap().is_abstract());
        for lic in &licences {
            assert!(lic.validate().is_ok(), "{} should validate", lic.id());
        }
    }

    #[test]
    fn test_catalogue_ids_unique() {
        let mut seen = HashSet::new();
        for e in DEFAULT_CATALOGUE {
            assert!(seen.insert(e.id), "duplicate id {}", e.id);
        }
    }

    #[test]
    fn test_regional_de_precedes_unported_twin() {
        let ids: Vec<&str> = DEFAULT_CATALOGUE.iter().map(|e| e.id).collect();
        for (i, e) in DEFAULT_CATALOGUE.iter().enumerate() {
            if e.groups.contains(&GROUP_DE) {
                let twin = e.id.trim_end_matches("-de");
                assert_eq!(ids.get(i + 1), Some(&twin), "{} must precede {}", e.id, twin);
            }
        }
    }

    #[test]
    fn test_ported_table_urls() {
        assert_eq!(
            PORTED_LICENCES.get("cc-by-sa-2.0-at").map(String::as_str),
            Some("https://creativecommons.org/licenses/by-sa/2.0/at/legalcode")
        );
        assert_eq!(
            PORTED_LICENCES.get("cc-by-3.0-us").map(String::as_str),
            Some("https://creativecommons.org/licenses/by/3.0/us/legalcode")
        );
        assert!(!PORTED_LICENCES.contains_key("cc-by-sa-4.0-at"));
    }
}
