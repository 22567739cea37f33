//! Attribution text generator
//!
//! Pure rendering of an asset plus a result snapshot into an attribution
//! line. Segment order is fixed:
//!
//! ```text
//! author [(asset url)], "title", editor, licence
//! ```
//!
//! The URL segment only appears in text output; HTML output links the title
//! instead. Each HTML segment is wrapped in a `<span>` with its own class so
//! the caller can style it.

use crate::asset::{Asset, Author};
use crate::dialogue::DialogueResult;
use crate::licence::{Licence, UNKNOWN_LICENCE_NAME};
use crate::{AttributionError, AttributionResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CLASS_AUTHOR: &str = "attribution-author";
pub const CLASS_TITLE: &str = "attribution-title";
pub const CLASS_EDITOR: &str = "attribution-editor";
pub const CLASS_LICENCE: &str = "attribution-licence";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionFormat {
    #[default]
    Text,
    Html,
}

/// Rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionOptions {
    /// Editor segment, e.g. "cropped by Bob"
    pub editor: Option<String>,
    pub format: AttributionFormat,
    /// Render the licence segment only
    pub licence_only: bool,
    /// Link the licence (HTML) or print its legal-code URL (text)
    pub licence_link: bool,
}

impl Default for AttributionOptions {
    fn default() -> Self {
        Self {
            editor: None,
            format: AttributionFormat::Text,
            licence_only: false,
            licence_link: true,
        }
    }
}

/// Renders one asset's attribution under fixed options
#[derive(Debug, Clone)]
pub struct AttributionGenerator {
    asset: Arc<Asset>,
    licence: Licence,
    authors: Vec<Author>,
    notice: Option<String>,
    title: Option<String>,
    url: Option<String>,
    options: AttributionOptions,
    unknown_label: String,
}

impl AttributionGenerator {
    /// Fails with `MissingAssetFact` when an attribution is legally required
    /// but neither the asset nor the answers name the author or the title.
    pub fn new(
        asset: Arc<Asset>,
        result: &DialogueResult,
        options: AttributionOptions,
    ) -> AttributionResult<Self> {
        let notice = result
            .attribution
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let authors: Vec<Author> = result
            .authors
            .iter()
            .filter(|a| !a.name.trim().is_empty())
            .cloned()
            .collect();

        if result.requires_attribution() && !options.licence_only {
            if notice.is_none() && authors.is_empty() {
                return Err(AttributionError::MissingAssetFact { fact: "author" });
            }
            if result.title.is_none() {
                return Err(AttributionError::MissingAssetFact { fact: "title" });
            }
        }

        Ok(Self {
            asset,
            licence: result.licence.clone(),
            authors,
            notice,
            title: result.title.clone(),
            url: result.url.clone(),
            options,
            unknown_label: UNKNOWN_LICENCE_NAME.to_string(),
        })
    }

    /// Label used when the licence could not be detected
    pub fn with_unknown_licence_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = label.into();
        self
    }

    pub fn options(&self) -> &AttributionOptions {
        &self.options
    }

    pub fn licence(&self) -> &Licence {
        &self.licence
    }

    /// Render the attribution. `None` when the licence requires none
    /// (public domain, CC0).
    ///
    /// With `raw` set, HTML output is reduced to its visible text: no
    /// markup, licence by name.
    pub fn generate(&self, raw: bool) -> Option<String> {
        if !self.licence.requires_attribution() {
            return None;
        }
        let markup = self.options.format == AttributionFormat::Html && !raw;

        let mut segments: Vec<String> = Vec::new();
        if !self.options.licence_only {
            segments.push(self.author_segment(markup));
            if let Some(title) = self.title_segment(markup) {
                segments.push(title);
            }
            if let Some(editor) = self.editor_segment(markup) {
                segments.push(editor);
            }
        }
        segments.push(self.licence_segment(markup));

        Some(segments.join(", "))
    }

    fn author_segment(&self, markup: bool) -> String {
        let authors = match (&self.notice, markup) {
            (Some(notice), true) => escape(notice),
            (Some(notice), false) => notice.clone(),
            (None, true) => self
                .authors
                .iter()
                .map(|a| match &a.url {
                    Some(url) => format!("<a href=\"{}\">{}</a>", escape(url), escape(&a.name)),
                    None => escape(&a.name),
                })
                .collect::<Vec<_>>()
                .join(", "),
            (None, false) => self
                .authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        };

        if markup {
            return span(CLASS_AUTHOR, &authors);
        }
        match (&self.url, self.options.format) {
            (Some(url), AttributionFormat::Text) => format!("{} ({})", authors, url),
            _ => authors,
        }
    }

    fn title_segment(&self, markup: bool) -> Option<String> {
        let title = self.title.as_ref()?;
        if !markup {
            return Some(format!("\"{}\"", title));
        }
        let quoted = format!("\"{}\"", escape(title));
        let inner = match &self.url {
            Some(url) => format!("<a href=\"{}\">{}</a>", escape(url), quoted),
            None => quoted,
        };
        Some(span(CLASS_TITLE, &inner))
    }

    fn editor_segment(&self, markup: bool) -> Option<String> {
        let editor = self.options.editor.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        Some(if markup {
            span(CLASS_EDITOR, &escape(editor))
        } else {
            editor.to_string()
        })
    }

    fn licence_segment(&self, markup: bool) -> String {
        let name = if self.licence.is_unknown() {
            self.unknown_label.as_str()
        } else {
            self.licence.name()
        };
        let url = self.licence.url().filter(|_| self.options.licence_link);

        if markup {
            let inner = match url {
                Some(url) => format!(
                    "<a href=\"{}\" rel=\"license\">{}</a>",
                    escape(url),
                    escape(name)
                ),
                None => escape(name),
            };
            return span(CLASS_LICENCE, &inner);
        }
        match (url, self.options.format) {
            (Some(url), AttributionFormat::Text) => url.to_string(),
            _ => name.to_string(),
        }
    }
}

/// Same asset (by identity), same resolved facts, same options
impl PartialEq for AttributionGenerator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.asset, &other.asset)
            && self.licence == other.licence
            && self.authors == other.authors
            && self.notice == other.notice
            && self.title == other.title
            && self.url == other.url
            && self.options == other.options
            && self.unknown_label == other.unknown_label
    }
}

fn span(class: &str, inner: &str) -> String {
    format!("<span class=\"{}\">{}</span>", class, inner)
}

/// Text and attribute values share one escape set
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetRecord;
    use crate::dialogue::DialogueResult;
    use crate::licence::LicenceStore;
    use std::collections::BTreeMap;

    fn store() -> LicenceStore {
        LicenceStore::with_defaults().unwrap()
    }

    fn sunset(licence: Licence) -> Arc<Asset> {
        Arc::new(Asset::generic(
            AssetRecord::new(licence)
                .title("Sunset")
                .author(Author::new("Jane Doe"))
                .url("https://example.org/sunset"),
        ))
    }

    fn generator(asset: &Arc<Asset>, options: AttributionOptions) -> AttributionGenerator {
        let result = DialogueResult::from_answers(asset, &store(), &BTreeMap::new());
        AttributionGenerator::new(asset.clone(), &result, options).unwrap()
    }

    fn html() -> AttributionOptions {
        AttributionOptions {
            format: AttributionFormat::Html,
            ..Default::default()
        }
    }

    #[test]
    fn test_text_with_licence_url() {
        let s = store();
        let asset = sunset(s.get_licence("cc-by-sa-3.0").unwrap().clone());
        let text = generator(&asset, AttributionOptions::default()).generate(false).unwrap();
        assert_eq!(
            text,
            "Jane Doe (https://example.org/sunset), \"Sunset\", https://creativecommons.org/licenses/by-sa/3.0/legalcode"
        );
    }

    #[test]
    fn test_text_without_licence_link_uses_name() {
        let s = store();
        let asset = sunset(s.get_licence("cc-by-4.0").unwrap().clone());
        let opts = AttributionOptions {
            licence_link: false,
            editor: Some("cropped by Bob".into()),
            ..Default::default()
        };
        let text = generator(&asset, opts).generate(false).unwrap();
        assert_eq!(
            text,
            "Jane Doe (https://example.org/sunset), \"Sunset\", cropped by Bob, CC BY 4.0"
        );
    }

    #[test]
    fn test_html_segments() {
        let s = store();
        let asset = sunset(s.get_licence("cc-by-4.0").unwrap().clone());
        let out = generator(&asset, html()).generate(false).unwrap();
        assert_eq!(
            out,
            "<span class=\"attribution-author\">Jane Doe</span>, \
             <span class=\"attribution-title\"><a href=\"https://example.org/sunset\">\"Sunset\"</a></span>, \
             <span class=\"attribution-licence\"><a href=\"https://creativecommons.org/licenses/by/4.0/legalcode\" rel=\"license\">CC BY 4.0</a></span>"
        );
    }

    #[test]
    fn test_html_raw_is_visible_text() {
        let s = store();
        let asset = sunset(s.get_licence("cc-by-4.0").unwrap().clone());
        let out = generator(&asset, html()).generate(true).unwrap();
        assert_eq!(out, "Jane Doe, \"Sunset\", CC BY 4.0");
    }

    #[test]
    fn test_html_escapes_and_links_authors() {
        let s = store();
        let asset = Arc::new(Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-4.0").unwrap().clone())
                .title("Fish & <Chips>")
                .author(Author::with_url("Jane", "https://example.org/u?a=1&b=\"2\""))
                .author(Author::new("Joe")),
        ));
        let out = generator(&asset, html()).generate(false).unwrap();
        assert!(out.contains(
            "<a href=\"https://example.org/u?a=1&amp;b=&quot;2&quot;\">Jane</a>, Joe</span>"
        ));
        assert!(out.contains("\"Fish &amp; &lt;Chips&gt;\""));
    }

    #[test]
    fn test_html_escapes_quotes_in_text() {
        let s = store();
        let asset = Arc::new(Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-4.0").unwrap().clone())
                .title("The \"Big\" Sky")
                .author(Author::new("Jane \"JD\" Doe")),
        ));
        let out = generator(&asset, html()).generate(false).unwrap();
        assert!(out.contains(">\"The &quot;Big&quot; Sky\"</span>"), "got {}", out);
        assert!(out.contains(">Jane &quot;JD&quot; Doe</span>"), "got {}", out);

        // raw output is plain text and keeps the quotes
        let raw = generator(&asset, html()).generate(true).unwrap();
        assert!(raw.contains("\"The \"Big\" Sky\""));
    }

    #[test]
    fn test_notice_preferred_over_authors() {
        let s = store();
        let asset = Arc::new(Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-4.0").unwrap().clone())
                .title("Sunset")
                .author(Author::new("Jane Doe"))
                .attribution("Photo: Jane Doe / ACME"),
        ));
        let text = generator(&asset, AttributionOptions::default()).generate(false).unwrap();
        assert!(text.starts_with("Photo: Jane Doe / ACME, \"Sunset\""));
    }

    #[test]
    fn test_licence_only() {
        let s = store();
        let asset = sunset(s.get_licence("cc-by-4.0").unwrap().clone());
        let opts = AttributionOptions {
            licence_only: true,
            licence_link: false,
            ..Default::default()
        };
        assert_eq!(generator(&asset, opts).generate(false).unwrap(), "CC BY 4.0");
    }

    #[test]
    fn test_pd_and_cc0_yield_none_for_all_options() {
        let s = store();
        for id in ["PD", "cc-zero"] {
            let asset = sunset(s.get_licence(id).unwrap().clone());
            for format in [AttributionFormat::Text, AttributionFormat::Html] {
                for licence_only in [false, true] {
                    for licence_link in [false, true] {
                        let opts = AttributionOptions {
                            editor: Some("edited by Bob".into()),
                            format,
                            licence_only,
                            licence_link,
                        };
                        let g = generator(&asset, opts);
                        assert_eq!(g.generate(false), None);
                        assert_eq!(g.generate(true), None);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_licence_label() {
        let asset = sunset(Licence::unknown());
        let g = generator(&asset, AttributionOptions::default());
        assert!(g.generate(false).unwrap().ends_with(", Unknown licence"));
        let g = g.with_unknown_licence_label("Lizenz unbekannt");
        assert!(g.generate(false).unwrap().ends_with(", Lizenz unbekannt"));
    }

    #[test]
    fn test_missing_author_is_error() {
        let s = store();
        let asset = Arc::new(Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-4.0").unwrap().clone()).title("Sunset"),
        ));
        let result = DialogueResult::from_answers(&asset, &s, &BTreeMap::new());
        let err = AttributionGenerator::new(asset.clone(), &result, AttributionOptions::default())
            .unwrap_err();
        assert!(matches!(err, AttributionError::MissingAssetFact { fact: "author" }));

        // licence-only output does not need the author
        let opts = AttributionOptions {
            licence_only: true,
            ..Default::default()
        };
        assert!(AttributionGenerator::new(asset, &result, opts).is_ok());
    }

    #[test]
    fn test_equality_by_asset_identity_and_options() {
        let s = store();
        let asset = sunset(s.get_licence("cc-by-4.0").unwrap().clone());
        let twin = Arc::new((*asset).clone());

        let a = generator(&asset, AttributionOptions::default());
        let b = generator(&asset, AttributionOptions::default());
        let c = generator(&twin, AttributionOptions::default());
        let d = generator(&asset, html());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_equality_tracks_answered_author() {
        use crate::dialogue::{answer, Dialogue, KEY_AUTHOR};

        let s = Arc::new(store());
        let asset = Arc::new(Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-4.0").unwrap().clone()).title("Sunset"),
        ));
        let mut d = Dialogue::new(asset, s);

        d.complete_step(0, answer([(KEY_AUTHOR, "Alice".into())])).unwrap();
        let alice = d.attribution_generator(AttributionOptions::default()).unwrap();
        d.complete_step(0, answer([(KEY_AUTHOR, "Bob".into())])).unwrap();
        let bob = d.attribution_generator(AttributionOptions::default()).unwrap();

        assert_ne!(alice, bob);
        assert_ne!(alice.generate(false), bob.generate(false));
        assert_eq!(bob, d.attribution_generator(AttributionOptions::default()).unwrap());
    }
}
