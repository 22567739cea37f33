//! Result snapshot — asset facts layered with the answers given so far
//!
//! Never stored; [`Dialogue::get_result`](super::Dialogue::get_result)
//! rebuilds it from scratch on every call.

use super::AnswerValue;
use crate::asset::{Asset, Author};
use crate::licence::{Licence, LicenceStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Answer keys
pub const KEY_TYPE: &str = "type";
pub const KEY_FULL_LICENCE: &str = "fullLicence";
pub const KEY_EDITED: &str = "edited";
pub const KEY_CHANGE: &str = "change";
pub const KEY_CREATOR: &str = "name";
pub const KEY_LICENCE: &str = "licence";
pub const KEY_COMPILATION: &str = "compilation";
pub const KEY_AUTHOR: &str = "author";
pub const KEY_AUTHOR_URL: &str = "authorUrl";
pub const KEY_TITLE: &str = "title";

/// How the asset is going to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase {
    Print,
    Online,
    Private,
    #[default]
    Other,
}

impl UseCase {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "print" => Some(Self::Print),
            "online" => Some(Self::Online),
            "private" => Some(Self::Private),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Online => "online",
            Self::Private => "private",
            Self::Other => "other",
        }
    }
}

/// Read-only projection of asset facts and logged answers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueResult {
    /// Asset licence, or the licence chosen for the edited version
    pub licence: Licence,
    pub use_case: UseCase,
    pub full_licence: bool,
    pub compilation: bool,
    pub edited: bool,
    /// What was changed, e.g. "cropped"
    pub change: Option<String>,
    /// Who made the change
    pub editor: Option<String>,
    pub authors: Vec<Author>,
    pub attribution: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

impl DialogueResult {
    /// Layer `answers` (already folded in step order) over the asset's facts
    pub fn from_answers(
        asset: &Asset,
        store: &LicenceStore,
        answers: &BTreeMap<String, AnswerValue>,
    ) -> Self {
        let text = |key: &str| {
            answers
                .get(key)
                .and_then(AnswerValue::as_text)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let flag = |key: &str| answers.get(key).and_then(AnswerValue::as_flag).unwrap_or(false);

        let licence = match text(KEY_LICENCE) {
            Some(id) if id == asset.licence().id() => asset.licence().clone(),
            Some(id) => store
                .get_licence(&id)
                .cloned()
                .unwrap_or_else(|| asset.licence().clone()),
            None => asset.licence().clone(),
        };

        let edited = flag(KEY_EDITED);

        let authors = if asset.has_author() {
            asset.authors().to_vec()
        } else {
            text(KEY_AUTHOR)
                .map(|name| {
                    vec![Author {
                        name,
                        url: text(KEY_AUTHOR_URL),
                    }]
                })
                .unwrap_or_default()
        };

        let title = if asset.has_title() {
            asset.title().map(str::to_string)
        } else {
            text(KEY_TITLE)
        };

        Self {
            licence,
            use_case: text(KEY_TYPE)
                .and_then(|t| UseCase::parse(&t))
                .unwrap_or_default(),
            full_licence: flag(KEY_FULL_LICENCE),
            compilation: flag(KEY_COMPILATION),
            edited,
            change: text(KEY_CHANGE).filter(|_| edited),
            editor: text(KEY_CREATOR).filter(|_| edited),
            authors,
            attribution: asset.attribution().map(str::to_string),
            title,
            url: asset.url().map(str::to_string),
        }
    }

    pub fn requires_attribution(&self) -> bool {
        self.licence.requires_attribution()
    }

    /// Editor segment text: "cropped by Bob", "edited by Bob" or "cropped"
    pub fn editor_note(&self) -> Option<String> {
        if !self.edited {
            return None;
        }
        match (&self.change, &self.editor) {
            (Some(change), Some(editor)) => Some(format!("{} by {}", change, editor)),
            (None, Some(editor)) => Some(format!("edited by {}", editor)),
            (Some(change), None) => Some(change.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetRecord;

    fn store() -> LicenceStore {
        LicenceStore::with_defaults().unwrap()
    }

    fn asset(store: &LicenceStore) -> Asset {
        Asset::generic(
            AssetRecord::new(store.get_licence("cc-by-3.0").unwrap().clone())
                .title("Sunset")
                .author(Author::new("Jane Doe")),
        )
    }

    #[test]
    fn test_defaults_without_answers() {
        let s = store();
        let result = DialogueResult::from_answers(&asset(&s), &s, &BTreeMap::new());
        assert_eq!(result.use_case, UseCase::Other);
        assert!(!result.edited);
        assert!(!result.full_licence);
        assert!(!result.compilation);
        assert_eq!(result.licence.id(), "cc-by-3.0");
        assert_eq!(result.editor_note(), None);
    }

    #[test]
    fn test_licence_answer_overrides_asset_licence() {
        let s = store();
        let mut answers = BTreeMap::new();
        answers.insert(KEY_EDITED.to_string(), AnswerValue::Flag(true));
        answers.insert(KEY_LICENCE.to_string(), AnswerValue::from("cc-by-sa-4.0"));
        let result = DialogueResult::from_answers(&asset(&s), &s, &answers);
        assert_eq!(result.licence.id(), "cc-by-sa-4.0");
    }

    #[test]
    fn test_editor_note_variants() {
        let s = store();
        let mut answers = BTreeMap::new();
        answers.insert(KEY_EDITED.to_string(), AnswerValue::Flag(true));
        answers.insert(KEY_CREATOR.to_string(), AnswerValue::from("Bob"));
        let result = DialogueResult::from_answers(&asset(&s), &s, &answers);
        assert_eq!(result.editor_note().as_deref(), Some("edited by Bob"));

        answers.insert(KEY_CHANGE.to_string(), AnswerValue::from("cropped"));
        let result = DialogueResult::from_answers(&asset(&s), &s, &answers);
        assert_eq!(result.editor_note().as_deref(), Some("cropped by Bob"));

        answers.insert(KEY_EDITED.to_string(), AnswerValue::Flag(false));
        let result = DialogueResult::from_answers(&asset(&s), &s, &answers);
        assert_eq!(result.editor, None);
        assert_eq!(result.editor_note(), None);
    }

    #[test]
    fn test_corrective_author_only_when_missing() {
        let s = store();
        let mut answers = BTreeMap::new();
        answers.insert(KEY_AUTHOR.to_string(), AnswerValue::from("Someone Else"));
        let result = DialogueResult::from_answers(&asset(&s), &s, &answers);
        assert_eq!(result.authors, vec![Author::new("Jane Doe")]);

        let anonymous = Asset::generic(AssetRecord::new(Licence::unknown()).title("Sunset"));
        let result = DialogueResult::from_answers(&anonymous, &s, &answers);
        assert_eq!(result.authors, vec![Author::new("Someone Else")]);
    }

    #[test]
    fn test_use_case_parse() {
        assert_eq!(UseCase::parse("print"), Some(UseCase::Print));
        assert_eq!(UseCase::parse("radio"), None);
        assert_eq!(UseCase::Online.as_str(), "online");
    }
}
