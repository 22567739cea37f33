//! Asset records supplied by the surrounding application
//!
//! The engine consumes assets, it never fetches or scrapes them. A wiki asset
//! is the same record plus the wiki it was found on.

use crate::licence::Licence;
use serde::{Deserialize, Serialize};

/// One credited creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Profile or homepage link
    pub url: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    pub fn with_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Bitmap,
    Drawing,
    Audio,
    Video,
    #[default]
    Unknown,
}

/// Facts shared by every asset variant
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub title: Option<String>,
    pub media_type: MediaType,
    pub licence: Licence,
    pub authors: Vec<Author>,
    /// Canonical page of the asset
    pub url: Option<String>,
    /// Dedicated attribution notice, preferred over the author list
    pub attribution: Option<String>,
}

impl AssetRecord {
    pub fn new(licence: Licence) -> Self {
        Self {
            title: None,
            media_type: MediaType::Unknown,
            licence,
            authors: Vec::new(),
            url: None,
            attribution: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn attribution(mut self, notice: impl Into<String>) -> Self {
        self.attribution = Some(notice.into());
        self
    }
}

/// An asset to be attributed
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Generic(AssetRecord),
    Wiki {
        record: AssetRecord,
        /// Wiki the asset was found on, e.g. "commons.wikimedia.org"
        wiki: Option<String>,
    },
}

impl Asset {
    pub fn generic(record: AssetRecord) -> Self {
        Self::Generic(record)
    }

    pub fn wiki(record: AssetRecord, wiki: Option<String>) -> Self {
        Self::Wiki { record, wiki }
    }

    fn record(&self) -> &AssetRecord {
        match self {
            Self::Generic(record) | Self::Wiki { record, .. } => record,
        }
    }

    pub fn licence(&self) -> &Licence {
        &self.record().licence
    }

    pub fn authors(&self) -> &[Author] {
        &self.record().authors
    }

    pub fn title(&self) -> Option<&str> {
        self.record().title.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.record().url.as_deref()
    }

    pub fn attribution(&self) -> Option<&str> {
        self.record().attribution.as_deref()
    }

    pub fn media_type(&self) -> MediaType {
        self.record().media_type
    }

    pub fn wiki_origin(&self) -> Option<&str> {
        match self {
            Self::Wiki { wiki, .. } => wiki.as_deref(),
            Self::Generic(_) => None,
        }
    }

    /// An attribution notice counts as a credited author
    pub fn has_author(&self) -> bool {
        self.attribution().is_some_and(|a| !a.trim().is_empty())
            || self.authors().iter().any(|a| !a.name.trim().is_empty())
    }

    pub fn has_title(&self) -> bool {
        self.title().is_some_and(|t| !t.trim().is_empty())
    }
}
