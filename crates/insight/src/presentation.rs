//! Presentation tokens for closed label sets.
//!
//! Views ask this module for a [`Tone`] or a glyph instead of carrying their
//! own lookup tables, so a category renders the same everywhere.

use codelore_protocol::ChangeType;
use serde::Serialize;

use crate::types::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Green,
    Blue,
    Purple,
    Orange,
    Teal,
    Indigo,
    Yellow,
    Red,
    Gray,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Teal => "teal",
            Self::Indigo => "indigo",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }

    /// SGR parameters for terminals.
    pub fn ansi_code(self) -> &'static str {
        match self {
            Self::Green => "32",
            Self::Blue => "34",
            Self::Purple => "35",
            Self::Orange => "38;5;208",
            Self::Teal => "36",
            Self::Indigo => "94",
            Self::Yellow => "33",
            Self::Red => "31",
            Self::Gray => "90",
        }
    }

    pub fn paint(self, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.ansi_code(), text)
    }
}

/// Anything that gets a presentation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Category(Category),
    Change(ChangeType),
}

impl From<Category> for Label {
    fn from(category: Category) -> Self {
        Self::Category(category)
    }
}

impl From<ChangeType> for Label {
    fn from(change: ChangeType) -> Self {
        Self::Change(change)
    }
}

pub fn tone(label: impl Into<Label>) -> Tone {
    match label.into() {
        Label::Category(category) => match category {
            Category::UiComponent => Tone::Green,
            Category::ApiEndpoint => Tone::Blue,
            Category::DataModel => Tone::Purple,
            Category::BusinessLogic => Tone::Orange,
            Category::FrontendUtility => Tone::Teal,
            Category::BackendUtility => Tone::Indigo,
            Category::Configuration => Tone::Yellow,
            Category::Test => Tone::Red,
            Category::StateManagement
            | Category::FrontendLogic
            | Category::BackendLogic
            | Category::Documentation
            | Category::Styling
            | Category::Other => Tone::Gray,
        },
        Label::Change(change) => match change {
            ChangeType::Added => Tone::Green,
            ChangeType::Modified => Tone::Yellow,
            ChangeType::Removed => Tone::Red,
        },
    }
}

pub fn change_glyph(change: ChangeType) -> &'static str {
    match change {
        ChangeType::Added => "+",
        ChangeType::Modified => "~",
        ChangeType::Removed => "-",
    }
}

/// Coarse file kind derived from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Component,
    Script,
    Python,
    Data,
    Docs,
    Style,
    Markup,
    Config,
    Database,
    Shell,
    Other,
}

impl FileKind {
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let ext = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return Self::Other,
        };
        match ext.as_str() {
            "tsx" | "jsx" => Self::Component,
            "ts" | "js" => Self::Script,
            "py" => Self::Python,
            "json" | "txt" => Self::Data,
            "md" => Self::Docs,
            "css" => Self::Style,
            "html" => Self::Markup,
            "yml" | "yaml" => Self::Config,
            "sql" => Self::Database,
            "sh" | "bat" | "ps1" => Self::Shell,
            _ => Self::Other,
        }
    }

    /// Short fixed-width tag for listings.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Component => "cmp",
            Self::Script => "js ",
            Self::Python => "py ",
            Self::Data => "dat",
            Self::Docs => "doc",
            Self::Style => "css",
            Self::Markup => "htm",
            Self::Config => "cfg",
            Self::Database => "sql",
            Self::Shell => "sh ",
            Self::Other => "   ",
        }
    }
}
