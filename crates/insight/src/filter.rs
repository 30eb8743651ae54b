use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::types::{Category, FileInsight};

/// Category half of a filter: everything, or one exact label.
///
/// The label is kept verbatim so a value outside the known set filters down
/// to nothing instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Label(String),
}

impl CategoryFilter {
    /// `"all"` (any case) and the empty string select everything.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Label(trimmed.to_string())
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Label(label) => category.label() == label,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Label(category.label().to_string())
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Search text plus category, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    search: String,
    needle: String,
    category: CategoryFilter,
}

impl FileFilter {
    pub fn new(search: impl Into<String>, category: CategoryFilter) -> Self {
        let search = search.into();
        let needle = search.to_lowercase();
        Self {
            search,
            needle,
            category,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn is_active(&self) -> bool {
        !self.needle.is_empty() || self.category != CategoryFilter::All
    }

    pub fn matches_search(&self, file: &FileInsight) -> bool {
        self.needle.is_empty() || file.path.to_lowercase().contains(&self.needle)
    }

    pub fn matches_category(&self, file: &FileInsight) -> bool {
        self.category.matches(file.role.category)
    }

    pub fn matches(&self, file: &FileInsight) -> bool {
        self.matches_search(file) && self.matches_category(file)
    }

    /// Matching files in collection order.
    pub fn apply<'a>(&self, collection: &'a [FileInsight]) -> Vec<&'a FileInsight> {
        collection.iter().filter(|file| self.matches(file)).collect()
    }
}

/// Filter a collection by search text and category.
pub fn filter_files<'a>(
    collection: &'a [FileInsight],
    search: &str,
    category: &CategoryFilter,
) -> Vec<&'a FileInsight> {
    FileFilter::new(search, category.clone()).apply(collection)
}

/// Search predicate alone, preserving input order.
pub fn by_search<'a, I>(files: I, search: &str) -> Vec<&'a FileInsight>
where
    I: IntoIterator<Item = &'a FileInsight>,
{
    let filter = FileFilter::new(search, CategoryFilter::All);
    files
        .into_iter()
        .filter(|file| filter.matches_search(file))
        .collect()
}

/// Category predicate alone, preserving input order.
pub fn by_category<'a, I>(files: I, category: &CategoryFilter) -> Vec<&'a FileInsight>
where
    I: IntoIterator<Item = &'a FileInsight>,
{
    files
        .into_iter()
        .filter(|file| category.matches(file.role.category))
        .collect()
}

/// Distinct categories present in a collection, sorted by label.
pub fn categories(collection: &[FileInsight]) -> Vec<Category> {
    let labels: BTreeSet<&'static str> = collection
        .iter()
        .map(|file| file.role.category.label())
        .collect();
    labels.into_iter().filter_map(Category::from_label).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} files", self.shown, self.total)
    }
}
