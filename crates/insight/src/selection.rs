use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InsightError, Result};
use crate::types::FileInsight;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Timeline,
    Architecture,
    Details,
}

impl ActiveView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Architecture => "architecture",
            Self::Details => "details",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveView {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timeline" => Ok(Self::Timeline),
            "architecture" => Ok(Self::Architecture),
            "details" => Ok(Self::Details),
            other => Err(InsightError::InvalidView(other.to_string())),
        }
    }
}

/// Selected path and active view, observed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub path: Option<String>,
    pub view: ActiveView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected,
    Deselected,
}

/// Holds which file is inspected and which view is active.
///
/// Invariant: the view is `Details` only while a path is selected. Every
/// transition replaces the whole [`Selection`], so no caller can observe a
/// path without its view.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    current: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.current.path.as_deref()
    }

    pub fn view(&self) -> ActiveView {
        self.current.view
    }

    /// Select `path` and switch to details. Selecting the selected path again
    /// deselects it and returns to the default view.
    pub fn select(&mut self, path: impl Into<String>) -> SelectionChange {
        let path = path.into();
        if self.current.path.as_deref() == Some(path.as_str()) {
            self.current = Selection::default();
            return SelectionChange::Deselected;
        }
        self.current = Selection {
            path: Some(path),
            view: ActiveView::Details,
        };
        SelectionChange::Selected
    }

    /// Like [`select`](Self::select), but only for paths present in `collection`.
    pub fn select_in(
        &mut self,
        collection: &[FileInsight],
        path: &str,
    ) -> Result<SelectionChange> {
        if !collection.iter().any(|file| file.path == path) {
            return Err(InsightError::UnknownPath(path.to_string()));
        }
        Ok(self.select(path))
    }

    /// Switch views. Details needs a selection; the selection itself is kept
    /// when moving to another view.
    pub fn show(&mut self, view: ActiveView) -> Result<()> {
        if view == ActiveView::Details && self.current.path.is_none() {
            return Err(InsightError::NoSelection);
        }
        self.current = Selection {
            path: self.current.path.clone(),
            view,
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.current = Selection::default();
    }

    /// New analysis: drop everything regardless of state.
    pub fn reset(&mut self) {
        self.clear();
    }

    /// Resolve the selection against a collection.
    pub fn selected_in<'a>(&self, collection: &'a [FileInsight]) -> Option<&'a FileInsight> {
        let path = self.current.path.as_deref()?;
        collection.iter().find(|file| file.path == path)
    }
}
