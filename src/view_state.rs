//! Per-page interactive state: selected year, hidden categories, point
//! selection and open/closed panels.
//!
//! Each page owns one `ViewState`; nothing is shared between pages. State
//! transitions are plain method calls, applied one at a time by the caller's
//! event loop.

use crate::models::Series;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opacity of unselected points while a selection is active.
pub const DIMMED_OPACITY: f64 = 0.3;

/// Selected chart points, per category: `category key → point indices`.
///
/// A category whose set empties is removed; when no category is left the
/// selection is "none" and every point renders at full opacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    points: BTreeMap<String, BTreeSet<usize>>,
}

impl Selection {
    /// Add the point if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, key: &str, index: usize) -> bool {
        let set = self.points.entry(key.to_string()).or_default();
        let selected = if set.remove(&index) {
            false
        } else {
            set.insert(index);
            true
        };
        if set.is_empty() {
            self.points.remove(key);
        }
        selected
    }

    pub fn is_selected(&self, key: &str, index: usize) -> bool {
        self.points.get(key).is_some_and(|s| s.contains(&index))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `None` when nothing is selected.
    pub fn active(&self) -> Option<&BTreeMap<String, BTreeSet<usize>>> {
        if self.points.is_empty() {
            None
        } else {
            Some(&self.points)
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn clear_category(&mut self, key: &str) {
        self.points.remove(key);
    }

    /// Full opacity for selected points (or when nothing is selected), dimmed otherwise.
    pub fn opacity(&self, key: &str, index: usize) -> f64 {
        if self.is_empty() || self.is_selected(key, index) {
            1.0
        } else {
            DIMMED_OPACITY
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    selected_year: Option<i32>,
    hidden: BTreeSet<String>,
    selection: Selection,
    panels: BTreeMap<String, bool>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    /// Select `year` if the series has it. Returns whether the selection changed.
    pub fn select_year(&mut self, year: i32, series: &Series) -> bool {
        if series.get(year).is_none() || self.selected_year == Some(year) {
            return false;
        }
        self.selected_year = Some(year);
        true
    }

    pub fn is_visible(&self, key: &str) -> bool {
        !self.hidden.contains(key)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }

    pub fn set_visible(&mut self, key: &str, visible: bool) {
        if visible {
            self.hidden.remove(key);
        } else {
            self.hidden.insert(key.to_string());
            self.selection.clear_category(key);
        }
    }

    /// Flip a category's visibility. Returns the new visibility.
    pub fn toggle_category(&mut self, key: &str) -> bool {
        let visible = !self.is_visible(key);
        self.set_visible(key, visible);
        visible
    }

    /// `key` is the only visible category among `all_keys`.
    pub fn is_isolated<S: AsRef<str>>(&self, key: &str, all_keys: &[S]) -> bool {
        self.is_visible(key)
            && all_keys
                .iter()
                .map(AsRef::as_ref)
                .filter(|k| *k != key)
                .all(|k| !self.is_visible(k))
    }

    /// Double-click / double-tap gesture.
    ///
    /// On an element that is already the only visible one, restore every
    /// category and clear the selection. Otherwise hide everything but `key`.
    pub fn isolate<S: AsRef<str>>(&mut self, key: &str, all_keys: &[S]) {
        if self.is_isolated(key, all_keys) {
            self.hidden.clear();
            self.selection.clear();
            return;
        }
        for k in all_keys.iter().map(AsRef::as_ref) {
            self.set_visible(k, k == key);
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Toggle a chart point; points of hidden categories cannot be selected.
    pub fn toggle_point(&mut self, key: &str, index: usize) -> bool {
        if !self.is_visible(key) {
            return false;
        }
        self.selection.toggle(key, index)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_panel_open(&self, name: &str) -> bool {
        self.panels.get(name).copied().unwrap_or(false)
    }

    /// Open/close a collapsible panel (data table, notes, …). Returns the new state.
    pub fn toggle_panel(&mut self, name: &str) -> bool {
        let open = !self.is_panel_open(name);
        self.panels.insert(name.to_string(), open);
        open
    }
}
