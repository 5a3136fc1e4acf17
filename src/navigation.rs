//! Navigation and filter state for the metric list and series table.
//!
//! All mutators and reads go through one lock. Readers get an owned
//! [`NavSnapshot`], never a reference into the live state.

use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};

/// Rows visible in the metric-name list.
pub const NAME_PAGE_SIZE: usize = 30;
/// Rows visible in the series table.
pub const SERIES_PAGE_SIZE: usize = 10;

/// Which panel receives up/down movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Names,
    Series,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Names => Focus::Series,
            Focus::Series => Focus::Names,
        }
    }
}

/// How filter text selects names, decided once per filter change.
#[derive(Debug, Clone, Default)]
pub enum FilterMatcher {
    /// Empty filter.
    #[default]
    All,
    /// Case-insensitive regular expression.
    Pattern(Regex),
    /// Lowercased text that did not compile as a pattern.
    Substring(String),
}

impl FilterMatcher {
    pub fn new(text: &str) -> Self {
        if text.is_empty() {
            return FilterMatcher::All;
        }
        match RegexBuilder::new(text).case_insensitive(true).build() {
            Ok(re) => FilterMatcher::Pattern(re),
            Err(_) => FilterMatcher::Substring(text.to_lowercase()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            FilterMatcher::All => true,
            FilterMatcher::Pattern(re) => re.is_match(name),
            FilterMatcher::Substring(needle) => name.to_lowercase().contains(needle.as_str()),
        }
    }

    /// False when the text fell back to substring matching.
    pub fn is_valid(&self) -> bool {
        !matches!(self, FilterMatcher::Substring(_))
    }
}

/// Point-in-time copy of the navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSnapshot {
    /// Names passing the filter, in store order.
    pub filtered: Vec<String>,
    pub total: usize,
    pub selected: usize,
    pub scroll: usize,
    pub page_size: usize,
    pub filter_text: String,
    pub filter_mode: bool,
    pub filter_valid: bool,
    pub focus: Focus,
    pub series_selected: usize,
    pub series_scroll: usize,
    pub series_page_size: usize,
}

impl Default for NavSnapshot {
    fn default() -> Self {
        Self {
            filtered: Vec::new(),
            total: 0,
            selected: 0,
            scroll: 0,
            page_size: NAME_PAGE_SIZE,
            filter_text: String::new(),
            filter_mode: false,
            filter_valid: true,
            focus: Focus::Names,
            series_selected: 0,
            series_scroll: 0,
            series_page_size: SERIES_PAGE_SIZE,
        }
    }
}

impl NavSnapshot {
    /// The selected name, if the filtered list is not empty.
    pub fn selected_name(&self) -> Option<&str> {
        self.filtered.get(self.selected).map(String::as_str)
    }

    /// Filtered names on the visible page.
    pub fn visible(&self) -> &[String] {
        let start = self.scroll.min(self.filtered.len());
        let end = (start + self.page_size).min(self.filtered.len());
        &self.filtered[start..end]
    }
}

#[derive(Debug, Default)]
struct NavState {
    all: Vec<String>,
    matcher: FilterMatcher,
    /// Size of the selected family, as last reported by the refresh task.
    series_count: usize,
    view: NavSnapshot,
}

impl NavState {
    fn apply_filter(&mut self) {
        self.matcher = FilterMatcher::new(&self.view.filter_text);
        self.view.filter_valid = self.matcher.is_valid();
        self.view.filtered = self
            .all
            .iter()
            .filter(|name| self.matcher.matches(name))
            .cloned()
            .collect();
        self.view.total = self.all.len();

        let max = self.view.filtered.len().saturating_sub(1);
        self.view.selected = self.view.selected.min(max);
        self.view.scroll = 0;
        self.reset_series();
        self.adjust_scroll();
    }

    /// The new family's size is unknown until the next refresh reports it.
    fn reset_series(&mut self) {
        self.series_count = 0;
        self.view.series_selected = 0;
        self.view.series_scroll = 0;
    }

    fn adjust_scroll(&mut self) {
        let v = &mut self.view;
        v.scroll = keep_visible(v.selected, v.scroll, v.page_size);
    }

    fn adjust_series_scroll(&mut self) {
        let v = &mut self.view;
        v.series_scroll = keep_visible(v.series_selected, v.series_scroll, v.series_page_size);
    }
}

/// Scroll offset that keeps `selected` on a page of `page_size` rows,
/// moving `scroll` as little as possible.
fn keep_visible(selected: usize, scroll: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    if selected < scroll {
        selected
    } else if selected >= scroll + page_size {
        selected + 1 - page_size
    } else {
        scroll
    }
}

/// Shared navigation state machine.
#[derive(Debug, Default)]
pub struct Navigation {
    state: Mutex<NavState>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom page sizes (e.g. to fit the terminal height).
    pub fn with_page_sizes(names: usize, series: usize) -> Self {
        let nav = Self::default();
        nav.set_page_sizes(names, series);
        nav
    }

    pub fn set_page_sizes(&self, names: usize, series: usize) {
        let mut s = self.state.lock();
        s.view.page_size = names.max(1);
        s.view.series_page_size = series.max(1);
        s.adjust_scroll();
        s.adjust_series_scroll();
    }

    /// Replace the known names. Identical lists are ignored.
    pub fn set_keys(&self, names: Vec<String>) {
        let mut s = self.state.lock();
        if s.all == names {
            return;
        }
        s.all = names;
        s.apply_filter();
    }

    /// Enter filter mode.
    pub fn start_filter(&self) {
        self.state.lock().view.filter_mode = true;
    }

    pub fn push_filter_char(&self, c: char) {
        let mut s = self.state.lock();
        s.view.filter_text.push(c);
        s.apply_filter();
    }

    /// Remove the last filter character, if any.
    pub fn pop_filter_char(&self) {
        let mut s = self.state.lock();
        if s.view.filter_text.pop().is_some() {
            s.apply_filter();
        }
    }

    /// Leave filter mode and keep the filter text.
    pub fn confirm_filter(&self) {
        self.state.lock().view.filter_mode = false;
    }

    /// Clear the filter text and leave filter mode.
    pub fn clear_filter(&self) {
        let mut s = self.state.lock();
        s.view.filter_text.clear();
        s.view.filter_mode = false;
        s.apply_filter();
    }

    pub fn move_up(&self) {
        let mut s = self.state.lock();
        match s.view.focus {
            Focus::Names => {
                if s.view.selected > 0 {
                    s.view.selected -= 1;
                    s.adjust_scroll();
                    s.reset_series();
                }
            }
            Focus::Series => {
                if s.view.series_selected > 0 {
                    s.view.series_selected -= 1;
                    s.adjust_series_scroll();
                }
            }
        }
    }

    pub fn move_down(&self) {
        let mut s = self.state.lock();
        match s.view.focus {
            Focus::Names => {
                if s.view.selected + 1 < s.view.filtered.len() {
                    s.view.selected += 1;
                    s.adjust_scroll();
                    s.reset_series();
                }
            }
            Focus::Series => {
                if s.view.series_selected + 1 < s.series_count {
                    s.view.series_selected += 1;
                    s.adjust_series_scroll();
                }
            }
        }
    }

    pub fn toggle_focus(&self) {
        let mut s = self.state.lock();
        s.view.focus = s.view.focus.toggle();
    }

    /// Record the selected family's size and clamp the series selection.
    pub fn clamp_series(&self, count: usize) {
        let mut s = self.state.lock();
        s.series_count = count;
        s.view.series_selected = s.view.series_selected.min(count.saturating_sub(1));
        s.adjust_series_scroll();
    }

    pub fn selected_name(&self) -> Option<String> {
        let s = self.state.lock();
        s.view.selected_name().map(str::to_string)
    }

    pub fn is_filtering(&self) -> bool {
        self.state.lock().view.filter_mode
    }

    pub fn has_filter(&self) -> bool {
        !self.state.lock().view.filter_text.is_empty()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> NavSnapshot {
        self.state.lock().view.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("metric_{:02}", i)).collect()
    }

    fn type_filter(nav: &Navigation, text: &str) {
        nav.start_filter();
        for c in text.chars() {
            nav.push_filter_char(c);
        }
    }

    #[test]
    fn test_set_keys() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b", "c"]));
        let snap = nav.snapshot();
        assert_eq!(snap.filtered.len(), 3);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.selected, 0);
    }

    #[test]
    fn test_set_keys_unchanged_is_noop() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b", "c"]));
        nav.move_down();
        nav.toggle_focus();
        nav.clamp_series(5);
        nav.move_down();

        nav.set_keys(keys(&["a", "b", "c"]));
        let snap = nav.snapshot();
        assert_eq!(snap.selected, 1);
        assert_eq!(snap.series_selected, 1);

        nav.set_keys(keys(&["a", "b", "c", "d"]));
        let snap = nav.snapshot();
        assert_eq!(snap.selected, 1);
        assert_eq!(snap.series_selected, 0);
    }

    #[test]
    fn test_navigation() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b", "c"]));

        nav.move_down();
        assert_eq!(nav.selected_name().as_deref(), Some("b"));
        nav.move_down();
        assert_eq!(nav.selected_name().as_deref(), Some("c"));
        nav.move_down();
        assert_eq!(nav.selected_name().as_deref(), Some("c"));
        nav.move_up();
        assert_eq!(nav.selected_name().as_deref(), Some("b"));
    }

    #[test]
    fn test_move_up_at_top() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b"]));
        nav.move_up();
        assert_eq!(nav.selected_name().as_deref(), Some("a"));
    }

    #[test]
    fn test_filter() {
        let nav = Navigation::new();
        nav.set_keys(keys(&[
            "cpu_usage{env=prod}",
            "cpu_usage{env=staging}",
            "memory_usage{env=prod}",
        ]));
        type_filter(&nav, "cpu");

        let snap = nav.snapshot();
        assert_eq!(snap.filter_text, "cpu");
        assert!(snap.filter_mode);
        assert!(snap.filter_valid);
        assert_eq!(snap.filtered.len(), 2);
    }

    #[test]
    fn test_filter_case_insensitive() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["CPU_usage", "memory"]));
        type_filter(&nav, "cpu");
        assert_eq!(nav.snapshot().filtered, vec!["CPU_usage"]);
    }

    #[test]
    fn test_filter_regex() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["http_requests_total", "http_errors_total", "cpu_seconds"]));
        type_filter(&nav, "^http_.*_total$");
        assert_eq!(nav.snapshot().filtered.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_substring() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["queue[0]_depth", "queue_size", "other"]));
        type_filter(&nav, "queue[");

        let snap = nav.snapshot();
        assert!(!snap.filter_valid);
        assert_eq!(snap.filtered, vec!["queue[0]_depth"]);

        nav.pop_filter_char();
        let snap = nav.snapshot();
        assert!(snap.filter_valid);
        assert_eq!(snap.filtered.len(), 2);
    }

    #[test]
    fn test_backspace_filter() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["abc", "def"]));
        type_filter(&nav, "ab");
        assert_eq!(nav.snapshot().filtered.len(), 1);

        nav.pop_filter_char();
        let snap = nav.snapshot();
        assert_eq!(snap.filter_text, "a");
        assert_eq!(snap.filtered.len(), 1);

        nav.pop_filter_char();
        nav.pop_filter_char();
        assert_eq!(nav.snapshot().filtered.len(), 2);
    }

    #[test]
    fn test_clear_filter() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b", "c"]));
        type_filter(&nav, "a");
        nav.clear_filter();

        let snap = nav.snapshot();
        assert_eq!(snap.filter_text, "");
        assert!(!snap.filter_mode);
        assert_eq!(snap.filtered.len(), 3);
    }

    #[test]
    fn test_confirm_filter_keeps_text() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["alpha", "beta"]));
        type_filter(&nav, "al");
        nav.confirm_filter();

        let snap = nav.snapshot();
        assert!(!snap.filter_mode);
        assert_eq!(snap.filter_text, "al");
        assert_eq!(snap.filtered, vec!["alpha"]);
        assert!(nav.has_filter());
    }

    #[test]
    fn test_filter_clamps_selection() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b", "c"]));
        nav.move_down();
        nav.move_down();
        assert_eq!(nav.selected_name().as_deref(), Some("c"));

        type_filter(&nav, "a");
        assert_eq!(nav.snapshot().selected, 0);
        assert_eq!(nav.selected_name().as_deref(), Some("a"));
    }

    #[test]
    fn test_scroll_offset() {
        let nav = Navigation::with_page_sizes(5, SERIES_PAGE_SIZE);
        nav.set_keys(numbered(20));
        assert_eq!(nav.snapshot().scroll, 0);

        for _ in 0..7 {
            nav.move_down();
        }
        let snap = nav.snapshot();
        assert_eq!(snap.selected, 7);
        assert_eq!(snap.scroll, 3);
        assert_eq!(snap.visible().first().map(String::as_str), Some("metric_03"));
        assert_eq!(snap.visible().len(), 5);

        for _ in 0..7 {
            nav.move_up();
        }
        let snap = nav.snapshot();
        assert_eq!(snap.selected, 0);
        assert_eq!(snap.scroll, 0);
    }

    #[test]
    fn test_scroll_reset_on_filter() {
        let nav = Navigation::with_page_sizes(3, SERIES_PAGE_SIZE);
        nav.set_keys(numbered(10));
        for _ in 0..8 {
            nav.move_down();
        }
        assert_ne!(nav.snapshot().scroll, 0);

        type_filter(&nav, "01");
        let snap = nav.snapshot();
        assert_eq!(snap.selected, 0);
        assert_eq!(snap.scroll, 0);
    }

    #[test]
    fn test_empty_keys() {
        let nav = Navigation::new();
        assert_eq!(nav.selected_name(), None);
        nav.move_down();
        nav.move_up();
        assert_eq!(nav.selected_name(), None);
        assert!(nav.snapshot().visible().is_empty());
    }

    #[test]
    fn test_series_focus_movement() {
        let nav = Navigation::with_page_sizes(NAME_PAGE_SIZE, 2);
        nav.set_keys(keys(&["a", "b"]));
        nav.toggle_focus();
        assert_eq!(nav.snapshot().focus, Focus::Series);

        nav.move_down();
        assert_eq!(nav.snapshot().series_selected, 0, "no known series yet");

        nav.clamp_series(3);
        nav.move_down();
        nav.move_down();
        nav.move_down();
        let snap = nav.snapshot();
        assert_eq!(snap.series_selected, 2);
        assert_eq!(snap.series_scroll, 1);
        assert_eq!(snap.selected, 0, "name selection untouched");

        nav.clamp_series(1);
        let snap = nav.snapshot();
        assert_eq!(snap.series_selected, 0);
        assert_eq!(snap.series_scroll, 0);

        nav.toggle_focus();
        assert_eq!(nav.snapshot().focus, Focus::Names);
    }

    #[test]
    fn test_name_move_resets_series_selection() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b"]));
        nav.toggle_focus();
        nav.clamp_series(4);
        nav.move_down();
        nav.toggle_focus();
        nav.move_down();

        let snap = nav.snapshot();
        assert_eq!(snap.selected, 1);
        assert_eq!(snap.series_selected, 0);
    }

    #[test]
    fn test_name_move_forgets_previous_family_size() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["big", "small"]));
        nav.clamp_series(5);
        nav.move_down();
        nav.toggle_focus();
        nav.move_down();
        nav.move_down();
        assert_eq!(nav.snapshot().series_selected, 0);

        nav.clamp_series(1);
        nav.move_down();
        assert_eq!(nav.snapshot().series_selected, 0);

        nav.clamp_series(3);
        nav.move_down();
        nav.move_down();
        assert_eq!(nav.snapshot().series_selected, 2);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let nav = Navigation::new();
        nav.set_keys(keys(&["a", "b"]));
        let before = nav.snapshot();
        nav.move_down();
        assert_eq!(before.selected, 0);
        assert_eq!(nav.snapshot().selected, 1);
    }

    #[test]
    fn test_keep_visible() {
        assert_eq!(keep_visible(0, 0, 5), 0);
        assert_eq!(keep_visible(4, 0, 5), 0);
        assert_eq!(keep_visible(5, 0, 5), 1);
        assert_eq!(keep_visible(2, 4, 5), 2);
        assert_eq!(keep_visible(3, 0, 0), 3);
    }
}
