//! Application state and user actions.
//!
//! The [`App`] owns the render-side copy of the latest [`DashboardView`] and
//! forwards user actions to the shared navigation state and rate window. It
//! never reads the store while drawing; the refresh task does that.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::dashboard::DashboardView;
use crate::data::duration::format_window;
use crate::data::{RateWindow, SeriesStore};
use crate::export::{Export, DEFAULT_EXPORT_PATH};
use crate::navigation::Navigation;
use crate::ui::Theme;

/// How long a status message stays on screen.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub theme: Theme,
    /// Latest view published by the refresh task.
    pub view: Arc<DashboardView>,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    store: Arc<SeriesStore>,
    nav: Arc<Navigation>,
    rate_window: Arc<RateWindow>,
    views: watch::Receiver<Arc<DashboardView>>,
}

impl App {
    /// Create an app with a theme picked from the terminal background.
    pub fn new(
        store: Arc<SeriesStore>,
        nav: Arc<Navigation>,
        rate_window: Arc<RateWindow>,
        views: watch::Receiver<Arc<DashboardView>>,
    ) -> Self {
        Self::with_theme(store, nav, rate_window, views, Theme::auto_detect())
    }

    pub fn with_theme(
        store: Arc<SeriesStore>,
        nav: Arc<Navigation>,
        rate_window: Arc<RateWindow>,
        views: watch::Receiver<Arc<DashboardView>>,
        theme: Theme,
    ) -> Self {
        let view = views.borrow().clone();
        Self {
            running: true,
            theme,
            view,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
            store,
            nav,
            rate_window,
            views,
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Pick up a newer view if the refresh task published one.
    ///
    /// Returns true when the view changed.
    pub fn update_view(&mut self) -> bool {
        if !self.views.has_changed().unwrap_or(false) {
            return false;
        }
        self.view = self.views.borrow_and_update().clone();
        true
    }

    /// Match the page sizes to the space the panels got on screen.
    pub fn fit_pages(&self, name_rows: usize, series_rows: usize) {
        self.nav.set_page_sizes(name_rows, series_rows);
    }

    pub fn move_up(&self) {
        self.nav.move_up();
    }

    pub fn move_down(&self) {
        self.nav.move_down();
    }

    pub fn toggle_focus(&self) {
        self.nav.toggle_focus();
    }

    pub fn start_filter(&self) {
        self.nav.start_filter();
    }

    pub fn filter_push(&self, c: char) {
        self.nav.push_filter_char(c);
    }

    pub fn filter_pop(&self) {
        self.nav.pop_filter_char();
    }

    pub fn confirm_filter(&self) {
        self.nav.confirm_filter();
    }

    pub fn clear_filter(&self) {
        self.nav.clear_filter();
    }

    pub fn is_filtering(&self) -> bool {
        self.nav.is_filtering()
    }

    pub fn has_filter(&self) -> bool {
        self.nav.has_filter()
    }

    /// Step the rate window up.
    pub fn rate_up(&mut self) {
        let window = self.rate_window.up();
        self.set_status_message(format!("Rate window: {}", format_window(window)));
    }

    /// Step the rate window down.
    pub fn rate_down(&mut self) {
        let window = self.rate_window.down();
        self.set_status_message(format!("Rate window: {}", format_window(window)));
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current store contents to a file.
    pub fn export_state(&self, path: &Path) -> crate::Result<()> {
        Export::capture(&self.store, self.rate_window.get()).write_to(path)
    }

    /// Export to the configured path and report the outcome.
    pub fn export(&mut self) {
        let path = self.export_path.clone();
        match self.export_state(&path) {
            Ok(()) => {
                info!(path = %path.display(), "exported store snapshot");
                self.set_status_message(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.set_status_message(format!("Export failed: {}", e));
            }
        }
    }
}
