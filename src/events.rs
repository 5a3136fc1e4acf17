use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    // If filter input is active, handle text input
    if app.is_filtering() {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),

        // Esc clears an applied filter first
        KeyCode::Esc => {
            if app.has_filter() {
                app.clear_filter();
            } else {
                app.quit();
            }
        }

        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),

        KeyCode::Char('/') => app.start_filter(),

        KeyCode::Char(']') | KeyCode::Char('+') => app.rate_up(),
        KeyCode::Char('[') | KeyCode::Char('-') => app.rate_down(),

        KeyCode::Char('e') => app.export(),

        _ => {}
    }
}

/// Handle key input while typing a filter
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Enter => app.confirm_filter(),
        KeyCode::Backspace => app.filter_pop(),
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyEventState;
    use tokio::sync::watch;

    use crate::dashboard::DashboardView;
    use crate::data::{RateWindow, SeriesStore};
    use crate::navigation::Navigation;
    use crate::ui::Theme;

    struct Harness {
        app: App,
        nav: Arc<Navigation>,
        window: Arc<RateWindow>,
        _views: watch::Sender<Arc<DashboardView>>,
    }

    fn harness() -> Harness {
        let nav = Arc::new(Navigation::new());
        nav.set_keys(vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()]);
        let window = Arc::new(RateWindow::default());
        let (tx, rx) = watch::channel(Arc::new(DashboardView::default()));
        let app = App::with_theme(
            Arc::new(SeriesStore::new()),
            Arc::clone(&nav),
            Arc::clone(&window),
            rx,
            Theme::dark(),
        );
        Harness {
            app,
            nav,
            window,
            _views: tx,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn send(h: &mut Harness, codes: &[KeyCode]) {
        for code in codes {
            handle_key_event(&mut h.app, press(*code));
        }
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            let mut h = harness();
            send(&mut h, &[code]);
            assert!(!h.app.running, "{:?}", code);
        }

        let mut h = harness();
        handle_key_event(
            &mut h.app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(!h.app.running);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut h = harness();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut h.app, release);
        assert!(h.app.running);
    }

    #[test]
    fn test_navigation_keys() {
        let mut h = harness();
        send(&mut h, &[KeyCode::Down, KeyCode::Char('j')]);
        assert_eq!(h.nav.snapshot().selected, 2);
        send(&mut h, &[KeyCode::Char('k')]);
        assert_eq!(h.nav.snapshot().selected, 1);
        send(&mut h, &[KeyCode::Up, KeyCode::Up]);
        assert_eq!(h.nav.snapshot().selected, 0);

        send(&mut h, &[KeyCode::Tab]);
        assert_eq!(h.nav.snapshot().focus, crate::navigation::Focus::Series);
    }

    #[test]
    fn test_filter_typing_does_not_trigger_actions() {
        let mut h = harness();
        send(
            &mut h,
            &[KeyCode::Char('/'), KeyCode::Char('q'), KeyCode::Char('e')],
        );
        assert!(h.app.running);
        assert_eq!(h.nav.snapshot().filter_text, "qe");

        send(&mut h, &[KeyCode::Backspace, KeyCode::Backspace]);
        send(&mut h, &[KeyCode::Char('b'), KeyCode::Enter]);
        let snap = h.nav.snapshot();
        assert!(!snap.filter_mode);
        assert_eq!(snap.filter_text, "b");
        assert_eq!(snap.filtered, vec!["beta"]);
    }

    #[test]
    fn test_esc_in_filter_mode_clears() {
        let mut h = harness();
        send(&mut h, &[KeyCode::Char('/'), KeyCode::Char('a'), KeyCode::Esc]);
        let snap = h.nav.snapshot();
        assert!(!snap.filter_mode);
        assert!(snap.filter_text.is_empty());
        assert!(h.app.running);
    }

    #[test]
    fn test_esc_clears_applied_filter_before_quitting() {
        let mut h = harness();
        send(
            &mut h,
            &[KeyCode::Char('/'), KeyCode::Char('g'), KeyCode::Enter],
        );
        send(&mut h, &[KeyCode::Esc]);
        assert!(h.app.running);
        assert_eq!(h.nav.snapshot().filtered.len(), 3);
        send(&mut h, &[KeyCode::Esc]);
        assert!(!h.app.running);
    }

    #[test]
    fn test_rate_window_keys() {
        let mut h = harness();
        send(&mut h, &[KeyCode::Char(']'), KeyCode::Char('+')]);
        assert_eq!(h.window.get(), Duration::from_secs(15));
        send(&mut h, &[KeyCode::Char('['), KeyCode::Char('-'), KeyCode::Char('-')]);
        assert_eq!(h.window.get(), Duration::from_secs(2));
    }
}
