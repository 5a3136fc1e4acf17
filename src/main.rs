use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use madvisor::{
    events, ui, App, Dashboard, HttpSource, Navigation, Overrides, RateWindow, Scheduler,
    SeriesStore, Settings, UnitClassifier, UnitsConfig,
};

/// Time between terminal checks while stdin is not a TTY.
const TTY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long the input loop waits for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "madvisor", version)]
#[command(about = "Real-time terminal dashboard for Prometheus-style metrics endpoints")]
struct Args {
    /// Comma-separated host:port targets to scrape
    #[arg(short, long, env = "METRIC_TARGETS")]
    targets: Option<String>,

    /// Rate window for counters (e.g., "5s", "1m")
    #[arg(short, long, env = "RATE_WINDOW")]
    rate_window: Option<String>,

    /// YAML file with unit patterns merged over the built-in ones
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        targets: args.targets,
        rate_window: args.rate_window,
        patterns: args.patterns,
    };
    let settings =
        Settings::load(args.config.as_deref(), &overrides).context("failed to load settings")?;

    init_logging(&settings.log_file)?;

    let units = UnitsConfig::load(settings.patterns.as_deref())
        .context("failed to load unit patterns")?;
    let classifier = UnitClassifier::compile(&units).context("failed to compile unit patterns")?;

    let targets = settings.target_list();
    let window = settings.rate_window();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        targets = ?targets,
        rate_window = ?window,
        units = classifier.len(),
        "madvisor starting"
    );

    wait_for_tty();

    let rt = tokio::runtime::Runtime::new()?;

    let store = Arc::new(SeriesStore::new());
    let nav = Arc::new(Navigation::new());
    let rate_window = Arc::new(RateWindow::new(window));

    let source = HttpSource::new(settings.scrape_timeout(), &settings.metrics_path)?;
    let scheduler = Scheduler::new(source, Arc::clone(&store), targets.clone())
        .with_interval(settings.scrape_interval());
    let dashboard = Dashboard::new(
        Arc::clone(&store),
        Arc::clone(&nav),
        Arc::new(classifier),
        Arc::clone(&rate_window),
        targets,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (view_tx, view_rx) = watch::channel(Arc::new(dashboard.waiting_view()));

    rt.spawn(scheduler.run(shutdown_rx.clone()));
    rt.spawn(dashboard.run(settings.refresh_interval(), view_tx, shutdown_rx));

    let result = run_tui(store, nav, rate_window, view_rx);

    // Signal shutdown
    let _ = shutdown_tx.send(true);
    rt.shutdown_timeout(Duration::from_secs(1));
    info!("madvisor stopped");

    result
}

/// Send tracing output to `path`; the terminal belongs to the dashboard.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Block until stdin is a terminal.
fn wait_for_tty() {
    if io::stdin().is_terminal() {
        return;
    }
    eprintln!("madvisor: no TTY detected, waiting for terminal attachment...");
    info!("no TTY on stdin, waiting");
    loop {
        std::thread::sleep(TTY_POLL_INTERVAL);
        if io::stdin().is_terminal() {
            eprintln!("madvisor: TTY detected, starting dashboard");
            return;
        }
    }
}

/// Run the interactive dashboard until the user quits.
fn run_tui(
    store: Arc<SeriesStore>,
    nav: Arc<Navigation>,
    rate_window: Arc<RateWindow>,
    views: watch::Receiver<Arc<madvisor::DashboardView>>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(store, nav, rate_window, views);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.update_view();
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(INPUT_POLL)? {
            events::handle_key_event(app, key);
        }
    }
    Ok(())
}
