use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use strafe::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
};
use tracing::info;

/// counter-strafe aim trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Move the crosshair with A/D and shoot the target only once you have stopped: either let the crosshair coast below the standstill threshold, or tap the opposite direction to counter-strafe and shoot inside the grace window."
)]
pub struct Cli {
    /// config file to load (defaults to the platform config directory)
    #[clap(long)]
    config: Option<PathBuf>,

    /// playable field width in columns, borders included
    #[clap(short = 'w', long)]
    field_width: Option<u16>,

    /// velocity gained per tick while one direction is held
    #[clap(long)]
    acceleration: Option<f64>,

    /// velocity multiplier per tick with no direction held
    #[clap(long)]
    deceleration: Option<f64>,

    /// maximum speed in cells per tick
    #[clap(long)]
    max_velocity: Option<f64>,

    /// speeds below this count as standing still
    #[clap(long)]
    standstill_threshold: Option<f64>,

    /// milliseconds without a key press before the key counts as released
    #[clap(long)]
    release_timeout_ms: Option<u64>,

    /// milliseconds a counter-strafe keeps shots eligible
    #[clap(long)]
    counter_strafe_window_ms: Option<u64>,

    /// physics tick interval in milliseconds
    #[clap(short = 't', long)]
    tick_rate_ms: Option<u64>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,

    /// log file (defaults to the platform state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// log level filter, overridden by RUST_LOG
    #[clap(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Layer command line flags over a loaded config
    fn apply_overrides(&self, mut cfg: Config) -> Config {
        if let Some(v) = self.field_width {
            cfg.field_width = v;
        }
        if let Some(v) = self.acceleration {
            cfg.acceleration_rate = v;
        }
        if let Some(v) = self.deceleration {
            cfg.deceleration_factor = v;
        }
        if let Some(v) = self.max_velocity {
            cfg.max_velocity = v;
        }
        if let Some(v) = self.standstill_threshold {
            cfg.standstill_threshold = v;
        }
        if let Some(v) = self.release_timeout_ms {
            cfg.release_timeout_ms = v;
        }
        if let Some(v) = self.counter_strafe_window_ms {
            cfg.counter_strafe_window_ms = v;
        }
        if let Some(v) = self.tick_rate_ms {
            cfg.tick_rate_ms = v;
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(e) = logging::init(&log_path, &cli.log_level) {
        eprintln!("logging disabled ({}): {}", log_path.display(), e);
    }

    let store = cli.config_store();
    let config = cli.apply_overrides(store.load());
    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }

    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "saved config");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(?config, "session started");
    let mut app = App::new(config);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(score = app.score(), shots = app.shots, "session ended");
    result?;

    println!("Score: {} ({} shots)", app.score(), app.shots);
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let ticker = FixedTicker::new(Duration::from_millis(app.config.tick_rate_ms));
    let mut runner = Runner::new(CrosstermEventSource::new(), ticker);

    terminal.draw(|f| ui(app, f))?;

    loop {
        let event = runner.step();
        match app.handle_event(&event, Instant::now()) {
            Flow::Quit => break,
            Flow::Redraw => {
                terminal.draw(|f| ui(app, f))?;
            }
            Flow::Idle => {}
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["strafe"]);

        assert_eq!(cli.config, None);
        assert_eq!(cli.field_width, None);
        assert_eq!(cli.tick_rate_ms, None);
        assert!(!cli.save_config);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.apply_overrides(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_field_width() {
        let cli = Cli::parse_from(["strafe", "-w", "60"]);
        assert_eq!(cli.field_width, Some(60));

        let cli = Cli::parse_from(["strafe", "--field-width", "100"]);
        assert_eq!(cli.field_width, Some(100));
    }

    #[test]
    fn test_cli_overrides_layer_over_config() {
        let cli = Cli::parse_from([
            "strafe",
            "--acceleration",
            "1.5",
            "--deceleration",
            "0.71",
            "--max-velocity",
            "2",
            "--standstill-threshold",
            "0.2",
            "--release-timeout-ms",
            "60",
            "--counter-strafe-window-ms",
            "150",
            "-t",
            "16",
        ]);
        let base = Config {
            field_width: 50,
            ..Config::default()
        };

        let cfg = cli.apply_overrides(base);

        assert_eq!(
            cfg,
            Config {
                field_width: 50,
                acceleration_rate: 1.5,
                deceleration_factor: 0.71,
                max_velocity: 2.0,
                standstill_threshold: 0.2,
                release_timeout_ms: 60,
                counter_strafe_window_ms: 150,
                tick_rate_ms: 16,
            }
        );
    }

    #[test]
    fn test_cli_config_store_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        let arg = path.to_str().unwrap();
        let cli = Cli::parse_from(["strafe", "--config", arg, "--save-config"]);

        assert!(cli.save_config);
        assert_eq!(cli.config_store().path(), path.as_path());
    }

    #[test]
    fn test_cli_logging_flags() {
        let cli = Cli::parse_from(["strafe", "--log-file", "/tmp/s.log", "--log-level", "debug"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/s.log")));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_ui_function_renders_session() {
        use ratatui::backend::TestBackend;

        let app = App::new(Config::default());
        let backend = TestBackend::new(90, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Score: 0"));
        assert!(content.contains("Controls:"));
    }
}
