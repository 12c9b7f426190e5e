use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};
use typeprobe::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    histogram::BinScale,
    logging,
    runtime::{
        spawn_dataset_loader, AppEventSource, Clock, CrosstermEventSource, FixedTicker, Runner,
        SystemClock, Ticker,
    },
    store::FileResultStore,
    ui::screen::current_screen,
    word_bank::RandomWords,
};

const TICK_RATE_MS: u64 = 100;

/// timed typing test that places your speed among people with and without Parkinson's
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test. When it ends, your words per minute are placed within a reference keystroke dataset and mapped to an estimated UPDRS motor score."
)]
pub struct Cli {
    /// number of words to use in test
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// number of seconds to run test
    #[clap(short = 's', long)]
    number_of_secs: Option<u32>,

    /// reference dataset (CSV with typingSpeed, gt and updrs108 columns)
    #[clap(short = 'd', long)]
    dataset: Option<PathBuf>,

    /// show the distribution as per-group proportions instead of counts
    #[clap(long)]
    density: bool,

    /// remember these settings as the new defaults
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(words) = self.number_of_words {
            config.number_of_words = words;
        }
        if let Some(secs) = self.number_of_secs {
            config.number_of_secs = secs;
        }
        if let Some(path) = &self.dataset {
            config.dataset_path = Some(path.clone());
        }
        if self.density {
            config.bin_scale = BinScale::Density;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        logging::init_file_logging(&path);
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save {
        if let Err(err) = config_store.save(&config) {
            warn!(error = %err, "failed to save config");
        }
    }
    info!(?config, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    spawn_dataset_loader(config.dataset_path.clone(), events.sender());
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let mut app = App::new(
        &config,
        Box::new(RandomWords::default()),
        SystemClock,
        Box::new(FileResultStore::new()),
    );
    let res = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, C: Clock, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| current_screen::<C>(app.state).render(app, f))?;

        if app.handle_event(runner.step()) == Control::Quit {
            return Ok(());
        }
    }
}
