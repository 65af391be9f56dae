mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use quickbench::{
    aim::AimSession,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    corpus::{Corpus, DEFAULT_CORPUS},
    history::{FileBackend, ScoreStore},
    runtime::{BenchEvent, CrosstermEventSource, FixedTicker, Runner},
    typing::TypingSession,
    util::time_ago,
    Bench, GameKind, Phase,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};

const MIN_TICK_RATE_MS: u64 = 10;
const LOG_FILE: &str = "quickbench.log";

/// reflex and typing benchmarks with local score history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Two quick benchmarks in the terminal: an aim trainer (click 30 targets, timer starts on the first hit) and a 60 second typing test. The last five scores of each are kept locally."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// directory to keep score history in
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    /// milliseconds between screen refreshes
    #[clap(long, global = true)]
    tick_rate_ms: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// click 30 targets as fast as you can
    Aim,
    /// type as fast and accurately as you can for 60 seconds
    Typing {
        /// custom prompt to use instead of a random passage
        #[clap(short = 'p', long)]
        prompt: Option<String>,
    },
    /// print recent scores
    Scores {
        /// print the raw history as json
        #[clap(long)]
        json: bool,
    },
    /// forget all recent scores
    Clear,
}

pub type LiveBench = Bench<FileBackend, SystemClock, StdRng>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Menu,
    Aim,
    Typing,
}

pub struct App {
    pub bench: LiveBench,
    pub view: View,
    pub selected: GameKind,
    pub size: Rect,
}

impl App {
    pub fn new(bench: LiveBench, view: View, selected: GameKind) -> Self {
        Self {
            bench,
            view,
            selected,
            size: Rect::default(),
        }
    }

    /// Keep the aim play area in step with the terminal
    pub fn resize(&mut self, size: Rect) {
        self.size = size;
        let field = ui::layout(size).playfield;
        self.bench.set_play_area(
            ui::playfield::play_area(field),
            ui::playfield::target_diameter(size.width),
        );
    }

    pub fn open(&mut self, kind: GameKind) {
        self.selected = kind;
        match kind {
            GameKind::AimTrainer => {
                self.view = View::Aim;
                self.bench.start_aim();
            }
            GameKind::TypingTest => {
                self.view = View::Typing;
                self.bench.start_typing();
            }
        }
    }

    pub fn back_to_menu(&mut self) {
        self.bench.leave();
        self.view = View::Menu;
    }

    fn needs_redraw_on_tick(&self) -> bool {
        match self.view {
            View::Menu => false,
            View::Aim => self.bench.aim().phase().is_playing() && self.bench.aim().has_started(),
            View::Typing => self.bench.typing().phase().is_playing(),
        }
    }
}

fn open_store(config: &Config) -> ScoreStore<FileBackend> {
    ScoreStore::open(FileBackend::with_dir(config.resolved_data_dir()))
}

fn build_bench(config: &Config, corpus: Corpus) -> LiveBench {
    let aim = AimSession::new(
        SystemClock,
        StdRng::from_entropy(),
        ui::playfield::play_area(Rect::new(0, 0, 80, 20)),
        ui::playfield::target_diameter(80),
    );
    let typing = TypingSession::new(SystemClock, StdRng::from_entropy(), corpus);
    Bench::new(open_store(config), aim, typing, SystemClock)
}

fn init_logging(to_file: Option<&Path>) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = to_file {
        // the terminal belongs to the TUI; fall back to stderr if the log can't be opened
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(path) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = builder.try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if let Some(ms) = cli.tick_rate_ms {
        config.tick_rate_ms = ms;
    }
    config.tick_rate_ms = config.tick_rate_ms.max(MIN_TICK_RATE_MS);

    let (view, selected, corpus) = match cli.command.clone() {
        Some(Command::Scores { json }) => {
            init_logging(None);
            return print_scores(&config, json);
        }
        Some(Command::Clear) => {
            init_logging(None);
            open_store(&config).clear();
            println!("scores cleared");
            return Ok(());
        }
        Some(Command::Aim) => (View::Aim, GameKind::AimTrainer, Corpus::bundled(DEFAULT_CORPUS)?),
        Some(Command::Typing { prompt }) => {
            let corpus = match prompt {
                Some(p) => Corpus::single(p)?,
                None => Corpus::bundled(DEFAULT_CORPUS)?,
            };
            (View::Typing, GameKind::TypingTest, corpus)
        }
        None => (
            View::Menu,
            config.last_game.unwrap_or(GameKind::AimTrainer),
            Corpus::bundled(DEFAULT_CORPUS)?,
        ),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(Some(&config.resolved_data_dir().join(LOG_FILE)));
    info!("starting with data dir {}", config.resolved_data_dir().display());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(build_bench(&config, corpus), View::Menu, selected);
    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));
    if view != View::Menu {
        app.open(selected);
    }

    let result = start_tui(&mut terminal, &mut app, &config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    config.last_game = Some(app.selected);
    if let Err(e) = config_store.save(&config) {
        warn!("failed to save config: {e}");
    }

    result
}

fn print_scores(config: &Config, json: bool) -> Result<(), Box<dyn Error>> {
    let history = open_store(config).load();
    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    let now = chrono::Utc::now();
    println!("{}", GameKind::AimTrainer);
    if history.aim_trainer.is_empty() {
        println!("  no scores yet");
    }
    for (idx, s) in history.aim_trainer.iter().enumerate() {
        println!(
            "  {}. {:.2}s  {:.0}%  {:.2} cps  ({})",
            idx + 1,
            s.time,
            s.accuracy,
            s.cps,
            time_ago(s.timestamp, now)
        );
    }

    println!("{}", GameKind::TypingTest);
    if history.typing_test.is_empty() {
        println!("  no scores yet");
    }
    for (idx, s) in history.typing_test.iter().enumerate() {
        println!(
            "  {}. {} wpm  {:.0}%  {} chars  ({})",
            idx + 1,
            s.words_per_minute,
            s.accuracy,
            s.characters_typed,
            time_ago(s.timestamp, now)
        );
    }
    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms)),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            BenchEvent::Tick => {
                app.bench.advance();
                if app.needs_redraw_on_tick() {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            BenchEvent::Resize => {
                let size = terminal.size()?;
                app.resize(Rect::new(0, 0, size.width, size.height));
                terminal.draw(|f| ui::draw(app, f))?;
            }
            BenchEvent::Mouse(mouse) => {
                on_mouse(app, mouse);
                terminal.draw(|f| ui::draw(app, f))?;
            }
            BenchEvent::Key(key) => {
                if !on_key(app, key) {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    app.bench.leave();
    Ok(())
}

fn on_mouse(app: &mut App, mouse: MouseEvent) {
    if app.view != View::Aim || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let field = ui::layout(app.size).playfield;
    if let Some((x, y)) = ui::playfield::cell_to_point(field, mouse.column, mouse.row) {
        app.bench.click(x, y);
    }
}

/// Returns false when the app should quit
fn on_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    match app.view {
        View::Menu => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                app.selected = match app.selected {
                    GameKind::AimTrainer => GameKind::TypingTest,
                    GameKind::TypingTest => GameKind::AimTrainer,
                };
            }
            KeyCode::Char('a') => app.open(GameKind::AimTrainer),
            KeyCode::Char('t') => app.open(GameKind::TypingTest),
            KeyCode::Enter => app.open(app.selected),
            KeyCode::Char('c') => app.bench.clear_scores(),
            _ => {}
        },
        View::Aim => match key.code {
            KeyCode::Esc => app.back_to_menu(),
            KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('r')
                if app.bench.aim().phase() != Phase::Playing =>
            {
                app.bench.start_aim()
            }
            _ => {}
        },
        View::Typing => match (app.bench.typing().phase(), key.code) {
            (_, KeyCode::Esc) => app.back_to_menu(),
            (Phase::Playing, KeyCode::Backspace) => {
                app.bench.pop_char();
            }
            (Phase::Playing, KeyCode::Char(c)) => {
                app.bench.push_char(c);
            }
            (Phase::Idle | Phase::Finished, KeyCode::Enter | KeyCode::Char('r')) => {
                app.bench.start_typing()
            }
            _ => {}
        },
    }
    true
}
