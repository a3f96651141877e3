pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use kaneda::{
    boss::{resolve_boss, roster},
    config::{Config, ConfigStore, FileConfigStore},
    effects::TracingSink,
    items::Item,
    phrases::PhrasePool,
    progression::{FileProfileStore, Profile, ProfileStore, StoredProgression},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    GameMode, Outcome, Session, SessionConfig, SessionError,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// timed typing-combat tui: race the clock, build heat, break the firewall boss
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the phrase before the clock runs out. Clean streaks build heat, heat doubles your payout, and in boss mode every correct key hits the firewall while it drains your time."
)]
pub struct Cli {
    /// game mode (defaults to the saved mode, or boss when --boss is given)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,

    /// boss id to fight in boss mode (see --list-bosses)
    #[clap(short = 'b', long)]
    boss: Option<String>,

    /// custom phrase to type
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// json phrase pack: {"normal": [...], "boss": [...]}
    #[clap(long, conflicts_with = "prompt")]
    phrases: Option<PathBuf>,

    /// seed for phrase choice and flavour text
    #[clap(long)]
    seed: Option<u64>,

    /// milliseconds between engine ticks
    #[clap(long)]
    tick_ms: Option<u64>,

    /// skip the scramble-in animation
    #[clap(long)]
    no_reveal: bool,

    /// profile file (defaults to the user config directory)
    #[clap(long)]
    profile: Option<PathBuf>,

    /// write logs here; filter with KANEDA_LOG
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the boss roster and exit
    #[clap(long)]
    list_bosses: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum ModeArg {
    Normal,
    Boss,
    Zen,
}

impl ModeArg {
    fn as_mode(&self) -> GameMode {
        match self {
            ModeArg::Normal => GameMode::Normal,
            ModeArg::Boss => GameMode::Boss,
            ModeArg::Zen => GameMode::Zen,
        }
    }
}

/// CLI flags layered over the saved config.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub mode: GameMode,
    pub boss_id: String,
    pub prompt: Option<String>,
    pub phrases: Option<PathBuf>,
    pub seed: Option<u64>,
    pub tick_ms: u64,
    pub reveal: bool,
}

impl RuntimeSettings {
    pub fn merge(cli: &Cli, cfg: &Config) -> Self {
        let mode = match (cli.mode, &cli.boss) {
            (Some(mode), _) => mode.as_mode(),
            (None, Some(_)) => GameMode::Boss,
            (None, None) => cfg.default_mode,
        };
        Self {
            mode,
            boss_id: cli.boss.clone().unwrap_or_else(|| cfg.default_boss.clone()),
            prompt: cli.prompt.clone(),
            phrases: cli.phrases.clone(),
            seed: cli.seed,
            tick_ms: cli.tick_ms.unwrap_or(cfg.tick_ms),
            reveal: cfg.reveal && !cli.no_reveal,
        }
    }

    pub fn to_config(&self) -> Config {
        Config {
            tick_ms: self.tick_ms,
            reveal: self.reveal,
            default_mode: self.mode,
            default_boss: self.boss_id.clone(),
        }
    }

    fn pool(&self) -> Result<PhrasePool, SessionError> {
        match (&self.prompt, &self.phrases) {
            (Some(prompt), _) => Ok(PhrasePool::single(prompt.as_str())),
            (None, Some(path)) => PhrasePool::from_file(path),
            (None, None) => PhrasePool::builtin(),
        }
    }

    pub fn session_config(&self, profile: &Profile) -> Result<SessionConfig, SessionError> {
        let mut config = SessionConfig::new(self.mode, self.pool()?)
            .with_modifiers(profile.modifiers())
            .with_inventory(profile.inventory);
        if self.mode == GameMode::Boss {
            config = config.with_boss(resolve_boss(&self.boss_id)?);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if !self.reveal {
            config = config.without_reveal();
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Playing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExitType {
    Restart,
    Quit,
}

pub struct App<S: ProfileStore = FileProfileStore> {
    pub settings: RuntimeSettings,
    pub session: Session<TracingSink>,
    pub display: String,
    pub state: AppState,
    pub progression: StoredProgression<S>,
    pub result: Option<Outcome>,
    pub credited: Option<u64>,
    pub notice: Option<String>,
}

impl<S: ProfileStore> App<S> {
    pub fn new(
        settings: RuntimeSettings,
        progression: StoredProgression<S>,
    ) -> Result<Self, SessionError> {
        let mut session = Session::new(
            settings.session_config(progression.profile())?,
            TracingSink,
        )?;
        let display = session.display_text();
        Ok(Self {
            settings,
            session,
            display,
            state: AppState::Playing,
            progression,
            result: None,
            credited: None,
            notice: None,
        })
    }

    /// Starts a fresh session with the profile as it stands now.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let config = self.settings.session_config(self.progression.profile())?;
        self.session = Session::new(config, TracingSink)?;
        self.display = self.session.display_text();
        self.state = AppState::Playing;
        self.result = None;
        self.credited = None;
        self.notice = None;
        Ok(())
    }

    pub fn on_tick(&mut self, delta: Duration) {
        self.session.tick(delta);
        self.display = self.session.display_text();
        self.settle();
    }

    /// Hands a finished session's outcome to the profile, once.
    fn settle(&mut self) {
        if self.state != AppState::Playing || !self.session.has_finished() {
            return;
        }
        let Some(outcome) = self.session.take_outcome() else {
            return;
        };
        match self.progression.record(&outcome) {
            Ok(credited) => self.credited = Some(credited),
            Err(err) => {
                tracing::error!(%err, "failed to save profile");
                self.notice = Some(format!("profile not saved: {err}"));
            }
        }
        self.result = Some(outcome);
        self.state = AppState::Results;
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<ExitType> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.session.abort();
            self.settle();
            return Some(ExitType::Quit);
        }

        match self.state {
            AppState::Playing => {
                match key.code {
                    KeyCode::Esc => {
                        if self.session.mode() == GameMode::Zen {
                            self.session.cash_out();
                        } else {
                            self.session.abort();
                        }
                    }
                    KeyCode::Backspace => self.session.backspace(),
                    KeyCode::F(1) => {
                        self.session.use_item(Item::TimeFreeze);
                    }
                    KeyCode::F(2) => {
                        self.session.use_item(Item::AutoWord);
                    }
                    KeyCode::Char(c)
                        if !key
                            .modifiers
                            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                    {
                        self.session.type_char(c);
                    }
                    _ => {}
                }
                self.display = self.session.display_text();
                self.settle();
                None
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => Some(ExitType::Restart),
                KeyCode::Esc | KeyCode::Char('q') => Some(ExitType::Quit),
                _ => None,
            },
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    // stdout belongs to the terminal ui
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("KANEDA_LOG")
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;
    Ok(())
}

fn print_roster() {
    println!("{:<16}{:<18}{:<11}{:>6}{:>8}", "ID", "NAME", "LEVEL", "HP", "REWARD");
    for boss in roster() {
        println!(
            "{:<16}{:<18}{:<11}{:>6}{:>8}",
            boss.id, boss.name, boss.difficulty, boss.hp, boss.reward
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    if cli.list_bosses {
        print_roster();
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let settings = RuntimeSettings::merge(&cli, &config_store.load());
    if let Err(err) = config_store.save(&settings.to_config()) {
        tracing::warn!(%err, "could not save config");
    }

    let profile_store = match &cli.profile {
        Some(path) => FileProfileStore::with_path(path),
        None => FileProfileStore::new(),
    };
    let mut app = match App::new(settings, StoredProgression::open(profile_store)) {
        Ok(app) => app,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: ProfileStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::from_millis(app.settings.tick_ms),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let exit_type = match runner.step() {
            GameEvent::Tick(delta) => {
                app.on_tick(delta);
                None
            }
            GameEvent::Resize => None,
            GameEvent::Key(key) => app.on_key(key),
        };

        match exit_type {
            Some(ExitType::Restart) => app.reset()?,
            Some(ExitType::Quit) => break,
            None => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaneda::items::Inventory;
    use kaneda::outcome::FinishReason;
    use kaneda::Status;
    use tempfile::{tempdir, TempDir};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn settings(mode: GameMode, prompt: &str) -> RuntimeSettings {
        RuntimeSettings {
            mode,
            boss_id: "gatekeeper".to_string(),
            prompt: Some(prompt.to_string()),
            phrases: None,
            seed: Some(7),
            tick_ms: 100,
            reveal: false,
        }
    }

    fn test_app(mode: GameMode, prompt: &str, profile: Profile) -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profile.json"));
        store.save(&profile).unwrap();
        let app = App::new(settings(mode, prompt), StoredProgression::open(store)).unwrap();
        (app, dir)
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["kaneda", "--mode", "zen", "--tick-ms", "50", "--no-reveal"]);
        let merged = RuntimeSettings::merge(&cli, &Config::default());

        assert_eq!(merged.mode, GameMode::Zen);
        assert_eq!(merged.tick_ms, 50);
        assert!(!merged.reveal);
        assert_eq!(merged.to_config().default_mode, GameMode::Zen);
    }

    #[test]
    fn test_boss_flag_implies_boss_mode() {
        let cli = Cli::parse_from(["kaneda", "--boss", "colonel_ai"]);
        let merged = RuntimeSettings::merge(&cli, &Config::default());

        assert_eq!(merged.mode, GameMode::Boss);
        assert_eq!(merged.boss_id, "colonel_ai");
    }

    #[test]
    fn test_saved_config_used_without_flags() {
        let cfg = Config {
            tick_ms: 40,
            reveal: true,
            default_mode: GameMode::Boss,
            default_boss: "sol_satellite".into(),
        };
        let merged = RuntimeSettings::merge(&Cli::parse_from(["kaneda"]), &cfg);

        assert_eq!(merged.to_config(), cfg);
    }

    #[test]
    fn test_prompt_and_phrases_conflict() {
        let res = Cli::try_parse_from(["kaneda", "-p", "hi", "--phrases", "x.json"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_unknown_boss_rejected() {
        let mut s = settings(GameMode::Boss, "hi");
        s.boss_id = "nobody".into();

        let err = s.session_config(&Profile::default()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownBoss(_)));
    }

    #[test]
    fn test_typing_to_results_records_profile() {
        let (mut app, _dir) = test_app(GameMode::Normal, "hi", Profile::default());

        app.on_key(key(KeyCode::Char('h')));
        app.on_tick(Duration::from_millis(300));
        app.on_key(key(KeyCode::Char('i')));

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.result.as_ref().unwrap().reason, FinishReason::Completed);
        assert_eq!(app.progression.profile().games_played, 1);
        assert!(app.credited.is_some());
    }

    #[test]
    fn test_escape_aborts_normal_and_cashes_out_zen() {
        let (mut app, _dir) = test_app(GameMode::Normal, "hello", Profile::default());
        app.on_key(key(KeyCode::Char('h')));
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.result.as_ref().unwrap().reason, FinishReason::Aborted);
        assert_eq!(app.progression.profile().games_played, 0);

        let (mut zen, _dir) = test_app(GameMode::Zen, "hello", Profile::default());
        zen.on_key(key(KeyCode::Char('h')));
        zen.on_key(key(KeyCode::Esc));
        assert_eq!(zen.result.as_ref().unwrap().reason, FinishReason::CashedOut);
        assert_eq!(zen.progression.profile().history.len(), 1);
    }

    #[test]
    fn test_function_keys_use_items() {
        let profile = Profile {
            inventory: Inventory::new(1, 1, 0),
            ..Profile::default()
        };
        let (mut app, _dir) = test_app(GameMode::Normal, "abcdefghij", profile);

        app.on_key(key(KeyCode::Char('a')));
        app.on_key(key(KeyCode::F(1)));
        app.on_key(key(KeyCode::F(2)));

        assert!(app.session.is_frozen());
        assert_eq!(app.session.typed().len(), 6);
        assert_eq!(*app.session.inventory(), Inventory::default());
    }

    #[test]
    fn test_restart_from_results() {
        let (mut app, _dir) = test_app(GameMode::Normal, "a", Profile::default());
        app.on_key(key(KeyCode::Char('a')));
        assert_eq!(app.on_key(key(KeyCode::Char('r'))), Some(ExitType::Restart));

        app.reset().unwrap();

        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.session.status(), Status::Idle);
        assert!(app.result.is_none());
    }

    #[test]
    fn test_ctrl_c_quits_and_spends_items() {
        let profile = Profile {
            inventory: Inventory::new(1, 0, 0),
            ..Profile::default()
        };
        let (mut app, _dir) = test_app(GameMode::Normal, "hello", profile);
        app.on_key(key(KeyCode::Char('h')));
        app.on_key(key(KeyCode::F(1)));

        let exit = app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert_eq!(exit, Some(ExitType::Quit));
        assert_eq!(app.progression.profile().inventory.time_freeze, 0);
    }
}
