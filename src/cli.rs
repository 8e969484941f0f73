use crate::model::{AppConfig, BreathTiming};
use crate::storage::{self, NoteStore};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "panic-relief",
    version,
    about = "Guided breathing with calming prompts and a panic attack note log"
)]
pub struct Cli {
    /// SQLite database holding the note log
    #[arg(long, env = "PANIC_RELIEF_DB")]
    pub db: Option<PathBuf>,

    /// Relaxing sound played while a session is active
    #[arg(long, env = "PANIC_RELIEF_SOUND", default_value = "relaxing_sound.wav")]
    pub sound: PathBuf,

    /// Run sessions without sound
    #[arg(long)]
    pub no_sound: bool,

    /// Delay between two steps of the breathing circle
    #[arg(long, default_value = "100ms")]
    pub step_interval: humantime::Duration,

    /// Pause at full size between inhale and exhale
    #[arg(long, default_value = "700ms")]
    pub hold: humantime::Duration,

    /// How often a paused session checks for resume
    #[arg(long, default_value = "100ms")]
    pub pause_poll: humantime::Duration,

    /// Log file used while the interactive UI runs
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print all notes as text and exit (no TUI)
    #[arg(long)]
    pub list: bool,

    /// Print all notes as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Add a note and exit (no TUI)
    #[arg(long, value_name = "TEXT")]
    pub add: Option<String>,

    /// Export all notes as JSON to the given file and exit
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}

impl Cli {
    fn is_one_shot(&self) -> bool {
        self.list || self.json || self.add.is_some() || self.export_json.is_some()
    }
}

/// Build an `AppConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> AppConfig {
    AppConfig {
        db_path: args.db.clone().unwrap_or_else(storage::default_db_path),
        sound_path: args.sound.clone(),
        sound_enabled: !args.no_sound,
        timing: BreathTiming {
            step_interval: Duration::from(args.step_interval),
            hold: Duration::from(args.hold),
            pause_poll: Duration::from(args.pause_poll),
        },
        log_file: args
            .log_file
            .clone()
            .unwrap_or_else(storage::default_log_path),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);

    if args.is_one_shot() {
        crate::logging::init_stderr()?;
        return run_one_shot(&args, &cfg).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::logging::init_file(&cfg.log_file)?;
        return crate::tui::run(cfg).await;
    }
    #[cfg(not(feature = "tui"))]
    {
        // Without the TUI the only useful thing left is the note log.
        crate::logging::init_stderr()?;
        let listing = Cli {
            list: true,
            ..args
        };
        return run_one_shot(&listing, &cfg).await;
    }
}

/// Perform the requested note operations without starting the UI.
async fn run_one_shot(args: &Cli, cfg: &AppConfig) -> Result<()> {
    let db_path = cfg.db_path.clone();
    let args = args.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let store = NoteStore::open(&db_path)
            .with_context(|| format!("open note store {}", db_path.display()))?;

        if let Some(text) = args.add.as_deref() {
            let note = store.save_note(text).context("save note")?;
            eprintln!("Saved note #{}", note.id);
        }
        if let Some(path) = args.export_json.as_deref() {
            let p = store.export_json(path).context("export notes")?;
            eprintln!("Exported: {}", p.display());
        }
        if args.json {
            let notes = store.list_notes().context("list notes")?;
            println!("{}", serde_json::to_string_pretty(&notes)?);
        } else if args.list {
            for note in store.list_notes().context("list notes")? {
                println!("{}", note.to_line());
            }
        }
        Ok(())
    })
    .await
    .context("note task failed")?
}
