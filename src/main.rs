use std::fs::{self, File};
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use folio::animation::AnimationKind;
use folio::app::{App, run_app_with_event_source};
use folio::event_source::TerminalEventSource;
use folio::panic_handler;
use folio::settings::load_settings;

#[derive(Parser)]
#[command(name = "folio", about = "Paged terminal reader for plain-text books")]
struct Args {
    /// Book to open; lines starting with "# " begin a chapter
    file: PathBuf,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured page animation
    #[arg(long, value_enum)]
    animation: Option<AnimationKind>,

    #[arg(long, default_value = "folio.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    info!("Starting folio");

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {:?}", args.file))?;
    let mut settings = load_settings(args.config.as_deref());
    if let Some(kind) = args.animation {
        settings.page_animation = kind;
    }

    panic_handler::initialize_panic_handler();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(&text, &settings, Rect::new(0, 0, size.width, size.height));
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut TerminalEventSource);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down folio");
    Ok(())
}
