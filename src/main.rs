// lampforth: interactive Forth console with stack view and lamp display

use std::fs::File;
use std::io::{self, IsTerminal};
use std::rc::Rc;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use lampforth::config::Cli;
use lampforth::console::{headless, Peripherals, Session};
use lampforth::ui::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let headless_mode = cli.headless || !io::stdin().is_terminal();
    init_logging(&cli, headless_mode)?;

    let mut session = Session::new(Rc::new(Peripherals::new(cli.lamps)));
    let started = session.start(&cli.loader(), &cli.session_config());

    if headless_mode {
        started?;
        let mut out = io::stdout().lock();
        headless::run(&mut session, io::stdin().lock(), &mut out)?;
        return Ok(());
    }

    if let Err(e) = &started {
        log::warn!("entering TUI without a module: {}", e);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(session);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Log to stderr in headless mode, to `--log-file` in the TUI, else nowhere.
/// `--verbose` enables debug; RUST_LOG overrides.
fn init_logging(cli: &Cli, headless: bool) -> io::Result<()> {
    let target = match &cli.log_file {
        Some(path) => env_logger::Target::Pipe(Box::new(File::create(path)?)),
        None if headless => env_logger::Target::Stderr,
        None => return Ok(()),
    };
    env_logger::Builder::new()
        .filter_module("lampforth", cli.log_level())
        .parse_default_env()
        .target(target)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
    Ok(())
}
