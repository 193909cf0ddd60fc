use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod domain;
mod inputter;
mod model;
mod pipeline;
mod records;
mod table;
mod ui;

use controller::Controller;
use domain::{Args, DashConfig, DashError};
use model::{Model, Status};
use table::SourceList;
use ui::TableUI;

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing(&args) {
        eprintln!("Could not set up logging: {e}");
    }

    match run(&args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(args: &Args) -> Result<(), DashError> {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("pdash.log"));
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_env("PDASH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("pdash={}", args.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(std::io::Error::other)?;

    info!("Logging to {}", path.display());
    Ok(())
}

fn run(args: &Args) -> Result<(), DashError> {
    info!("Starting pdash!");
    let cfg = DashConfig::from_args(args);

    // Load before taking over the terminal so errors are printed normally
    let source = match &args.data {
        Some(path) => SourceList::load(path)?,
        None => SourceList::seed(),
    };

    let mut model = Model::init(&cfg, source);
    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &mut ui, &controller);
    ratatui::restore();

    info!("Quitting pdash");
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &mut TableUI,
    controller: &Controller,
) -> Result<(), DashError> {
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model)? {
            model.update(Some(message))?;
        }
    }
    Ok(())
}
