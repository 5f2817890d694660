mod args;
mod map_io;

use std::path::Path;
use std::process::ExitCode;

use cartograph_core::abstract_editor::EditActionError;
use cartograph_core::commands::DetectRoomsCommand;
use cartograph_core::config::{self, ConfigError, EditorConfig};
use cartograph_core::document::{MapDocument, Metadata};
use cartograph_core::map::EdgeState;
use clap::Parser;
use thiserror::Error;

use args::{Args, MapCommand};
use map_io::{MapFileError, MapIo};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    MapFile(#[from] MapFileError),
    #[error("edit failed: {0}")]
    Edit(#[from] EditActionError),
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The logger filter comes from the config, so the config is read first
    // and any problem with it is reported once logging is up.
    let (config, config_error) = if args.config.exists() {
        match config::load_config(&args.config) {
            Ok(config) => (config, None),
            Err(e) => (EditorConfig::default(), Some(e)),
        }
    } else {
        (EditorConfig::default(), None)
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.editor.log_filter.as_str()),
    )
    .init();
    cartograph_core::init();

    if let Some(e) = config_error {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    match run(args.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: MapCommand, config: &EditorConfig) -> Result<(), CliError> {
    let mut io = MapIo::new();
    match command {
        MapCommand::New { output, title } => {
            let mut doc = config.new_document();
            doc.set_metadata(Metadata {
                title,
                ..Metadata::default()
            });
            io.save(&output, &doc)?;
            log::info!("Created {}", output.display());
        }
        MapCommand::Stats { map } => {
            let doc = io.load(&map)?;
            print_stats(&map, &doc);
        }
        MapCommand::Detect {
            map,
            output,
            dry_run,
        } => {
            let mut doc = io.load(&map)?;
            let mut history = config.new_history();
            history.execute(DetectRoomsCommand::new().into(), &mut doc)?;
            println!(
                "{} ({} rooms, {} assigned cells)",
                history.undo_description().unwrap_or("Detect Rooms"),
                doc.rooms().len(),
                doc.assigned_cell_count()
            );
            if dry_run {
                return Ok(());
            }
            if doc.is_dirty() {
                let target = output.as_deref().unwrap_or(map.as_path());
                io.save(target, &doc)?;
                log::info!("Saved {}", target.display());
            } else {
                log::info!("Nothing changed, {} left untouched", map.display());
            }
        }
        MapCommand::Bounds { map } => {
            let doc = io.load(&map)?;
            match doc.calculate_content_bounds() {
                Some(b) => println!(
                    "({}, {}) .. ({}, {})  {}x{}",
                    b.min_x,
                    b.min_y,
                    b.max_x,
                    b.max_y,
                    b.width(),
                    b.height()
                ),
                None => println!("empty"),
            }
        }
    }
    Ok(())
}

fn print_stats(path: &Path, doc: &MapDocument) {
    let grid = doc.grid();
    let painted: i64 = doc
        .tiles()
        .rows()
        .flat_map(|row| row.runs())
        .map(|run| i64::from(run.count))
        .sum();
    let title = &doc.metadata().title;

    println!("{}", path.display());
    if !title.is_empty() {
        println!("  title:         {title}");
    }
    println!(
        "  grid:          {}x{} ({:?}, {}x{} px)",
        grid.cols, grid.rows, grid.preset, grid.tile_width, grid.tile_height
    );
    println!("  palette:       {} entries", doc.palette().len());
    println!(
        "  tiles:         {painted} painted in {} rows",
        doc.tiles().row_count()
    );
    println!(
        "  edges:         {} walls, {} doors",
        doc.edges().count(EdgeState::Wall),
        doc.edges().count(EdgeState::Door)
    );
    println!(
        "  rooms:         {} ({} assigned cells)",
        doc.rooms().len(),
        doc.assigned_cell_count()
    );
    println!("  region groups: {}", doc.region_groups().len());
    println!("  markers:       {}", doc.markers().len());
    println!("  icons:         {}", doc.icons().len());
}
