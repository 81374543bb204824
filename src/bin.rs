use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crossfill_core::backtracking_search::{find_fill, FillFailure, SearchOptions, TieBreak};
use crossfill_core::grid_config::{generate_grid_config_from_template_string, render_grid};
use crossfill_core::word_list::WordList;

/// Fill a crossword grid with words from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Grid structure file: one row per line, `_` for open cells and anything else for blocked
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Write the filled grid to this file as well as printing it
    output: Option<PathBuf>,

    /// Break ties between equally-good slots randomly, using this seed
    #[arg(long)]
    seed: Option<u64>,

    /// Re-establish arc consistency after every choice during the search
    #[arg(long)]
    look_ahead: bool,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Give up after visiting this many search states
    #[arg(long)]
    max_states: Option<usize>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    crossfill_core::log::init_logger(cli.debug);

    match try_main(&cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let structure = fs::read_to_string(&cli.structure)?;
    let config = generate_grid_config_from_template_string(&structure)?;
    let word_list = WordList::from_dict_file(&cli.words)?;

    log::info!(
        "Loaded {}x{} grid with {} slots and {} words",
        config.width,
        config.height,
        config.variable_count(),
        word_list.len()
    );

    let options = SearchOptions {
        tie_break: cli.seed.map_or(TieBreak::LowestId, TieBreak::Seeded),
        look_ahead: cli.look_ahead,
        timeout: cli.timeout_ms.map(Duration::from_millis),
        max_states: cli.max_states,
        abort: None,
    };

    match find_fill(&config, &word_list, &options) {
        Ok(result) => {
            log::info!(
                "Filled in {:?} ({} states, {} backtracks)",
                result.statistics.total_time,
                result.statistics.states,
                result.statistics.backtracks
            );

            let rendered = render_grid(&config, &word_list, &result.assignment);
            println!("{rendered}");

            if let Some(output) = &cli.output {
                fs::write(output, format!("{rendered}\n"))?;
                log::info!("Wrote filled grid to {}", output.display());
            }

            Ok(ExitCode::SUCCESS)
        }
        Err(FillFailure::HardFailure) => {
            println!("No solution.");
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!("No solution found within budget ({failure:?})");
            Ok(ExitCode::FAILURE)
        }
    }
}
