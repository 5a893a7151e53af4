//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and sets up logging
//! - runs the chart pipeline
//! - writes SVG/CSV output or prints tables
//! - starts the terminal dashboard

use clap::Parser;

use crate::cli::{ChartArgs, Command, RenderArgs, TableArgs, ThemeArg};
use crate::config::Settings;
use crate::error::AppError;
use crate::logging::{self, Target};
use crate::render::{Size, Theme, write_svg};

pub mod pipeline;

/// Entry point for the `mchart` binary.
pub fn run() -> Result<(), AppError> {
    // `mchart` and `mchart -t AAPL` behave like `mchart tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let settings = Settings::load(&cli.global.overrides())?;
    let target = match cli.command {
        Command::Tui(_) => Target::File,
        _ => Target::Stderr,
    };
    logging::setup(settings.log_level, target)?;

    match cli.command {
        Command::Render(args) => handle_render(&settings, args),
        Command::Table(args) => handle_table(&settings, args),
        Command::Metrics => {
            print!("{}", crate::report::format_metrics());
            Ok(())
        }
        Command::Tui(args) => handle_tui(&settings, args),
    }
}

fn handle_render(settings: &Settings, args: RenderArgs) -> Result<(), AppError> {
    let source = pipeline::open_source(settings)?;
    let size = Size::new(args.width, args.height);
    let run = pipeline::run_chart(&args.chart, source.as_ref(), size);

    let theme = match args.theme {
        ThemeArg::Light => Theme::light(),
        ThemeArg::Dark => Theme::dark(),
    };
    // Placeholders are written too, so the file always reflects the request.
    write_svg(&args.output, run.controller.scene(), &theme)?;

    let data = run.data()?;
    if let Some(path) = &args.export {
        crate::io::write_chart_csv(path, data)?;
    }
    Ok(())
}

fn handle_table(settings: &Settings, args: TableArgs) -> Result<(), AppError> {
    let source = pipeline::open_source(settings)?;
    let run = pipeline::run_chart(&args.chart, source.as_ref(), Size::new(960, 480));
    let data = run.data()?;

    if let Some(range) = &run.range {
        println!("{}", crate::report::format_summary(data, range));
    }
    print!("{}", crate::report::format_table(data));

    if let Some(path) = &args.export {
        crate::io::write_chart_csv(path, data)?;
    }
    Ok(())
}

fn handle_tui(settings: &Settings, args: ChartArgs) -> Result<(), AppError> {
    let source = pipeline::open_source(settings)?;
    crate::tui::run(source, &args)
}

/// Rewrite argv so `mchart` defaults to `mchart tui`.
///
/// Rules:
/// - `mchart`                      -> `mchart tui`
/// - `mchart -t AAPL ...`          -> `mchart tui -t AAPL ...`
/// - `mchart --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "render" | "table" | "metrics" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
