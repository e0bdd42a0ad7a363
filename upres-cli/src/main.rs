// upres-cli/src/main.rs
//
// Entry point for the upres command-line tool.
//
// Responsibilities:
// - Parsing the single positional argument (the input video file).
// - Setting up logging via env_logger (RUST_LOG-driven).
// - Verifying ffmpeg and ffprobe are available before any work begins.
// - Invoking the core pipeline and rendering its progress events.
// - Displaying the run summary and mapping failures to exit codes.

mod cli;
mod terminal;

use clap::Parser;
use console::style;
use std::process;
use std::time::Instant;
use upres_core::{CoreConfig, CrateFfprobeProber, SidecarSpawner, format_bytes, format_duration};

use crate::cli::Cli;
use crate::terminal::ProgressRenderer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // A missing argument prints usage to stdout and exits 1, not clap's
    // default of stderr and 2. Help and version requests stay exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            process::exit(0);
        }
        Err(err) => {
            println!("{}", err.render());
            process::exit(1);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", style("Error:").red().bold());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    // Preflight: both tools must be locatable before touching the filesystem.
    upres_core::ensure_dependencies()?;

    let work_dir = std::env::current_dir()?.join("app");
    let config = CoreConfig::new(work_dir);
    log::debug!("Using work directory: {}", config.work_dir.display());

    println!("========================================");
    println!("Upres run started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Input file: {}", cli.input.display());
    println!("Work directory: {}", config.work_dir.display());
    println!("========================================");

    let mut renderer = ProgressRenderer::new();
    let result = upres_core::upscale_video(
        &SidecarSpawner,
        &CrateFfprobeProber,
        &config,
        &cli.input,
        &mut |event| renderer.handle(event),
    );
    renderer.finish();
    let outcome = result?;

    let source = match (outcome.source_width, outcome.source_height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        _ => "unknown".to_string(),
    };

    println!("========================================");
    println!("Upscale Summary:");
    println!("========================================");
    println!("  Target resolution: {}x{}", outcome.target_width, outcome.target_height);
    println!("  Source resolution: {source}");
    println!("  Total frames:      {}", outcome.frames);
    println!("  Input size:        {}", format_bytes(outcome.input_size));
    println!("  Output size:       {}", format_bytes(outcome.output_size));
    if let Some(target_size) = outcome.target_size {
        println!("  Size target:       {}", format_bytes(target_size));
    }
    println!(
        "  Size targeted:     {}",
        if outcome.size_targeted { "yes" } else { "no" }
    );
    println!("  Final video:       {}", outcome.final_path.display());
    println!("----------------------------------------");
    println!("Total execution time: {}", format_duration(start_time.elapsed().as_secs_f64()));
    println!("Upres run finished: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    Ok(())
}
