use anyhow::{bail, Context, Result};
use bench::options::{Arguments, BenchOptions};
use bench::registry;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::io::Write;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bench;

fn main() -> Result<ExitCode> {
    // 1. Initialize structured logging. Reports go to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // 2. Read the options from the command line, the environment and the
    //    optional configuration file.
    let arguments = match Arguments::try_parse() {
        Ok(arguments) => arguments,
        // --help and --version.
        Err(e) if !e.use_stderr() => {
            e.print()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            let mut stderr = std::io::stderr();
            writeln!(stderr, "{}", Arguments::command().render_help())?;
            e.print()?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let loaded = BenchOptions::load(arguments.config.as_deref()).with_context(|| {
        format!(
            "failed to load the options from {:?}",
            arguments.config.as_deref()
        )
    })?;
    let options = arguments.apply(loaded).complete();

    if options.update <= 0.0 {
        bail!("the update step must be positive, got {}", options.update);
    }

    // 3. Run the benchmarks.
    let mut stdout = std::io::stdout();
    options.print(&mut stdout)?;
    info!(
        "{} v{} benchmarks starting.",
        tweeners::LIBRARY_NAME,
        tweeners::VERSION
    );

    let mut exit_code = ExitCode::SUCCESS;

    for name in &options.benchmarks {
        let Some(benchmark) = registry::find(name) else {
            writeln!(stdout, "# -- Benchmark '{name}' not found. --")?;
            eprintln!("{}", format!("Unknown benchmark '{name}'.").red());
            exit_code = ExitCode::FAILURE;
            continue;
        };

        writeln!(stdout, "# -- Running benchmark '{name}' --")?;
        let report = benchmark(&options);
        writeln!(stdout, "# {} updates", report.update_count)?;
        writeln!(stdout, "{} # {}", report.elapsed.as_nanos(), name)?;
        writeln!(stdout, "# -- Done benchmark '{name}' --")?;

        info!(
            "Benchmark {} done in {:?}.",
            name.bold(),
            report.elapsed
        );
    }

    Ok(exit_code)
}
