//! Options of the benchmark runner.
//!
//! The options are layered: built-in defaults, then an optional TOML file
//! given with `--config`, then the `TWEENERS_BENCH_*` environment variables,
//! then the command line.

use super::registry;
use clap::Parser;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BenchOptions {
    /// Number of slots in the first generation.
    pub initial_count: usize,
    /// Time step passed to each update.
    pub update: f32,
    /// Durations assigned to the slots in creation order, cycling.
    pub durations: Vec<f32>,
    /// Benchmarks to run. Empty means all of them.
    pub benchmarks: Vec<String>,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            initial_count: 100_000,
            update: 3.0,
            durations: vec![5.0, 20.0, 10.0, 0.0, 30.0],
            benchmarks: Vec::new(),
        }
    }
}

impl BenchOptions {
    /// Loads the options from the optional file and from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(
                config::Environment::with_prefix("TWEENERS_BENCH")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("durations")
                    .with_list_parse_key("benchmarks"),
            )
            .build()?
            .try_deserialize()
    }

    /// Fills the lists left empty with their default values.
    pub fn complete(mut self) -> Self {
        if self.durations.is_empty() {
            self.durations = Self::default().durations;
        }
        if self.benchmarks.is_empty() {
            self.benchmarks = registry::names().map(str::to_string).collect();
        }
        self
    }

    /// Writes the options as comment lines.
    pub fn print(&self, out: &mut impl Write) -> std::io::Result<()> {
        let durations: Vec<String> = self.durations.iter().map(|d| d.to_string()).collect();
        let benchmarks: Vec<String> = self
            .benchmarks
            .iter()
            .map(|name| format!("'{name}'"))
            .collect();

        writeln!(out, "# initial count is {}.", self.initial_count)?;
        writeln!(out, "# durations are {{{}}}", durations.join(", "))?;
        writeln!(out, "# update step is {}.", self.update)?;
        writeln!(out, "# running benchmarks: {}", benchmarks.join(", "))
    }
}

/// The options given on the command line. `None` and empty lists leave the
/// loaded values untouched.
#[derive(Debug, Default, PartialEq, Parser)]
#[command(name = "tweeners-bench", version)]
#[command(about = "Run a benchmark on the update of the tweeners")]
#[command(long_about = "Run a benchmark on the update of the tweeners.\n\n\
    The tweeners are created by instantiating a given count, then queuing a \
    second tweener to half of them, then a third to half of the seconds, and \
    so on until there is no more tweener to create.")]
#[command(after_help = benchmark_list())]
pub struct Arguments {
    /// Read the options from this TOML file first
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The number of tweeners of the first generation [default: 100000]
    #[arg(long, value_name = "NUM")]
    pub initial_count: Option<usize>,

    /// The time step passed to each update [default: 3]
    #[arg(long, value_name = "NUM")]
    pub update: Option<f32>,

    /// The durations of the tweeners, applied in creation order and cycling
    /// [default: 5 20 10 0 30]
    #[arg(long, value_name = "NUM", num_args = 1..)]
    pub durations: Vec<f32>,

    /// Run the given benchmarks [default: all of them]
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub benchmarks: Vec<String>,
}

impl Arguments {
    /// Overrides the loaded options with the ones given here.
    pub fn apply(self, mut options: BenchOptions) -> BenchOptions {
        if let Some(count) = self.initial_count {
            options.initial_count = count;
        }
        if let Some(update) = self.update {
            options.update = update;
        }
        if !self.durations.is_empty() {
            options.durations = self.durations;
        }
        if !self.benchmarks.is_empty() {
            options.benchmarks = self.benchmarks;
        }
        options
    }
}

/// The text shown after the generated help.
fn benchmark_list() -> String {
    let mut text = String::from("Available benchmarks:\n");
    for name in registry::names() {
        text.push_str("  - ");
        text.push_str(name);
        text.push('\n');
    }
    text.push_str(
        "\nEvery option can also be set with a TWEENERS_BENCH_* environment\n\
         variable, e.g. TWEENERS_BENCH_INITIAL_COUNT=1000.",
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(list: &[&str]) -> Result<Arguments, clap::Error> {
        Arguments::try_parse_from(std::iter::once("tweeners-bench").chain(list.iter().copied()))
    }

    #[test]
    fn verify_cli() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn lists_stop_at_the_next_flag() {
        let parsed = parse(&[
            "--durations",
            "1",
            "2.5",
            "--benchmarks",
            "self-flat",
            "--update",
            "0.5",
        ])
        .unwrap();

        assert_eq!(parsed.durations, vec![1.0, 2.5]);
        assert_eq!(parsed.benchmarks, vec!["self-flat".to_string()]);
        assert_eq!(parsed.update, Some(0.5));
        assert_eq!(parsed.initial_count, None);
    }

    #[test]
    fn unknown_and_malformed_arguments_are_rejected() {
        let unknown = parse(&["--frobnicate"]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::UnknownArgument);

        let malformed = parse(&["--initial-count", "many"]).unwrap_err();
        assert_eq!(malformed.kind(), ErrorKind::ValueValidation);

        assert!(parse(&["--update"]).is_err());
        assert!(parse(&["--durations"]).is_err());
    }

    #[test]
    fn help_lists_the_benchmarks() {
        let help = Arguments::command().render_long_help().to_string();

        assert!(help.contains("--initial-count"));
        for name in registry::names() {
            assert!(help.contains(name), "{name} missing from the help");
        }
    }

    #[test]
    fn command_line_overrides_loaded_options() {
        let parsed = parse(&["--initial-count", "10"]).unwrap();
        let options = parsed.apply(BenchOptions::default()).complete();

        assert_eq!(options.initial_count, 10);
        assert_eq!(options.update, 3.0);
        assert_eq!(options.durations, vec![5.0, 20.0, 10.0, 0.0, 30.0]);
        assert_eq!(options.benchmarks, vec!["self-default", "self-flat"]);
    }

    #[test]
    fn options_print_as_comments() {
        let options = BenchOptions {
            initial_count: 8,
            update: 1.5,
            durations: vec![5.0, 0.0],
            benchmarks: vec!["self-default".to_string()],
        };

        let mut out = Vec::new();
        options.print(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# initial count is 8.\n\
             # durations are {5, 0}\n\
             # update step is 1.5.\n\
             # running benchmarks: 'self-default'\n"
        );
    }
}
