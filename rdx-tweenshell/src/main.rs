use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tweeners::prelude::*;
use tweeners::{LIBRARY_NAME, VERSION as LIB_VERSION};

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

type System = TweenerSystem<DefaultConfig>;

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct MyHighlighter;

impl Highlighter for MyHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }

    const LOGO_TEXT: &str = include_str!("../logo.log");
    println!("{}", LOGO_TEXT.cyan());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    let rule = "-".repeat(72);

    println!("{}", rule.dimmed());
    println!("{}", version_string);
    println!(
        "{}",
        "    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", rule.dimmed());
}

fn print_help() {
    println!("Available commands:");
    println!("  add <FROM> <TO> <DURATION> [CURVE] [after <ID>]");
    println!("                        - Creates a tweener, started now or chained after #ID.");
    println!("  chain <FIRST> <SECOND> - Starts #SECOND each time #FIRST completes.");
    println!("  loop <ID>             - Restarts #ID each time it completes.");
    println!("  start <ID>            - Starts an idle tweener on the next update.");
    println!("  remove <ID>           - Removes a tweener.");
    println!("  step <DT>             - Advances time by DT seconds.");
    println!("  run <SECONDS>         - Plays the tweeners in real time.");
    println!("  list                  - Shows the tweeners and their values.");
    println!("  curves                - Shows the available easing curves.");
    println!("  exit                  - Quits the shell.");
}

fn print_curves() {
    println!("Available curves (add '-out' or '-in-out' to the name):");
    let names: Vec<&str> = Easing::ALL.iter().map(|easing| easing.name()).collect();
    println!("  {}", names.join(", "));
}

/// Parses the argument at `index`, naming it `name` in the error messages.
fn argument<T>(args: &[&str], index: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = args
        .get(index)
        .with_context(|| format!("missing <{}>", name))?;
    raw.parse()
        .map_err(|e| anyhow!("invalid <{}> '{}': {}", name, raw, e))
}

/// A tweener created from the shell, and the value it animates.
struct Tween {
    from: f32,
    to: f32,
    curve: Curve,
    value: Arc<StdMutex<f32>>,
}

/// The arguments of `add`.
#[derive(Debug, PartialEq)]
struct AddCommand {
    from: f32,
    to: f32,
    duration: f32,
    curve: Curve,
    previous: i32,
}

impl AddCommand {
    fn parse(args: &[&str]) -> Result<Self> {
        let from: f32 = argument(args, 1, "FROM")?;
        let to: f32 = argument(args, 2, "TO")?;
        let duration: f32 = argument(args, 3, "DURATION")?;
        if duration.is_nan() || duration < 0.0 {
            bail!("the duration must be a non-negative number of seconds");
        }

        let mut rest = args.get(4..).unwrap_or_default();
        let mut curve = Curve::LINEAR;
        if let Some(&name) = rest.first() {
            if name != "after" {
                curve = name.parse()?;
                rest = &rest[1..];
            }
        }

        let previous = match rest {
            [] => System::NOT_AN_ID,
            ["after", _] => argument(rest, 1, "ID")?,
            _ => bail!("usage: add <FROM> <TO> <DURATION> [CURVE] [after <ID>]"),
        };

        Ok(Self {
            from,
            to,
            duration,
            curve,
            previous,
        })
    }
}

struct Shell {
    system: Arc<Mutex<System>>,
    tweens: BTreeMap<i32, Tween>,
    resolution: ClockResolution,
}

impl Shell {
    fn new(config: &TweenersConfig) -> Self {
        Self {
            system: Arc::new(Mutex::new(System::with_capacity(&config.capacity))),
            tweens: BTreeMap::new(),
            resolution: config.resolution.clone(),
        }
    }

    async fn add(&mut self, args: &[&str]) -> Result<()> {
        let AddCommand {
            from,
            to,
            duration,
            curve,
            previous,
        } = AddCommand::parse(args)?;

        let value = Arc::new(StdMutex::new(from));
        let id = Builder::<DefaultConfig>::new()
            .range_assign(from, to, duration, value.clone(), curve.transform())
            .on_start(|_: &mut System, id: i32| {
                println!("<-- [START] tweener #{}", id);
            })
            .on_done(|_: &mut System, id: i32| {
                println!("{}", format!("<-- [DONE] tweener #{}", id).green());
            })
            .after(previous)
            .try_build(&mut *self.system.lock().await)?;

        self.tweens.insert(
            id,
            Tween {
                from,
                to,
                curve,
                value,
            },
        );

        if previous == System::NOT_AN_ID {
            println!("--> Added tweener #{}, starting on the next update.", id);
        } else {
            println!("--> Added tweener #{}, chained after #{}.", id, previous);
        }
        Ok(())
    }

    async fn chain(&mut self, args: &[&str]) -> Result<()> {
        let first: i32 = argument(args, 1, "FIRST")?;
        let second: i32 = argument(args, 2, "SECOND")?;

        self.system
            .lock()
            .await
            .try_play_in_sequence(first, second)?;
        println!("--> Tweener #{} now follows #{}.", second, first);
        Ok(())
    }

    async fn repeat(&mut self, args: &[&str]) -> Result<()> {
        let id: i32 = argument(args, 1, "ID")?;

        self.system.lock().await.try_play_in_sequence(id, id)?;
        println!("--> Tweener #{} now loops.", id);
        Ok(())
    }

    async fn start(&mut self, args: &[&str]) -> Result<()> {
        let id: i32 = argument(args, 1, "ID")?;

        self.system.lock().await.try_start(id)?;
        println!("--> Tweener #{} starts on the next update.", id);
        Ok(())
    }

    async fn remove(&mut self, args: &[&str]) -> Result<()> {
        let id: i32 = argument(args, 1, "ID")?;

        self.system.lock().await.try_remove(id)?;
        self.tweens.remove(&id);
        println!("--> Tweener #{} removed.", id);
        Ok(())
    }

    async fn step(&mut self, args: &[&str]) -> Result<()> {
        let dt: f32 = argument(args, 1, "DT")?;
        if dt.is_nan() || dt < 0.0 {
            bail!("time cannot go backwards");
        }

        self.system.lock().await.try_update(dt)?;
        self.list().await;
        Ok(())
    }

    /// Plays the tweeners for `seconds` of real time, driven by the clock.
    async fn run(&mut self, args: &[&str]) -> Result<()> {
        let seconds: f64 = argument(args, 1, "SECONDS")?;
        if seconds <= 0.0 || !seconds.is_finite() {
            bail!("the run time must be a positive number of seconds");
        }

        let (tick_sender, ticks) = broadcast::channel(64);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let clock = SystemClock::new(self.resolution.clone(), tick_sender);
        let clock_handle = tokio::spawn(clock.run(shutdown_rx));
        let driver = tokio::spawn(drive(
            self.system.clone(),
            ticks,
            |tick: &TickEvent| tick.delta.as_secs_f32(),
        ));

        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
        shutdown_tx
            .send(())
            .map_err(|_| anyhow!("the clock stopped before the end of the run"))?;

        // The driver returns once the clock drops its sender.
        clock_handle.await?;
        let update_count = driver.await??;

        println!("--> {} updates in {} seconds.", update_count, seconds);
        self.list().await;
        Ok(())
    }

    async fn list(&self) {
        if self.tweens.is_empty() {
            println!("No tweeners. Use 'add' to create one.");
            return;
        }

        let system = self.system.lock().await;
        println!("Tweeners:");
        for (&id, tween) in &self.tweens {
            let Some(state) = system.slot_state(id) else {
                continue;
            };
            let value = tween.value.lock().map(|v| *v).unwrap_or(f32::NAN);
            let elapsed = system.elapsed(id).unwrap_or_default();
            let duration = system.duration(id).unwrap_or_default();
            let after = system
                .predecessor(id)
                .map(|p| format!(" after #{}", p))
                .unwrap_or_default();

            println!(
                "  #{:<3} {:<8} {:>8.2} -> {:<8.2} {:<14} {:>6.2}/{:<6.2} value {:>9.3}{}",
                id,
                format!("{:?}", state),
                tween.from,
                tween.to,
                tween.curve.to_string(),
                elapsed,
                duration,
                value,
                after
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = env::args().nth(1);
    let config = TweenersConfig::load(config_path.as_deref().map(Path::new))
        .with_context(|| format!("failed to load the configuration from {:?}", config_path))?;
    info!(
        "{} v{} ready, clock resolution {:?}.",
        LIBRARY_NAME.cyan(),
        LIB_VERSION,
        config.resolution
    );

    let mut shell = Shell::new(&config);

    let mut rl = Editor::new()?;
    let helper = MyHighlighter {};
    rl.set_helper(Some(helper));

    println!(
        "{} is ready. Type 'help' for commands or 'exit' to quit.",
        "tweenshell".cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let args = line.split_whitespace().collect::<Vec<_>>();

                let Some(&command) = args.first() else {
                    continue;
                };

                let result = match command {
                    "add" => shell.add(&args).await,
                    "chain" => shell.chain(&args).await,
                    "loop" => shell.repeat(&args).await,
                    "start" => shell.start(&args).await,
                    "remove" => shell.remove(&args).await,
                    "step" => shell.step(&args).await,
                    "run" => shell.run(&args).await,
                    "list" => {
                        shell.list().await;
                        Ok(())
                    }
                    "curves" => {
                        print_curves();
                        Ok(())
                    }
                    "help" => {
                        print_help();
                        Ok(())
                    }
                    "exit" => break,
                    _ => {
                        println!("Unknown command: '{}'. Type 'help'.", line.trim());
                        Ok(())
                    }
                };

                if let Err(e) = result {
                    println!("{} {:#}", "Error:".red().bold(), e);
                }
            }
            Err(_) => {
                println!("Exiting tweenshell...");
                break;
            }
        }
    }

    Ok(())
}
