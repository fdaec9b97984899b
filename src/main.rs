//! Handsign CLI
//!
//! Usage:
//!   handsign                                  # Interactive game on stdin
//!   handsign --play --auto-start              # Same, round starts at once
//!   handsign --serve                          # HTTP API server
//!   handsign --json                           # JSON updates
//!   handsign --round-secs 10 --threshold 0.7  # Custom rules

use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use handsign::core::{
    parse_feed_line, run_server, BackgroundFileStore, GameController, GameHandle,
    HighScoreStore, JsonFileStore, MemoryStore, RoundEngine,
};
use handsign::types::{ConfigError, GameConfig, GameUpdate, Phase, RoundReport, RoundSnapshot};
use handsign::{CONFIDENCE_THRESHOLD, ROUND_DURATION_SECS, VERSION};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "handsign",
    version = VERSION,
    about = "Handsign - beat the target hand sign before the clock runs out",
    long_about = "Handsign is a timed rock-paper-scissors game played against a\n\
                  gesture classifier. Show the sign that beats the target; each\n\
                  confident match scores a point and draws a new target.\n\n\
                  Stdin commands (interactive mode):\n  \
                  start | restart | stop | quit\n  \
                  LABEL CONFIDENCE   e.g. 'FiveHand 0.93' or 'paper 0.9'\n\n\
                  Phases:\n  \
                  IDLE     - Waiting for start\n  \
                  RUNNING  - Countdown active\n  \
                  ENDED    - Round over, score reported"
)]
struct Args {
    /// Interactive game on stdin (default)
    #[arg(short, long, conflicts_with = "serve")]
    play: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Round length in seconds
    #[arg(long, default_value_t = ROUND_DURATION_SECS)]
    round_secs: u32,

    /// Minimum classifier confidence for a point
    #[arg(long, default_value_t = CONFIDENCE_THRESHOLD)]
    threshold: f64,

    /// High score file
    #[arg(long, default_value = "./highscore.json")]
    highscore_file: String,

    /// Keep the high score in memory only
    #[arg(long)]
    no_persist: bool,

    /// Seed for target selection
    #[arg(long)]
    seed: Option<u64>,

    /// Start a round immediately
    #[arg(long)]
    auto_start: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn config(&self) -> Result<GameConfig, ConfigError> {
        let config = GameConfig::default()
            .with_round_secs(self.round_secs)
            .with_threshold(self.threshold);
        let config = match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        };
        config.validate()?;
        Ok(config)
    }

    fn store(&self) -> Box<dyn HighScoreStore> {
        if self.no_persist {
            Box::new(MemoryStore::new())
        } else {
            Box::new(BackgroundFileStore::spawn(JsonFileStore::new(&self.highscore_file)))
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let engine = RoundEngine::new(config, args.store());
    let handle = GameController::spawn(engine);

    let result = if args.play || !args.serve {
        run_play(&args, handle).await
    } else {
        run_serve(&args, handle).await
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, handle: GameHandle) -> CliResult {
    print_header("API Server");
    run_server(&args.addr, handle).await
}

/// Interactive game: stdin carries commands and classifier feed lines
async fn run_play(args: &Args, handle: GameHandle) -> CliResult {
    if !args.json {
        print_header("Play");
        println!("Show the sign that BEATS the target. Confidence ≥ {:.2} scores.", args.threshold);
        println!("Type 'start' to begin, feed lines like 'FiveHand 0.93', 'quit' to exit.");
        println!();
    }

    let printer = tokio::spawn(print_updates(handle.subscribe(), args.json, args.no_color));

    if args.auto_start {
        handle.start()?;
    } else if !args.json {
        print_snapshot(&handle.snapshot(), args.no_color);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let sent = match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "start" => handle.start(),
            "restart" => handle.restart(),
            "stop" => handle.stop(),
            _ => match parse_feed_line(line) {
                Ok(event) => handle.classify(event),
                Err(e) => {
                    eprintln!("{} {}", "⚠".yellow(), e);
                    continue;
                }
            },
        };

        if let Err(e) = sent {
            eprintln!("{} {}", "⚠".yellow(), e);
        }
    }

    let _ = handle.shutdown();
    printer.abort();

    if !args.json {
        println!("\nBye. High score: {}", handle.high_score());
    }
    Ok(())
}

/// Print updates as the controller publishes them
async fn print_updates(mut rx: broadcast::Receiver<GameUpdate>, json: bool, no_color: bool) {
    loop {
        let update = match rx.recv().await {
            Ok(update) => update,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if json {
            match serde_json::to_string(&update) {
                Ok(line) => println!("{}", line),
                Err(e) => log::warn!("cannot serialize update: {}", e),
            }
            continue;
        }

        match update {
            GameUpdate::State(snapshot) => {
                // The final state is covered by the report
                if snapshot.phase != Phase::Ended {
                    print_snapshot(&snapshot, no_color);
                }
            }
            GameUpdate::Ended(report) => print_report(&report, no_color),
        }
    }
}

fn print_snapshot(snapshot: &RoundSnapshot, no_color: bool) {
    if no_color {
        println!("{}", snapshot.to_parseable_string());
    } else {
        println!("{}", snapshot.to_terminal_string());
    }
}

fn print_report(report: &RoundReport, no_color: bool) {
    if no_color {
        println!("{}", report.to_parseable_string());
        return;
    }

    println!();
    println!("{}", "╔══════════════════════════════╗".cyan());
    println!("{}", format!("  Your score: {}", report.final_score).bold());
    println!("  High score: {}", report.high_score);
    if report.new_record {
        println!("{}", "  ★ NEW RECORD".green().bold());
    }
    println!("{}", "╚══════════════════════════════╝".cyan());
    println!("{}", "Type 'restart' to play again.".dimmed());
    println!();
}

/// Print header
fn print_header(mode: &str) {
    println!("{}", "════════════════════════════════════════".bold());
    println!("{}", format!("  Handsign v{} - {}", VERSION, mode).bold());
    println!("{}", "════════════════════════════════════════".bold());
    println!();
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_conflicts_with_serve() {
        assert!(Args::try_parse_from(["handsign", "--play", "--auto-start"]).is_ok());
        assert!(Args::try_parse_from(["handsign", "--play", "--serve"]).is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let args = Args::try_parse_from(["handsign", "--threshold", "2.0"]).unwrap();
        assert!(args.config().is_err());

        let args = Args::try_parse_from(["handsign", "--threshold", "0.7", "--seed", "4"]).unwrap();
        let config = args.config().unwrap();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.seed, Some(4));
    }
}
