// Re-runs logged chess decisions against the current search
//
//   replay <log_file> (--all | --turns 3,7 | --validate 3:e2e4|d2d4) [--verbose]
//          [--config Bot.toml] [--seed N]
//
// Validation checks the logged moves themselves and never searches.

use std::env;
use std::process;

use frontier_chess_bot::config::Config;
use frontier_chess_bot::replay::{normalize_uci, ReplayEngine};

fn print_usage() {
    eprintln!("Chess Bot Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> <MODE> [OPTIONS]");
    eprintln!();
    eprintln!("MODES:");
    eprintln!("  --all                   Search every logged position again");
    eprintln!("  --turns <T1,T2,...>     Search only the listed turns");
    eprintln!("  --validate <T:M,...>    Check logged moves, M may list alternatives as a|b");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --verbose               Print each replayed decision");
    eprintln!("  --config <path>         Search parameters (default: Bot.toml)");
    eprintln!("  --seed <n>              Seed for the tie-break among near-best moves");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay chess_bot_debug.jsonl --all --seed 7");
    eprintln!("  replay chess_bot_debug.jsonl --turns 12,14 --verbose");
    eprintln!("  replay chess_bot_debug.jsonl --validate 5:e2e4,10:g1f3|b1c3");
}

#[derive(Debug)]
enum Mode {
    All,
    Turns(Vec<i32>),
    Validate(Vec<(i32, Vec<String>)>),
}

#[derive(Debug)]
struct Options {
    log_file: String,
    config_path: String,
    seed: Option<u64>,
    verbose: bool,
    mode: Mode,
}

fn parse_turns(s: &str) -> Result<Vec<i32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<i32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

fn parse_uci(s: &str) -> Result<String, String> {
    let m = normalize_uci(s);
    let valid = (4..=5).contains(&m.len()) && m.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(m)
    } else {
        Err(format!("Invalid UCI move: {}", s))
    }
}

fn parse_expected_moves(s: &str) -> Result<Vec<(i32, Vec<String>)>, String> {
    s.split(',')
        .map(|pair| {
            let (turn, moves) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn:move'", pair))?;
            let turn = turn
                .parse::<i32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;
            let moves = moves.split('|').map(parse_uci).collect::<Result<Vec<_>, _>>()?;
            Ok((turn, moves))
        })
        .collect()
}

/// Pulls the argument that follows `flag`
fn value_of<'a>(flag: &str, rest: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, String> {
    rest.next().ok_or_else(|| format!("{} requires an argument", flag))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let log_file = args.first().ok_or("Missing log file")?.clone();
    let mut config_path = "Bot.toml".to_string();
    let mut seed = None;
    let mut verbose = false;
    let mut mode = None;

    let mut rest = args[1..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--all" => mode = Some(Mode::All),
            "--turns" => {
                let turns = parse_turns(value_of(flag, &mut rest)?)
                    .map_err(|e| format!("Error parsing turns: {}", e))?;
                mode = Some(Mode::Turns(turns));
            }
            "--validate" => {
                let expected = parse_expected_moves(value_of(flag, &mut rest)?)
                    .map_err(|e| format!("Error parsing expected moves: {}", e))?;
                mode = Some(Mode::Validate(expected));
            }
            "--config" => config_path = value_of(flag, &mut rest)?.clone(),
            "--seed" => {
                let raw = value_of(flag, &mut rest)?;
                let parsed = raw
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid seed '{}': {}", raw, e))?;
                seed = Some(parsed);
            }
            "--verbose" => verbose = true,
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }

    let mode = mode.ok_or("Must specify --all, --turns, or --validate")?;
    Ok(Options {
        log_file,
        config_path,
        seed,
        verbose,
        mode,
    })
}

fn run(options: Options) -> Result<(), String> {
    let config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", options.config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", options.config_path);
    println!("Replay log file: {}", options.log_file);
    println!();

    let mut engine = ReplayEngine::new(config, options.verbose);
    if let Some(seed) = options.seed {
        engine = engine.with_seed(seed);
    }

    let entries = engine
        .load_log_file(&options.log_file)
        .map_err(|e| format!("Error loading log file: {}", e))?;
    if entries.is_empty() {
        return Err("Log file is empty".to_string());
    }
    println!("Loaded {} log entries\n", entries.len());

    match options.mode {
        Mode::All => {
            println!("Replaying all {} turns...\n", entries.len());
            let results = engine
                .replay_all(&entries)
                .map_err(|e| format!("Error during replay: {}", e))?;
            engine.print_report(&results);
        }
        Mode::Turns(turns) => {
            println!("Replaying {} specific turn(s)...\n", turns.len());
            let results = engine
                .replay_turns(&entries, &turns)
                .map_err(|e| format!("Error during replay: {}", e))?;
            engine.print_report(&results);
        }
        Mode::Validate(expected) => {
            println!("Validating {} expected move(s)...\n", expected.len());
            engine
                .validate_expected_moves(&entries, &expected)
                .map_err(|e| format!("✗ Validation failed: {}", e))?;
            println!("✓ All expected moves validated successfully!");
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(0);
    }
    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
