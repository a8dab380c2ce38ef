//! golf-settlement CLI
//!
//! Settle golf bets from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Settle a scored round
//! golf-settlement settle --input round.json
//!
//! # Output as JSON
//! golf-settlement settle --input round.json --format json
//!
//! # Net score for one hole
//! golf-settlement net --gross 5 --handicap 10 --stroke-index 5
//!
//! # Generate a random scored round for testing
//! golf-settlement generate --players 4 --holes 18
//! ```
//!
//! Set `RUST_LOG=debug` to trace per-hole settlement.

use golf_settlement::betting::settlement::settle_round;
use golf_settlement::betting::wager::BettingOptions;
use golf_settlement::core::course::{Course, Hole, Tee};
use golf_settlement::core::error::{Result, SettlementError};
use golf_settlement::core::player::{Player, PlayerId};
use golf_settlement::core::round::Round;
use golf_settlement::core::score::compute_net_score;
use golf_settlement::simulation::random_round::{generate_random_round, RoundConfig};
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"golf-settlement — handicap-aware golf betting settlement

USAGE:
    golf-settlement <COMMAND> [OPTIONS]

COMMANDS:
    settle      Settle every wager of a scored round
    net         Compute the net score for a single hole
    generate    Generate a random scored round (for testing)
    help        Show this message

OPTIONS (settle):
    --input <FILE>      Path to JSON round file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (net):
    --gross <N>         Gross strokes on the hole
    --handicap <N>      Player handicap (0-54)
    --stroke-index <N>  Hole stroke index for the tee played (1-18)

OPTIONS (generate):
    --players <N>       Number of players (default: 4)
    --holes <N>         9 or 18 (default: 18)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    golf-settlement settle --input round.json
    golf-settlement settle --input round.json --format json
    golf-settlement net --gross 5 --handicap 25 --stroke-index 7
    golf-settlement generate --players 6 --holes 9 --output round.json"#
    );
}

/// JSON schema for a round file.
#[derive(serde::Serialize, serde::Deserialize)]
struct RoundFile {
    #[serde(default = "default_course")]
    course: String,
    #[serde(default = "default_tee")]
    tee: String,
    holes: Vec<HoleInput>,
    players: Vec<PlayerInput>,
    #[serde(default)]
    betting: BettingOptions,
    /// Hole number -> player id.
    #[serde(default)]
    closest_to_pin: BTreeMap<u8, String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct HoleInput {
    number: u8,
    par: u8,
    stroke_index: u8,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PlayerInput {
    id: String,
    #[serde(default)]
    name: String,
    handicap: u8,
    /// Gross scores in hole order, starting at hole 1.
    scores: Vec<u8>,
}

fn default_course() -> String {
    "course".to_string()
}

fn default_tee() -> String {
    "white".to_string()
}

/// JSON output schema for a settled round.
#[derive(serde::Serialize)]
struct SettlementOutput {
    round: String,
    holes: u8,
    valid: bool,
    unclaimed_skins: u32,
    players: Vec<PlayerOutput>,
    transfers: Vec<TransferOutput>,
}

#[derive(serde::Serialize)]
struct PlayerOutput {
    id: String,
    gross: u32,
    net: u32,
    to_par: i32,
    balance: String,
    formats: BTreeMap<String, String>,
}

#[derive(serde::Serialize)]
struct TransferOutput {
    from: String,
    to: String,
    amount: String,
}

fn build_round(file: RoundFile) -> Result<Round> {
    let tee = Tee::new(file.tee);
    let holes = file
        .holes
        .iter()
        .map(|h| {
            Hole::new(h.number, h.par)?.with_stroke_index(tee.clone(), h.stroke_index)
        })
        .collect::<Result<Vec<_>>>()?;
    let course = Course::new(file.course, holes)?;

    let players = file
        .players
        .iter()
        .map(|p| {
            let name = if p.name.is_empty() { &p.id } else { &p.name };
            Player::new(PlayerId::new(&p.id), name.as_str(), p.handicap)
        })
        .collect::<Result<Vec<_>>>()?;

    let hole_count = u8::try_from(course.len()).unwrap_or(u8::MAX);
    let mut round = Round::new(&course, hole_count, tee, players, file.betting)?;

    for p in &file.players {
        if p.scores.len() > usize::from(hole_count) {
            return Err(SettlementError::InvalidInput(format!(
                "player {} has {} scores for a {}-hole round",
                p.id,
                p.scores.len(),
                hole_count
            )));
        }
        let id = PlayerId::new(&p.id);
        for (hole, gross) in (1..=hole_count).zip(&p.scores) {
            round = round.record_score(&id, hole, *gross)?;
        }
    }
    for (hole, player) in &file.closest_to_pin {
        round = round.mark_closest_to_pin(*hole, &PlayerId::new(player))?;
    }
    Ok(round)
}

fn round_file(round: &Round) -> Result<RoundFile> {
    let holes = round
        .holes()
        .iter()
        .map(|h| {
            Ok(HoleInput {
                number: h.number(),
                par: h.par(),
                stroke_index: h.stroke_index(round.tee())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut closest_to_pin = BTreeMap::new();
    let players = round
        .players()
        .iter()
        .map(|p| {
            for score in p.scores().filter(|s| s.closest_to_pin()) {
                closest_to_pin.insert(score.hole(), p.id().to_string());
            }
            PlayerInput {
                id: p.id().to_string(),
                name: p.name().to_string(),
                handicap: p.handicap(),
                scores: p.scores().map(|s| s.gross()).collect(),
            }
        })
        .collect();

    Ok(RoundFile {
        course: round.course_id().to_string(),
        tee: round.tee().to_string(),
        holes,
        players,
        betting: round.betting().clone(),
        closest_to_pin,
    })
}

fn load_round(path: &str) -> Round {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: RoundFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "tee": "white",
  "holes": [ {{ "number": 1, "par": 4, "stroke_index": 7 }} ],
  "players": [ {{ "id": "ann", "handicap": 12, "scores": [5] }} ],
  "betting": [ {{ "format": "match_play", "stake": "5" }} ]
}}"#
        );
        process::exit(1);
    });

    build_round(file).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    })
}

fn required<T>(value: Option<T>, flag: &str) -> T {
    value.unwrap_or_else(|| {
        eprintln!("Error: {} <N> is required", flag);
        process::exit(1);
    })
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{} requires a number", flag);
            process::exit(1);
        })
}

fn cmd_settle(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let round = load_round(&path);
    let settlement = settle_round(&round).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    info!(
        "settled round {} through hole {}",
        settlement.round_id(),
        settlement.through_hole()
    );

    if format == "json" {
        let players = settlement
            .totals()
            .iter()
            .map(|(player, totals)| PlayerOutput {
                id: player.to_string(),
                gross: totals.gross,
                net: totals.net,
                to_par: totals.to_par,
                balance: totals.balance.to_string(),
                formats: settlement
                    .ledger()
                    .positions_for_player(player)
                    .into_iter()
                    .map(|(format, amount)| (format.to_string(), amount.to_string()))
                    .collect(),
            })
            .collect();

        let transfers = settlement
            .transfers()
            .into_iter()
            .map(|t| TransferOutput {
                from: t.from.to_string(),
                to: t.to.to_string(),
                amount: t.amount.to_string(),
            })
            .collect();

        let output = SettlementOutput {
            round: settlement.round_id().to_string(),
            holes: settlement.through_hole(),
            valid: settlement.is_valid(),
            unclaimed_skins: settlement.unclaimed_skins(),
            players,
            transfers,
        };

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", settlement);
    }
}

fn cmd_net(args: &[String]) {
    let mut gross: Option<u8> = None;
    let mut handicap: Option<u8> = None;
    let mut stroke_index: Option<u8> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--gross" => {
                i += 1;
                gross = Some(parse_number(args, i, "--gross"));
            }
            "--handicap" => {
                i += 1;
                handicap = Some(parse_number(args, i, "--handicap"));
            }
            "--stroke-index" => {
                i += 1;
                stroke_index = Some(parse_number(args, i, "--stroke-index"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let result = compute_net_score(
        required(gross, "--gross"),
        required(handicap, "--handicap"),
        required(stroke_index, "--stroke-index"),
    )
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    println!("Net score:        {}", result.net_score);
    println!("Strokes received: {}", result.strokes_received);
}

fn cmd_generate(args: &[String]) {
    let mut config = RoundConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--players" => {
                i += 1;
                config.player_count = parse_number(args, i, "--players");
            }
            "--holes" => {
                i += 1;
                config.hole_count = parse_number(args, i, "--holes");
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let json = generate_random_round(&config)
        .and_then(|round| round_file(&round))
        .map_err(|e| e.to_string())
        .and_then(|file| serde_json::to_string_pretty(&file).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated a {}-hole round for {} players → {}",
            config.hole_count, config.player_count, path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "net" => cmd_net(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
