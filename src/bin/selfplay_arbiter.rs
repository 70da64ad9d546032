use anyhow::{Context, Result};
use clap::Parser;
use cozy_chess::Color;
use log::info;
use piebot_arbiter::board::Position;
use piebot_arbiter::config::ArbiterConfig;
use piebot_arbiter::engine::{EngineKind, EngineRegistry, GameReport};
use piebot_arbiter::game::{translate_termination, Clock, GameState, Termination};
use piebot_arbiter::search::PlyTiming;
use piebot_arbiter::MoveArbitrator;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "selfplay-arbiter", about = "Play two move arbitrators against each other with homemade engines")]
struct Args {
    /// Homemade engine for White
    #[arg(long, default_value = "MaterialSearch")]
    white: String,

    /// Homemade engine for Black
    #[arg(long, default_value = "RandomMove")]
    black: String,

    /// Number of games to play
    #[arg(long, default_value_t = 2)]
    games: usize,

    /// Max plies before adjudicating a draw
    #[arg(long, default_value_t = 200)]
    max_plies: usize,

    /// Initial clock per side in milliseconds
    #[arg(long, default_value_t = 60_000)]
    clock_ms: u64,

    /// Increment per move in milliseconds
    #[arg(long, default_value_t = 500)]
    inc_ms: u64,

    /// Movetime cap per search in milliseconds
    #[arg(long, default_value_t = 200)]
    movetime: u64,

    /// Optional JSON file with the arbiter configuration
    #[arg(long)]
    config: Option<String>,

    /// Random seed
    #[arg(long, default_value_t = 1u64)]
    seed: u64,
}

fn load_config(args: &Args) -> Result<ArbiterConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            ArbiterConfig::from_json(&text).with_context(|| format!("parsing {}", path))?
        }
        None => ArbiterConfig::default(),
    };
    cfg.go_commands.movetime = Some(args.movetime);
    cfg.timing.first_move_time_ms = args.movetime;
    cfg.timing.move_overhead_ms = 0;
    Ok(cfg)
}

fn new_arbiter(registry: &EngineRegistry, cfg: &ArbiterConfig, name: &str, seed: u64) -> Result<MoveArbitrator> {
    let kind = EngineKind::from_config("homemade", name)?;
    let engine = registry.create(&kind, Default::default()).with_context(|| format!("starting {}", name))?;
    let cfg = ArbiterConfig { seed: Some(seed), ..cfg.clone() };
    Ok(MoveArbitrator::new(&cfg, engine))
}

fn play_game(args: &Args, cfg: &ArbiterConfig, registry: &EngineRegistry, index: usize) -> Result<String> {
    let game_id = format!("selfplay-{}", index + 1);
    let seed = args.seed.wrapping_add(index as u64 * 2);
    let mut white = new_arbiter(registry, cfg, &args.white, seed)?;
    let mut black = new_arbiter(registry, cfg, &args.black, seed + 1)?;
    let clock = Clock { wtime: args.clock_ms, btime: args.clock_ms, winc: args.inc_ms, binc: args.inc_ms };
    let mut states = [
        GameState::new(game_id.clone(), Color::White, clock),
        GameState::new(game_id.clone(), Color::Black, clock),
    ];

    let mut pos = Position::startpos();
    let (result, termination, winner) = loop {
        if pos.is_checkmate() {
            let winner = !pos.side_to_move();
            let result = if winner == Color::White { "1-0" } else { "0-1" };
            break (result, Termination::Mate, Some(winner));
        }
        if pos.legal_moves().is_empty() {
            break ("1/2-1/2", Termination::Other("Stalemate".into()), None);
        }
        if pos.is_fifty_moves() || pos.is_repetition() || pos.ply() >= args.max_plies {
            break ("1/2-1/2", Termination::Draw, None);
        }

        let stm = pos.side_to_move();
        let (arb, idx) = if stm == Color::White { (&mut white, 0) } else { (&mut black, 1) };
        let started = Instant::now();
        let decision = arb.choose_move(&pos, &mut states[idx], &PlyTiming::now(false))?;
        let Some(played) = decision.play_result().cloned() else {
            break ("1/2-1/2", Termination::Other("No move".into()), None);
        };
        if decision.should_resign() {
            let result = if stm == Color::White { "0-1" } else { "1-0" };
            break (result, Termination::Resign, Some(!stm));
        }

        // The mover's own copy was already reduced by the search controller
        let spent = started.elapsed().as_millis() as u64;
        let mut clock = states[1 - idx].clock;
        let inc = if stm == Color::White { clock.winc } else { clock.binc };
        let left = clock.time_left_mut(stm);
        if *left <= spent {
            let result = if stm == Color::White { "0-1" } else { "1-0" };
            break (result, Termination::Timeout, Some(!stm));
        }
        *left = *left - spent + inc;

        let offered_before = states[idx].draw_offered_by_opponent();
        for state in states.iter_mut() {
            state.clock = clock;
            match stm {
                Color::White => state.white_draw_offer = played.draw_offered,
                Color::Black => state.black_draw_offer = played.draw_offered,
            }
        }
        info!("{} plays {} ({})", game_id, pos.uci(played.mv), decision.source);
        pos = pos.after(played.mv);
        if played.draw_offered && offered_before {
            break ("1/2-1/2", Termination::Draw, None);
        }
    };

    let report = GameReport {
        result: result.to_string(),
        termination: translate_termination(Some(&termination), winner, &pos),
    };
    for arb in [&mut white, &mut black] {
        arb.report_game_result(&pos, &report);
        for line in arb.stats(true) { info!("{} {}: {}", game_id, arb.engine_name(), line); }
        arb.shutdown()?;
    }
    Ok(format!("{} {} ({}) after {} plies", game_id, report.result, report.termination, pos.ply()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = load_config(&args)?;
    let registry = EngineRegistry::default();
    for i in 0..args.games {
        let summary = play_game(&args, &cfg, &registry, i)?;
        println!("{}", summary);
    }
    Ok(())
}
