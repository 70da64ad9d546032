mod common;

use common::MockHttp;
use cozy_chess::Color;
use piebot_arbiter::board::{Position, Variant};
use piebot_arbiter::config::{ChessdbQuality, CloudQuality, EgtbProvider, OnlineMovesConfig, TablebaseQuality};
use piebot_arbiter::game::{Clock, GameState};
use piebot_arbiter::outcome::{MoveCandidate, Score};
use piebot_arbiter::policy::DrawResignPolicy;
use piebot_arbiter::remote::{RemoteSource, CHESSDB_URL, LICHESS_CLOUD_URL, LICHESS_TABLEBASE_URL};
use pretty_assertions::assert_eq;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;

const KQK: &str = "4k3/8/8/8/8/8/8/4K2Q w - - 0 1";

fn game(ms: u64) -> GameState {
    GameState::new("remote", Color::White, Clock { wtime: ms, btime: ms, winc: 0, binc: 0 })
}

fn source(cfg: OnlineMovesConfig, http: &MockHttp) -> RemoteSource {
    RemoteSource::new(cfg, DrawResignPolicy::default(), Box::new(http.clone()))
}

fn played(pos: &Position, candidate: &MoveCandidate) -> String {
    pos.uci(candidate.play_result().expect("expected a move").mv)
}

fn lichess_egtb(quality: TablebaseQuality) -> OnlineMovesConfig {
    let mut cfg = OnlineMovesConfig::default();
    cfg.online_egtb.enabled = true;
    cfg.online_egtb.move_quality = quality;
    cfg
}

fn lichess_moves() -> serde_json::Value {
    json!({"category": "win", "moves": [
        {"uci": "h1h8", "category": "loss", "dtz": -5, "dtm": -9},
        {"uci": "h1a8", "category": "loss", "dtz": -9, "dtm": -13},
        {"uci": "e1d1", "category": "draw", "dtz": 0, "dtm": null}
    ]})
}

#[test]
fn lichess_egtb_good_stays_inside_the_best_category() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(&format!("{}/standard", LICHESS_TABLEBASE_URL), lichess_moves());
    let mut remote = source(lichess_egtb(TablebaseQuality::Good), &http);

    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let found = remote.lookup(&pos, &game(60_000), &mut rng);
        let mv = played(&pos, &found);
        assert!(mv == "h1h8" || mv == "h1a8", "picked {}", mv);
        assert_eq!(found.play_result().unwrap().info.score, Some(Score::Cp(9900)));
    }
    assert_eq!(http.param(0, "fen").as_deref(), Some(KQK));
}

#[test]
fn lichess_egtb_suggests_equal_moves() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(&format!("{}/standard", LICHESS_TABLEBASE_URL), lichess_moves());
    let mut remote = source(lichess_egtb(TablebaseQuality::Suggest), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let MoveCandidate::Suggestions(moves) = remote.lookup(&pos, &game(60_000), &mut rng) else { panic!("expected suggestions") };
    assert_eq!(moves, vec![pos.parse_uci("h1h8").unwrap(), pos.parse_uci("h1a8").unwrap()]);
}

#[test]
fn egtb_needs_time_on_our_clock() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(&format!("{}/standard", LICHESS_TABLEBASE_URL), lichess_moves());
    let mut remote = source(lichess_egtb(TablebaseQuality::Best), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    assert!(remote.lookup(&pos, &game(19_999), &mut rng).is_none());
    assert_eq!(http.request_count(), 0);
}

#[test]
fn chessdb_egtb_best_reads_the_pv() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "score": 29990, "pv": ["h1h8", "e8d7"]}));
    let mut cfg = lichess_egtb(TablebaseQuality::Best);
    cfg.online_egtb.source = EgtbProvider::Chessdb;
    let mut remote = source(cfg, &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let found = remote.lookup(&pos, &game(60_000), &mut rng);
    assert_eq!(played(&pos, &found), "h1h8");
    assert_eq!(found.play_result().unwrap().info.score, Some(Score::Cp(9900)));
    assert_eq!(http.param(0, "action").as_deref(), Some("querypv"));
}

#[test]
fn chessdb_egtb_survives_out_of_range_scores() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "score": i32::MIN, "pv": ["h1h8"]}));
    let mut cfg = lichess_egtb(TablebaseQuality::Best);
    cfg.online_egtb.source = EgtbProvider::Chessdb;
    let mut remote = source(cfg, &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let found = remote.lookup(&pos, &game(60_000), &mut rng);
    assert_eq!(played(&pos, &found), "h1h8");
}

fn chessdb_all_moves() -> serde_json::Value {
    json!({"status": "ok", "moves": [
        {"uci": "h1h8", "score": 29990},
        {"uci": "h1a8", "score": 29980},
        {"uci": "e1d1", "score": 0}
    ]})
}

#[test]
fn chessdb_egtb_suggests_every_winning_move() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(CHESSDB_URL, chessdb_all_moves());
    let mut cfg = lichess_egtb(TablebaseQuality::Suggest);
    cfg.online_egtb.source = EgtbProvider::Chessdb;
    let mut remote = source(cfg, &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let MoveCandidate::Suggestions(moves) = remote.lookup(&pos, &game(60_000), &mut rng) else { panic!("expected suggestions") };
    assert_eq!(moves, vec![pos.parse_uci("h1h8").unwrap(), pos.parse_uci("h1a8").unwrap()]);
    assert_eq!(http.param(0, "action").as_deref(), Some("queryall"));
}

#[test]
fn chessdb_egtb_good_never_gives_up_the_win() {
    let pos = Position::from_fen(KQK, Variant::Standard).unwrap();
    let http = MockHttp::default().reply(CHESSDB_URL, chessdb_all_moves());
    let mut cfg = lichess_egtb(TablebaseQuality::Good);
    cfg.online_egtb.source = EgtbProvider::Chessdb;
    let mut remote = source(cfg, &http);

    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let found = remote.lookup(&pos, &game(60_000), &mut rng);
        let mv = played(&pos, &found);
        assert!(mv == "h1h8" || mv == "h1a8", "picked {}", mv);
        assert_eq!(found.play_result().unwrap().info.score, Some(Score::Cp(9900)));
    }
    assert_eq!(http.param(0, "action").as_deref(), Some("queryall"));
}

#[test]
fn chessdb_egtb_is_standard_only() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2Q w - - 0 1", Variant::Chess960).unwrap();
    let http = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "score": 29990, "pv": ["h1h8"]}));
    let mut cfg = lichess_egtb(TablebaseQuality::Best);
    cfg.online_egtb.source = EgtbProvider::Chessdb;
    let mut remote = source(cfg, &http);

    let mut rng = SmallRng::seed_from_u64(1);
    assert!(remote.lookup(&pos, &game(60_000), &mut rng).is_none());
    assert_eq!(http.request_count(), 0);
}

fn chessdb_book(quality: ChessdbQuality, contribute: bool) -> OnlineMovesConfig {
    let mut cfg = OnlineMovesConfig::default();
    cfg.max_out_of_book_moves = 5;
    cfg.chessdb_book.enabled = true;
    cfg.chessdb_book.move_quality = quality;
    cfg.chessdb_book.contribute = contribute;
    cfg
}

#[test]
fn opening_sources_stop_after_enough_misses() {
    let pos = Position::startpos();
    let http = MockHttp::default().reply(CHESSDB_URL, json!({"status": "unknown"}));
    let mut remote = source(chessdb_book(ChessdbQuality::Good, false), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..7 {
        assert!(remote.lookup(&pos, &game(60_000), &mut rng).is_none());
    }
    assert_eq!(http.request_count(), 5);
    assert_eq!(remote.counter().count(), 5);
    assert!(remote.counter().is_exhausted());
}

#[test]
fn transport_errors_count_as_misses() {
    let pos = Position::startpos();
    let http = MockHttp::default();
    let mut remote = source(chessdb_book(ChessdbQuality::Good, false), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    assert!(remote.lookup(&pos, &game(60_000), &mut rng).is_none());
    assert_eq!(http.request_count(), 1);
    assert_eq!(remote.counter().count(), 1);
}

#[test]
fn chessdb_best_requires_depth() {
    let pos = Position::startpos();
    let deep = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "score": 35, "depth": 25, "pv": ["e2e4", "e7e5"]}));
    let mut remote = source(chessdb_book(ChessdbQuality::Best, false), &deep);
    let mut rng = SmallRng::seed_from_u64(1);
    let found = remote.lookup(&pos, &game(60_000), &mut rng);
    assert_eq!(played(&pos, &found), "e2e4");
    let info = &found.play_result().unwrap().info;
    assert_eq!(info.score, Some(Score::Cp(35)));
    assert_eq!(info.depth, Some(25));
    assert_eq!(info.pv.len(), 2);
    assert_eq!(remote.counter().count(), 0);

    let shallow = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "score": 35, "depth": 10, "pv": ["e2e4"]}));
    let mut remote = source(chessdb_book(ChessdbQuality::Best, false), &shallow);
    assert!(remote.lookup(&pos, &game(60_000), &mut rng).is_none());
}

#[test]
fn chessdb_best_cuts_the_pv_at_the_first_illegal_move() {
    let pos = Position::startpos();
    let http = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "score": 35, "depth": 25, "pv": ["e2e4", "e2e4", "e7e5"]}));
    let mut remote = source(chessdb_book(ChessdbQuality::Best, false), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let found = remote.lookup(&pos, &game(60_000), &mut rng);
    assert_eq!(played(&pos, &found), "e2e4");
    assert_eq!(found.play_result().unwrap().info.pv, vec![pos.parse_uci("e2e4").unwrap()]);
}

#[test]
fn chessdb_contribution_follows_the_query() {
    let pos = Position::startpos();
    let http = MockHttp::default().reply(CHESSDB_URL, json!({"status": "ok", "move": "d2d4"}));
    let mut remote = source(chessdb_book(ChessdbQuality::Good, true), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let found = remote.lookup(&pos, &game(60_000), &mut rng);
    assert_eq!(played(&pos, &found), "d2d4");
    assert_eq!(http.request_count(), 2);
    assert_eq!(http.param(0, "action").as_deref(), Some("querybest"));
    assert_eq!(http.param(1, "action").as_deref(), Some("queue"));
}

fn cloud(quality: CloudQuality) -> OnlineMovesConfig {
    let mut cfg = OnlineMovesConfig::default();
    cfg.lichess_cloud_analysis.enabled = true;
    cfg.lichess_cloud_analysis.move_quality = quality;
    cfg.lichess_cloud_analysis.max_score_difference = 50;
    cfg.lichess_cloud_analysis.min_depth = 20;
    cfg
}

#[test]
fn cloud_good_keeps_lines_near_the_top_for_white() {
    let pos = Position::startpos();
    let http = MockHttp::default().reply(LICHESS_CLOUD_URL, json!({"depth": 30, "knodes": 1000, "pvs": [
        {"moves": "e2e4 e7e5", "cp": 40},
        {"moves": "d2d4 d7d5", "cp": 20},
        {"moves": "g1f3", "cp": -30}
    ]}));
    let mut remote = source(cloud(CloudQuality::Good), &http);

    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let found = remote.lookup(&pos, &game(60_000), &mut rng);
        let mv = played(&pos, &found);
        assert!(mv == "e2e4" || mv == "d2d4", "picked {}", mv);
        let info = &found.play_result().unwrap().info;
        assert_eq!(info.nodes, Some(1_000_000));
        assert_eq!(info.depth, Some(30));
    }
    assert_eq!(http.param(0, "multiPv").as_deref(), Some("5"));
}

#[test]
fn cloud_window_is_mirrored_for_black() {
    let moves = vec!["e2e4".to_string()];
    let pos = Position::from_fen_and_moves(None, Variant::Standard, &moves).unwrap();
    let http = MockHttp::default().reply(LICHESS_CLOUD_URL, json!({"depth": 25, "knodes": 10, "pvs": [
        {"moves": "c7c5", "cp": 20},
        {"moves": "e7e5", "cp": 40},
        {"moves": "a7a6", "cp": 90}
    ]}));
    let mut remote = source(cloud(CloudQuality::Good), &http);
    let black = GameState::new("remote", Color::Black, Clock { wtime: 60_000, btime: 60_000, winc: 0, binc: 0 });

    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let found = remote.lookup(&pos, &black, &mut rng);
        let mv = played(&pos, &found);
        assert!(mv == "c7c5" || mv == "e7e5", "picked {}", mv);
        let expected = if mv == "c7c5" { Score::Cp(-20) } else { Score::Cp(-40) };
        assert_eq!(found.play_result().unwrap().info.score, Some(expected));
    }
}

#[test]
fn cloud_best_plays_the_top_line() {
    let pos = Position::startpos();
    let http = MockHttp::default().reply(LICHESS_CLOUD_URL, json!({"depth": 28, "knodes": 500, "pvs": [
        {"moves": "e2e4 e7e5", "cp": 40},
        {"moves": "d2d4", "cp": 60}
    ]}));
    let mut remote = source(cloud(CloudQuality::Best), &http);

    let mut rng = SmallRng::seed_from_u64(1);
    let found = remote.lookup(&pos, &game(60_000), &mut rng);
    assert_eq!(played(&pos, &found), "e2e4");
    let info = &found.play_result().unwrap().info;
    assert_eq!(info.score, Some(Score::Cp(40)));
    assert_eq!(info.pv.len(), 2);
    assert_eq!(http.param(0, "multiPv").as_deref(), Some("1"));
}

#[test]
fn cloud_errors_and_shallow_evals_are_misses() {
    let pos = Position::startpos();
    let missing = MockHttp::default().reply(LICHESS_CLOUD_URL, json!({"error": "Not found"}));
    let mut remote = source(cloud(CloudQuality::Best), &missing);
    let mut rng = SmallRng::seed_from_u64(1);
    assert!(remote.lookup(&pos, &game(60_000), &mut rng).is_none());
    assert_eq!(missing.param(0, "multiPv").as_deref(), Some("1"));

    let shallow = MockHttp::default().reply(LICHESS_CLOUD_URL, json!({"depth": 12, "knodes": 10, "pvs": [{"moves": "e2e4", "cp": 30}]}));
    let mut remote = source(cloud(CloudQuality::Best), &shallow);
    assert!(remote.lookup(&pos, &game(60_000), &mut rng).is_none());
    assert_eq!(remote.counter().count(), 1);
}
