use chrono::Utc;
use golf_settlement::betting::hole::compute_hole_betting;
use golf_settlement::betting::settlement::settle_round;
use golf_settlement::betting::wager::{BettingOptions, MatchPlayMode, TiePolicy, Wager, WagerFormat};
use golf_settlement::core::course::{Course, Hole, Tee};
use golf_settlement::core::error::SettlementError;
use golf_settlement::core::player::{Player, PlayerId};
use golf_settlement::core::round::{Round, RoundId, RoundStatus};
use golf_settlement::core::score::compute_net_score;
use golf_settlement::simulation::random_round::{generate_random_round, RoundConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

const PARS: [u8; 9] = [4, 4, 3, 5, 4, 4, 3, 4, 5];
const INDEXES: [u8; 9] = [5, 1, 17, 9, 3, 13, 15, 7, 11];

fn nine_hole_course() -> Course {
    let white = Tee::new("white");
    let red = Tee::new("red");
    let holes = PARS
        .iter()
        .zip(INDEXES)
        .enumerate()
        .map(|(i, (par, index))| {
            Hole::new(i as u8 + 1, *par)
                .unwrap()
                .with_stroke_index(white.clone(), index)
                .unwrap()
                .with_stroke_index(red.clone(), 19 - index)
                .unwrap()
        })
        .collect();
    Course::new("municipal-nine", holes).unwrap()
}

fn play(round: Round, card: &[(&str, [u8; 9])]) -> Round {
    let mut round = round;
    for hole in 1..=9u8 {
        for (id, scores) in card {
            round = round
                .record_score(&PlayerId::new(*id), hole, scores[usize::from(hole) - 1])
                .unwrap();
        }
        round = round.advance().unwrap();
    }
    round
}

/// Full lifecycle: create, score hole by hole, complete, verify balances.
#[test]
fn full_round_four_formats() {
    let players = vec![
        Player::new(PlayerId::new("ann"), "Ann", 14).unwrap(),
        Player::new(PlayerId::new("ben"), "Ben", 4).unwrap(),
        Player::new(PlayerId::new("cal"), "Cal", 22).unwrap(),
    ];
    let betting = BettingOptions::new()
        .with(Wager::stroke_play(dec!(6)))
        .unwrap()
        .with(Wager::match_play(dec!(2)))
        .unwrap()
        .with(Wager::skins(dec!(1)))
        .unwrap()
        .with(Wager::BirdieBonus { stake: dec!(3) })
        .unwrap();
    let round = Round::new(&nine_hole_course(), 9, Tee::new("white"), players, betting)
        .unwrap()
        .with_id(RoundId::from_uuid(Uuid::nil()));

    let round = play(
        round,
        &[
            ("ann", [5, 5, 4, 6, 5, 5, 3, 5, 6]),
            ("ben", [4, 4, 3, 5, 4, 5, 2, 4, 5]),
            ("cal", [6, 6, 4, 6, 6, 5, 4, 5, 7]),
        ],
    );
    assert!(round.is_complete());
    assert_eq!(round.current_hole(), 9);

    let (done, settlement) = round.complete(Utc::now()).unwrap();
    assert_eq!(done.status(), RoundStatus::Completed);
    assert!(settlement.is_valid());
    assert_eq!(settlement.holes().len(), 9);

    // Every player's stamped balance matches the settlement and the sum of
    // their per-hole deltas.
    let mut total = Decimal::ZERO;
    for player in done.players() {
        let from_holes: Decimal = settlement
            .holes()
            .iter()
            .map(|h| h.player_total(player.id()))
            .sum();
        assert_eq!(player.balance(), from_holes);
        assert_eq!(player.balance(), settlement.balance(player.id()));
        total += player.balance();
    }
    assert_eq!(total, Decimal::ZERO);

    // Ben birdied hole 7 alone: 3 from each of the other two.
    let ben = PlayerId::new("ben");
    assert_eq!(settlement.holes()[6].delta(&ben, WagerFormat::BirdieBonus), dec!(6));

    // Transfers square the round.
    let paid: Decimal = settlement.transfers().iter().map(|t| t.amount).sum();
    assert_eq!(paid, settlement.ledger().total_won());
}

/// Tee choice changes which holes receive strokes.
#[test]
fn tee_selects_stroke_index() {
    let make = |tee: &str| {
        let players = vec![
            Player::new(PlayerId::new("a"), "A", 1).unwrap(),
            Player::new(PlayerId::new("b"), "B", 0).unwrap(),
        ];
        let betting = BettingOptions::new().with(Wager::match_play(dec!(1))).unwrap();
        Round::new(&nine_hole_course(), 9, Tee::new(tee), players, betting).unwrap()
    };

    // Hole 2 is index 1 from the white tee and index 18 from the red.
    let white = make("white")
        .record_score(&PlayerId::new("a"), 2, 5)
        .unwrap();
    let red = make("red").record_score(&PlayerId::new("a"), 2, 5).unwrap();

    let a = PlayerId::new("a");
    assert_eq!(white.player(&a).unwrap().score(2).unwrap().net(), 4);
    assert_eq!(red.player(&a).unwrap().score(2).unwrap().net(), 5);
}

/// Stroke play tie from the handicap scenario: nobody moves money.
#[test]
fn stroke_play_handicap_tie() {
    let tee = Tee::new("white");
    let hole = Hole::new(1, 4).unwrap().with_stroke_index(tee.clone(), 5).unwrap();

    let a = Player::new(PlayerId::new("a"), "A", 10).unwrap();
    let b = Player::new(PlayerId::new("b"), "B", 0).unwrap();
    let a_score = golf_settlement::core::score::Score::compute(&hole, &tee, 5, 10).unwrap();
    let b_score = golf_settlement::core::score::Score::compute(&hole, &tee, 4, 0).unwrap();
    assert_eq!(a_score.net(), 4);
    assert_eq!(b_score.net(), 4);

    let options = BettingOptions::new().with(Wager::stroke_play(dec!(10))).unwrap();
    let result = compute_hole_betting(
        &[a.with_score(a_score), b.with_score(b_score)],
        1,
        &hole,
        &options,
    )
    .unwrap();
    assert_eq!(result.delta(&PlayerId::new("a"), WagerFormat::StrokePlay), Decimal::ZERO);
    assert_eq!(result.delta(&PlayerId::new("b"), WagerFormat::StrokePlay), Decimal::ZERO);
}

/// Second pass of handicap strokes.
#[test]
fn second_stroke_allocation() {
    let net = compute_net_score(6, 25, 7).unwrap();
    assert_eq!(net.strokes_received, 2);
    assert_eq!(net.net_score, 4);
}

/// One of two players scored: settlement of the hole is refused.
#[test]
fn partial_hole_is_incomplete() {
    let tee = Tee::new("white");
    let hole = Hole::new(4, 3).unwrap().with_stroke_index(tee.clone(), 12).unwrap();
    let a = Player::new(PlayerId::new("a"), "A", 0).unwrap();
    let b = Player::new(PlayerId::new("b"), "B", 0).unwrap();
    let a = a.with_score(golf_settlement::core::score::Score::compute(&hole, &tee, 3, 0).unwrap());

    let options = BettingOptions::new().with(Wager::match_play(dec!(5))).unwrap();
    let err = compute_hole_betting(&[a, b], 4, &hole, &options).unwrap_err();
    assert_eq!(
        err,
        SettlementError::IncompleteData {
            hole: 4,
            player: PlayerId::new("b")
        }
    );
}

/// Fourball teams from JSON configuration.
#[test]
fn team_match_play_from_json() {
    let betting: BettingOptions = serde_json::from_str(
        r#"[
            { "format": "match_play", "stake": "5",
              "mode": { "teams": { "team_a": ["a", "b"], "team_b": ["c", "d"] } } },
            { "format": "stroke_play", "stake": "4", "ties": "push" }
        ]"#,
    )
    .unwrap();
    assert!(matches!(
        betting.get(WagerFormat::MatchPlay),
        Some(Wager::MatchPlay {
            mode: MatchPlayMode::Teams { .. },
            ..
        })
    ));
    assert!(matches!(
        betting.get(WagerFormat::StrokePlay),
        Some(Wager::StrokePlay {
            ties: TiePolicy::Push,
            ..
        })
    ));

    let players = ["a", "b", "c", "d"]
        .iter()
        .map(|id| Player::new(PlayerId::new(*id), id.to_uppercase(), 0).unwrap())
        .collect();
    let round = Round::new(&nine_hole_course(), 9, Tee::new("white"), players, betting).unwrap();
    let round = play(
        round,
        &[
            ("a", [4, 4, 3, 5, 4, 4, 3, 4, 5]),
            ("b", [6, 6, 4, 6, 6, 5, 4, 5, 6]),
            ("c", [5, 5, 4, 6, 5, 5, 4, 5, 6]),
            ("d", [5, 5, 4, 6, 5, 5, 4, 5, 6]),
        ],
    );
    let settlement = settle_round(&round).unwrap();

    // Team a/b's best ball beats c/d on all nine holes.
    for id in ["a", "b"] {
        assert_eq!(
            settlement.ledger().position(&PlayerId::new(id), WagerFormat::MatchPlay),
            dec!(45)
        );
    }
    // Player a wins stroke play outright on every hole: 3 opponents x 4 x 9.
    assert_eq!(
        settlement.ledger().position(&PlayerId::new("a"), WagerFormat::StrokePlay),
        dec!(108)
    );
    assert!(settlement.is_valid());
}

/// A team referencing someone outside the round is rejected up front.
#[test]
fn unknown_team_member_rejected() {
    let betting = BettingOptions::new()
        .with(Wager::MatchPlay {
            stake: dec!(1),
            mode: MatchPlayMode::Teams {
                team_a: vec![PlayerId::new("a")],
                team_b: vec![PlayerId::new("ghost")],
            },
        })
        .unwrap();
    let players = vec![Player::new(PlayerId::new("a"), "A", 0).unwrap()];
    assert!(matches!(
        Round::new(&nine_hole_course(), 9, Tee::new("white"), players, betting),
        Err(SettlementError::InvalidInput(_))
    ));
}

/// Settlement results serialize to JSON.
#[test]
fn settlement_serializes() {
    let round = generate_random_round(&RoundConfig {
        player_count: 3,
        hole_count: 9,
        ..Default::default()
    })
    .unwrap();
    let settlement = settle_round(&round).unwrap();

    let json = serde_json::to_string_pretty(&settlement).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("ledger").is_some());
    assert!(parsed.get("totals").is_some());
    assert_eq!(parsed["holes"].as_array().unwrap().len(), 9);
}

/// A completed round survives a JSON round trip as a historical record.
#[test]
fn completed_round_json() {
    let round = generate_random_round(&RoundConfig {
        player_count: 2,
        hole_count: 9,
        ..Default::default()
    })
    .unwrap();
    let (done, _) = round.complete(Utc::now()).unwrap();

    let json = serde_json::to_string(&done).unwrap();
    let back: Round = serde_json::from_str(&json).unwrap();
    assert_eq!(back, done);
    assert!(back.is_completed());
    assert!(matches!(
        back.record_score(&back.players()[0].id().clone(), 1, 4),
        Err(SettlementError::RoundCompleted(_))
    ));
}

/// A round edited by hand as JSON is refused at settlement, not trusted.
#[test]
fn edited_round_json_rejected() {
    let round = generate_random_round(&RoundConfig {
        player_count: 3,
        hole_count: 9,
        ..Default::default()
    })
    .unwrap();
    let json = serde_json::to_value(&round).unwrap();

    let mut edited = json.clone();
    edited["players"][1]["handicap"] = serde_json::json!(99);
    let bad: Round = serde_json::from_value(edited).unwrap();
    assert!(matches!(
        settle_round(&bad),
        Err(SettlementError::InvalidInput(_))
    ));

    let mut edited = json;
    let gross = edited["players"][0]["scores"]["2"]["gross"].as_u64().unwrap();
    edited["players"][0]["scores"]["2"]["net"] = serde_json::json!(gross + 1);
    let bad: Round = serde_json::from_value(edited).unwrap();
    assert!(matches!(
        settle_round(&bad),
        Err(SettlementError::InvalidInput(_))
    ));

    assert!(settle_round(&round).is_ok());
}
