//! Scripted sessions through the command parser and driver.

use std::{sync::Arc, time::Duration};
use uuid::Uuid;
use wager_cli::{
    commands::parse_command,
    driver::{Driver, Flow, SettleTimings},
};
use wager_engine::{
    entropy::{Card, FixedDeckSource, FixedDice, Suit},
    game::{DiceClimbGame, GameSession, HighCardGame, WagerSession},
    ledger::{InMemoryLedger, Ledger, PlayerId},
};

fn high_card_driver(
    ranks: &[u8],
    balance: i64,
) -> (Driver<Vec<u8>>, Arc<InMemoryLedger>, PlayerId) {
    let player = Uuid::new_v4();
    let ledger = Arc::new(InMemoryLedger::new().with_account(player, balance));
    let source = Arc::new(FixedDeckSource::new(
        ranks.iter().map(|&rank| Card(rank, Suit::Diamond)),
    ));
    let session: GameSession = HighCardGame::new(player, ledger.clone(), source).into();
    let driver = Driver::new(session, ledger.clone(), SettleTimings::instant(), Vec::new());
    (driver, ledger, player)
}

fn dice_driver(faces: &[u8], balance: i64) -> (Driver<Vec<u8>>, Arc<InMemoryLedger>, PlayerId) {
    let player = Uuid::new_v4();
    let ledger = Arc::new(InMemoryLedger::new().with_account(player, balance));
    let dice = Box::new(FixedDice::new(faces.iter().copied()));
    let session: GameSession = DiceClimbGame::new(player, ledger.clone(), dice).into();
    let driver = Driver::new(session, ledger.clone(), SettleTimings::instant(), Vec::new());
    (driver, ledger, player)
}

async fn run(driver: &mut Driver<Vec<u8>>, script: &[&str]) -> Flow {
    let mut flow = Flow::Continue;
    for line in script {
        let command = parse_command(line).unwrap();
        flow = driver.execute(command).await.unwrap();
    }
    flow
}

fn output(driver: &Driver<Vec<u8>>) -> String {
    String::from_utf8_lossy(driver.output()).into_owned()
}

#[tokio::test]
async fn test_high_card_session() {
    let (mut driver, ledger, player) = high_card_driver(&[5, 5, 8, 11, 2], 100);

    run(&mut driver, &["bet 10", "higher", "h", "h", "retire"]).await;
    assert_eq!(ledger.get_balance(player).await.unwrap(), 120);

    let text = output(&driver);
    assert!(text.contains("Wager 10 placed"));
    assert!(text.contains("Pot: 30"));
    assert!(text.contains("Retired with 30"));
}

#[tokio::test]
async fn test_dice_session_with_double() {
    let (mut driver, ledger, player) = dice_driver(&[5, 6, 4, 6], 50);

    run(&mut driver, &["bet 0", "roll", "roll", "double", "roll", "roll", "cash"]).await;
    assert_eq!(ledger.get_balance(player).await.unwrap(), 52);
    assert_eq!(driver.session().streak(), 2);

    let text = output(&driver);
    assert!(text.contains("You rolled 5"));
    assert!(text.contains("You won with 21"));
    assert!(text.contains("Pot doubled to 2"));
    assert!(text.contains("Cashed out 2"));
}

#[tokio::test]
async fn test_dice_bank_turn_is_shown_roll_by_roll() {
    let (mut driver, _, _) = dice_driver(&[6, 3, 2, 2, 3, 3], 50);
    run(&mut driver, &["bet 5", "roll", "pass"]).await;

    let text = output(&driver);
    assert!(text.contains("Bank rolled 2"));
    assert!(text.contains("Bank total: 10"));
    assert!(text.contains("lost to the bank"));
}

#[tokio::test]
async fn test_game_errors_are_reported_not_raised() {
    let (mut driver, ledger, player) = high_card_driver(&[5, 9], 10);

    let flow = run(&mut driver, &["bet 50", "retire", "roll"]).await;
    assert_eq!(flow, Flow::Continue);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 10);

    let text = output(&driver);
    assert!(text.contains("invalid wager 50"));
    assert!(text.contains("can't retire while awaiting bet"));
    assert!(text.contains("Roll is not a high card command"));
}

#[tokio::test]
async fn test_history_and_balance() {
    let (mut driver, _, _) = dice_driver(&[6, 6, 6, 6], 30);
    run(&mut driver, &["history", "bet 10", "roll", "roll", "balance", "history 1"]).await;

    let text = output(&driver);
    assert!(text.contains("No results yet"));
    assert!(text.contains("Balance: 20"));
    assert!(text.contains("dice_climb"));
    assert!(text.contains("payout      0"));
}

#[tokio::test]
async fn test_quit_stops_the_loop() {
    let (mut driver, _, _) = dice_driver(&[1], 5);
    assert_eq!(run(&mut driver, &["status", "quit"]).await, Flow::Quit);
    assert!(output(&driver).contains("dice_climb | awaiting bet"));
}

#[tokio::test]
async fn test_leaving_mid_round_records_forfeit() {
    let (mut driver, ledger, player) = high_card_driver(&[5, 9, 2], 50);
    run(&mut driver, &["bet 10", "h"]).await;
    assert!(driver.session().is_round_active());

    driver.finish(Duration::from_secs(1)).await;

    let results = ledger.results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].player_id, player);
    assert_eq!(results[0].payout, 0);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 40);
}

#[tokio::test]
async fn test_leaving_between_rounds_records_nothing() {
    let (mut driver, ledger, _) = dice_driver(&[5, 6, 4, 6], 50);
    run(&mut driver, &["bet 0", "roll", "roll", "cash"]).await;

    assert_eq!(driver.finish(Duration::from_secs(1)).await, 1);
    assert_eq!(ledger.results().await.len(), 1);
}
