//! End-to-end dice climb rounds with scripted dice and an in-memory ledger.

use std::sync::Arc;
use uuid::Uuid;
use wager_engine::{
    entropy::{DiceRoll, FixedDice},
    game::{
        DiceClimbGame, DiceLoss, DiceOutcome, DicePhase, DiceWin, GameError, RollOutcome,
        WagerSession,
    },
    ledger::{GameKind, InMemoryLedger, Ledger, PlayerId},
};

fn table(faces: &[u8], balance: i64) -> (DiceClimbGame, Arc<InMemoryLedger>, PlayerId) {
    let player = Uuid::new_v4();
    let ledger = Arc::new(InMemoryLedger::new().with_account(player, balance));
    let game = DiceClimbGame::new(
        player,
        ledger.clone(),
        Box::new(FixedDice::new(faces.iter().copied())),
    );
    (game, ledger, player)
}

async fn roll(game: &mut DiceClimbGame) -> RollOutcome {
    let pending = game.begin_roll().unwrap().unwrap();
    game.commit_roll(pending).await.unwrap().unwrap()
}

async fn stand(game: &mut DiceClimbGame) -> DiceOutcome {
    let pending = game.begin_stand().unwrap().unwrap();
    game.commit_stand(pending).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_scenario_free_round_twenty_one_then_cash_out() {
    let (mut game, ledger, player) = table(&[5, 6, 4, 6], 50);

    assert_eq!(game.confirm_bet(0).await.unwrap(), Some(1));
    assert_eq!(roll(&mut game).await.round_end, None);
    let last = roll(&mut game).await;
    assert_eq!(last.player_total, 21);
    assert_eq!(last.round_end, Some(DiceOutcome::Won(DiceWin::TwentyOne)));
    assert!(game.bank_rolls().is_empty());

    assert_eq!(game.cash_out().await.unwrap(), Some(1));
    assert_eq!(ledger.get_balance(player).await.unwrap(), 51);
    assert_eq!(game.streak(), 1);
    assert_eq!(game.phase(), DicePhase::AwaitingBet);

    let results = ledger.results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].game, GameKind::DiceClimb);
    assert_eq!(results[0].payout, 1);
    assert_eq!(results[0].streak, 1);
}

#[tokio::test]
async fn test_bet_debits_wager() {
    let (mut game, ledger, player) = table(&[1], 50);
    assert_eq!(game.confirm_bet(20).await.unwrap(), Some(40));
    assert_eq!(ledger.get_balance(player).await.unwrap(), 30);
    assert_eq!(game.wager(), 20);
}

#[tokio::test]
async fn test_wager_above_balance_rejected() {
    let (mut game, ledger, player) = table(&[1], 50);
    assert!(matches!(
        game.confirm_bet(51).await,
        Err(GameError::InvalidWager { .. })
    ));
    assert_eq!(game.phase(), DicePhase::AwaitingBet);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 50);
}

#[tokio::test]
async fn test_bust_forfeits_pot_and_records() {
    let (mut game, ledger, player) = table(&[6, 6, 6, 6], 50);
    game.confirm_bet(10).await.unwrap();
    roll(&mut game).await;
    let bust = roll(&mut game).await;

    assert_eq!(bust.player_total, 24);
    assert_eq!(bust.round_end, Some(DiceOutcome::Lost(DiceLoss::Bust)));
    assert_eq!(game.pot(), 0);
    assert_eq!(game.streak(), 0);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 40);

    let results = ledger.results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].payout, 0);
}

#[tokio::test]
async fn test_bank_bust_is_a_player_win() {
    // Player 12 + 8 = 20. Bank 12, then 10 more busts at 22.
    let (mut game, ledger, player) = table(&[6, 6, 4, 4, 6, 6, 5, 5], 50);
    game.confirm_bet(10).await.unwrap();
    roll(&mut game).await;
    roll(&mut game).await;
    assert_eq!(game.player_total(), 20);

    let outcome = stand(&mut game).await;
    assert_eq!(outcome, DiceOutcome::Won(DiceWin::BankBust));
    assert_eq!(game.bank_total(), 22);
    assert_eq!(game.bank_rolls(), &[DiceRoll(6, 6), DiceRoll(5, 5)]);
    assert_eq!(game.streak(), 1);

    game.cash_out().await.unwrap();
    assert_eq!(ledger.get_balance(player).await.unwrap(), 60);
}

#[tokio::test]
async fn test_bank_tie_goes_to_bank() {
    // Player 6+3 = 9, bank 4+5 = 9.
    let (mut game, ledger, player) = table(&[6, 3, 4, 5], 50);
    game.confirm_bet(5).await.unwrap();
    roll(&mut game).await;

    let outcome = stand(&mut game).await;
    assert_eq!(outcome, DiceOutcome::Lost(DiceLoss::BankReached));
    assert_eq!(game.bank_total(), game.player_total());
    assert_eq!(game.bank_rolls().len(), 1);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 45);
}

#[tokio::test]
async fn test_double_and_continue_skips_debit() {
    let (mut game, ledger, player) = table(&[5, 6, 4, 6], 50);
    game.confirm_bet(10).await.unwrap();
    roll(&mut game).await;
    roll(&mut game).await;
    assert_eq!(game.pot(), 20);

    assert!(game.double_and_continue().unwrap());
    assert_eq!(game.pot(), 40);
    assert_eq!(game.phase(), DicePhase::PlayerTurn);
    assert_eq!(game.player_total(), 0);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 40);

    roll(&mut game).await;
    roll(&mut game).await;
    assert_eq!(game.streak(), 2);
    assert_eq!(game.cash_out().await.unwrap(), Some(40));
    assert_eq!(ledger.get_balance(player).await.unwrap(), 80);
}

#[tokio::test]
async fn test_new_bet_after_loss() {
    let (mut game, _, _) = table(&[6, 6, 6, 6], 50);
    game.confirm_bet(10).await.unwrap();
    roll(&mut game).await;
    roll(&mut game).await;

    assert!(game.new_bet().unwrap());
    assert_eq!(game.phase(), DicePhase::AwaitingBet);
    assert_eq!(game.wager(), 0);
    assert_eq!(game.pot(), 0);
    assert!(game.player_rolls().is_empty());
}

#[tokio::test]
async fn test_loss_records_streak_reached() {
    let (mut game, ledger, _) = table(&[5, 6, 4, 6, 6, 6, 6, 6], 50);
    game.confirm_bet(0).await.unwrap();
    roll(&mut game).await;
    roll(&mut game).await;
    game.cash_out().await.unwrap();

    game.confirm_bet(0).await.unwrap();
    roll(&mut game).await;
    let bust = roll(&mut game).await;
    assert_eq!(bust.round_end, Some(DiceOutcome::Lost(DiceLoss::Bust)));
    assert_eq!(game.streak(), 0);
    assert_eq!(game.best_streak(), 1);

    let results = ledger.results().await;
    assert!(results.iter().any(|r| r.payout == 0 && r.streak == 1));
}

#[tokio::test]
async fn test_duplicate_stand_produces_one_bank_turn() {
    let (mut game, _, _) = table(&[6, 6, 1, 1], 50);
    game.confirm_bet(0).await.unwrap();
    roll(&mut game).await;

    let pending = game.begin_stand().unwrap().unwrap();
    assert!(game.begin_stand().unwrap().is_none());
    assert!(game.begin_roll().unwrap().is_none());
    assert_eq!(game.phase(), DicePhase::BankTurn);

    game.commit_stand(pending).await.unwrap();
    assert!(matches!(game.phase(), DicePhase::RoundEnd(_)));
}

#[tokio::test]
async fn test_failed_cash_out_keeps_won_pot() {
    let (mut game, ledger, player) = table(&[5, 6, 4, 6], 50);
    game.confirm_bet(10).await.unwrap();
    roll(&mut game).await;
    roll(&mut game).await;

    ledger.set_fail_balance_writes(true);
    let err = game.cash_out().await.unwrap_err();
    assert!(err.is_source_unavailable());
    assert_eq!(game.pot(), 20);
    assert_eq!(game.phase(), DicePhase::RoundEnd(DiceOutcome::Won(DiceWin::TwentyOne)));

    ledger.set_fail_balance_writes(false);
    game.cash_out().await.unwrap();
    assert_eq!(ledger.get_balance(player).await.unwrap(), 60);
}

#[tokio::test]
async fn test_abandon_with_uncashed_win_forfeits() {
    let (mut game, ledger, player) = table(&[5, 6, 4, 6], 50);
    game.confirm_bet(10).await.unwrap();
    roll(&mut game).await;
    roll(&mut game).await;
    assert!(game.is_round_active());

    game.abandon().unwrap().await.unwrap();
    let results = ledger.results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].payout, 0);
    assert_eq!(results[0].streak, 1);
    assert_eq!(ledger.get_balance(player).await.unwrap(), 40);
}

#[test]
fn test_abandon_idle_session_spawns_nothing() {
    let player = Uuid::new_v4();
    let ledger = Arc::new(InMemoryLedger::new().with_account(player, 5));
    let game = DiceClimbGame::new(player, ledger, Box::new(FixedDice::new([1])));
    assert!(game.abandon().is_none());
}

#[tokio::test]
async fn test_cancelled_roll_is_not_counted() {
    let (mut game, _, _) = table(&[6, 6, 2, 3], 50);
    game.confirm_bet(0).await.unwrap();

    let pending = game.begin_roll().unwrap().unwrap();
    assert!(game.cancel_roll(pending));
    assert!(!game.is_locked());
    assert_eq!(game.player_total(), 0);

    let next = roll(&mut game).await;
    assert_eq!(next.roll, DiceRoll(2, 3));
    assert_eq!(next.player_total, 5);
}

#[tokio::test]
async fn test_cancelled_stand_returns_turn_to_player() {
    let (mut game, ledger, _) = table(&[6, 3, 4, 5], 50);
    game.confirm_bet(0).await.unwrap();
    roll(&mut game).await;

    let pending = game.begin_stand().unwrap().unwrap();
    assert!(game.cancel_stand(pending));
    assert_eq!(game.phase(), DicePhase::PlayerTurn);
    assert!(!game.is_locked());
    assert!(game.bank_rolls().is_empty());
    assert!(ledger.results().await.is_empty());
}

#[tokio::test]
async fn test_roll_from_another_session_is_ignored() {
    let (mut a, _, _) = table(&[1, 1], 50);
    let (mut b, _, _) = table(&[6, 6], 50);
    a.confirm_bet(0).await.unwrap();
    b.confirm_bet(0).await.unwrap();

    let from_a = a.begin_roll().unwrap().unwrap();
    let from_b = b.begin_roll().unwrap().unwrap();
    assert_eq!(b.commit_roll(from_a).await.unwrap(), None);
    assert!(b.is_locked());
    assert_eq!(b.player_total(), 0);

    let own = b.commit_roll(from_b).await.unwrap().unwrap();
    assert_eq!(own.roll, DiceRoll(6, 6));
    assert_eq!(own.player_total, 12);
    assert!(a.is_locked());
}
