//! State shared by every wager session: ledger access, the input lock and
//! the win streak.

use log::{debug, info, warn};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::task::JoinHandle;

use super::{
    errors::{GameError, GameResult},
    streak::StreakTracker,
};
use crate::ledger::{GameKind, Ledger, PlayerId, Points, ResultRecord};

/// Identifies the one transition a session is waiting to commit. Ids are
/// never reused within a process, so a token only matches the session that
/// issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TransitionId(u64);

static NEXT_TRANSITION: AtomicU64 = AtomicU64::new(0);

impl TransitionId {
    fn next() -> Self {
        Self(NEXT_TRANSITION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Parse wager input, truncating fractions toward zero. Empty input is a
/// zero wager.
///
/// # Errors
///
/// * `GameError::UnparsableWager` - not a number, negative, or not finite
pub fn parse_wager(input: &str) -> GameResult<Points> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| GameError::UnparsableWager(trimmed.to_string()))?;
    if !value.is_finite() || value < 0.0 || value >= Points::MAX as f64 {
        return Err(GameError::UnparsableWager(trimmed.to_string()));
    }
    Ok(value.trunc() as Points)
}

/// `0 <= wager <= balance`
pub fn validate_wager(wager: Points, balance: Points) -> GameResult<()> {
    if wager < 0 || wager > balance {
        return Err(GameError::InvalidWager { wager, balance });
    }
    Ok(())
}

pub(crate) struct SessionCore {
    pub(crate) game: GameKind,
    pub(crate) player_id: PlayerId,
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) streak: StreakTracker,
    balance: Points,
    pending: Option<TransitionId>,
}

impl SessionCore {
    pub(crate) fn new(game: GameKind, player_id: PlayerId, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            game,
            player_id,
            ledger,
            streak: StreakTracker::new(),
            balance: 0,
            pending: None,
        }
    }

    /// Last balance read from or written to the ledger.
    pub(crate) fn balance(&self) -> Points {
        self.balance
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.pending.is_some()
    }

    /// Gate input until the returned transition is accepted or released.
    pub(crate) fn lock(&mut self) -> TransitionId {
        let id = TransitionId::next();
        self.pending = Some(id);
        id
    }

    /// Drop a transition that failed before it could be committed.
    pub(crate) fn release(&mut self) {
        self.pending = None;
    }

    /// Consume the pending transition. False for anything not currently
    /// pending, which callers treat as a duplicate and ignore.
    pub(crate) fn accept(&mut self, id: TransitionId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            debug!(
                "Ignoring stale {} transition for {}",
                self.game, self.player_id
            );
            false
        }
    }

    pub(crate) async fn refresh_balance(&mut self) -> GameResult<Points> {
        let balance = self.ledger.get_balance(self.player_id).await?;
        self.balance = balance;
        Ok(balance)
    }

    /// Fresh read, then legality check against it.
    pub(crate) async fn check_wager(&mut self, wager: Points) -> GameResult<Points> {
        let balance = self.refresh_balance().await?;
        validate_wager(wager, balance)?;
        Ok(balance)
    }

    /// Escrow the wager. Re-reads the balance right before writing the
    /// computed total; a zero wager writes nothing.
    pub(crate) async fn debit(&mut self, wager: Points) -> GameResult<Points> {
        let current = self.check_wager(wager).await?;
        if wager == 0 {
            return Ok(current);
        }
        let new_balance = current - wager;
        self.ledger.set_balance(self.player_id, new_balance).await?;
        self.balance = new_balance;
        debug!(
            "{} debited {wager} from {} ({current} -> {new_balance})",
            self.game, self.player_id
        );
        Ok(new_balance)
    }

    pub(crate) async fn credit(&mut self, amount: Points) -> GameResult<Points> {
        let current = self.refresh_balance().await?;
        let new_balance = current.checked_add(amount).ok_or(GameError::PotOverflow)?;
        self.ledger.set_balance(self.player_id, new_balance).await?;
        self.balance = new_balance;
        info!(
            "{} credited {amount} to {} ({current} -> {new_balance})",
            self.game, self.player_id
        );
        Ok(new_balance)
    }

    /// Append a result row. Failures are logged and never undo a balance
    /// change that already happened.
    pub(crate) async fn record(&self, payout: Points, streak: u32) -> bool {
        let record = ResultRecord::new(self.game, self.player_id, payout, streak);
        match self.ledger.record_result(&record).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    "Failed to record {} result for {} (payout {payout}): {e}",
                    self.game, self.player_id
                );
                false
            }
        }
    }

    /// Forfeit an active round: reset the streak and record a zero payout
    /// in the background. Returns the write's handle when a runtime exists.
    pub(crate) fn forfeit_in_background(&mut self) -> Option<JoinHandle<()>> {
        let streak = self.streak.current();
        self.streak.reset();
        self.pending = None;

        let record = ResultRecord::new(self.game, self.player_id, 0, streak);
        let ledger = Arc::clone(&self.ledger);
        info!(
            "{} round abandoned by {}, recording forfeit",
            self.game, self.player_id
        );

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(async move {
                if let Err(e) = ledger.record_result(&record).await {
                    warn!(
                        "Failed to record abandoned {} round for {}: {e}",
                        record.game, record.player_id
                    );
                }
            })),
            Err(_) => {
                warn!(
                    "No runtime available to record abandoned {} round for {}",
                    self.game, self.player_id
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use uuid::Uuid;

    #[test]
    fn test_parse_wager_truncates() {
        assert_eq!(parse_wager("10").unwrap(), 10);
        assert_eq!(parse_wager(" 7.9 ").unwrap(), 7);
        assert_eq!(parse_wager("0.4").unwrap(), 0);
        assert_eq!(parse_wager("").unwrap(), 0);
    }

    #[test]
    fn test_parse_wager_rejects_garbage() {
        assert!(parse_wager("-1").is_err());
        assert!(parse_wager("ten").is_err());
        assert!(parse_wager("NaN").is_err());
        assert!(parse_wager("inf").is_err());
    }

    #[test]
    fn test_validate_wager() {
        assert!(validate_wager(0, 0).is_ok());
        assert!(validate_wager(100, 100).is_ok());
        assert!(matches!(
            validate_wager(101, 100),
            Err(GameError::InvalidWager {
                wager: 101,
                balance: 100
            })
        ));
        assert!(validate_wager(-1, 100).is_err());
    }

    #[test]
    fn test_lock_accepts_only_pending_transition() {
        let ledger = Arc::new(InMemoryLedger::new());
        let mut core = SessionCore::new(GameKind::HighCard, Uuid::new_v4(), ledger);
        let first = core.lock();
        assert!(core.is_locked());
        assert!(core.accept(first));
        assert!(!core.is_locked());
        assert!(!core.accept(first));

        let second = core.lock();
        assert_ne!(first, second);
        core.release();
        assert!(!core.accept(second));
    }

    #[test]
    fn test_token_from_another_session_is_refused() {
        let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new());
        let mut first = SessionCore::new(GameKind::HighCard, Uuid::new_v4(), ledger.clone());
        let mut second = SessionCore::new(GameKind::HighCard, Uuid::new_v4(), ledger);

        let foreign = first.lock();
        let own = second.lock();
        assert!(!second.accept(foreign));
        assert!(second.is_locked());
        assert!(second.accept(own));
        assert!(first.accept(foreign));
    }

    #[tokio::test]
    async fn test_debit_then_credit() {
        let player = Uuid::new_v4();
        let ledger = Arc::new(InMemoryLedger::new().with_account(player, 50));
        let mut core = SessionCore::new(GameKind::DiceClimb, player, ledger.clone());

        assert_eq!(core.debit(20).await.unwrap(), 30);
        assert_eq!(core.credit(40).await.unwrap(), 70);
        assert_eq!(ledger.get_balance(player).await.unwrap(), 70);
        assert_eq!(core.balance(), 70);
    }

    #[tokio::test]
    async fn test_zero_debit_writes_nothing() {
        let player = Uuid::new_v4();
        let ledger = Arc::new(InMemoryLedger::new().with_account(player, 5));
        let mut core = SessionCore::new(GameKind::DiceClimb, player, ledger.clone());
        assert_eq!(core.debit(0).await.unwrap(), 5);
        assert_eq!(ledger.balance_writes(), 0);
    }

    #[tokio::test]
    async fn test_record_failure_is_reported_not_raised() {
        let player = Uuid::new_v4();
        let ledger = Arc::new(InMemoryLedger::new().with_account(player, 5));
        ledger.set_fail_result_writes(true);
        let core = SessionCore::new(GameKind::HighCard, player, ledger);
        assert!(!core.record(3, 1).await);
    }
}
