//! Runs parsed commands against a game session, waiting out the settle
//! time between each `begin_*` and `commit_*`.

use anyhow::Error;
use log::{debug, warn};
use std::{io::Write, sync::Arc, time::Duration};
use tokio::time::sleep;
use wager_engine::{
    EngineConfig,
    entropy::{DeckApiSource, DeckSource, DiceRoll, LocalDeckSource, RandomDice},
    game::{
        DiceClimbGame, DiceOutcome, GameError, GameSession, HighCardGame, RevealStart,
        RoundOutcome, WagerSession,
    },
    ledger::{GameKind, Ledger},
};

use crate::{
    commands::{COMMANDS_HELP, Command},
    config::CliConfig,
};

/// How long each reveal takes to settle before it is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimings {
    pub reveal: Duration,
    pub die: Duration,
    pub gap: Duration,
}

impl SettleTimings {
    /// No waiting, for scripted play
    pub const fn instant() -> Self {
        Self {
            reveal: Duration::ZERO,
            die: Duration::ZERO,
            gap: Duration::ZERO,
        }
    }
}

impl From<&EngineConfig> for SettleTimings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            reveal: config.reveal_settle,
            die: config.die_settle,
            gap: config.die_gap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Build the session for the configured game.
///
/// # Errors
///
/// Returns error if the deck service client cannot be built
pub fn build_session(config: &CliConfig, ledger: Arc<dyn Ledger>) -> Result<GameSession, Error> {
    let session = match config.game {
        GameKind::HighCard => {
            let deck_source: Arc<dyn DeckSource> = if config.local_deck {
                Arc::new(LocalDeckSource::new())
            } else {
                Arc::new(DeckApiSource::from_config(&config.engine)?)
            };
            HighCardGame::new(config.player_id, ledger, deck_source).into()
        }
        GameKind::DiceClimb => {
            DiceClimbGame::new(config.player_id, ledger, Box::new(RandomDice::new())).into()
        }
    };
    Ok(session)
}

pub struct Driver<W> {
    session: GameSession,
    ledger: Arc<dyn Ledger>,
    settle: SettleTimings,
    out: W,
}

impl<W: Write> Driver<W> {
    pub fn new(session: GameSession, ledger: Arc<dyn Ledger>, settle: SettleTimings, out: W) -> Self {
        Self {
            session,
            ledger,
            settle,
            out,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Leave the table. A round still in play is forfeited, and its record
    /// gets at most `grace` to land. Returns the streak held on leaving.
    pub async fn finish(self, grace: Duration) -> u32 {
        let streak = self.session.streak();
        if let Some(handle) = self.session.abandon() {
            match tokio::time::timeout(grace, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Forfeit record task failed: {e}"),
                Err(_) => warn!("Gave up waiting for the abandoned round to be recorded"),
            }
        }
        streak
    }

    /// Execute one command. Game errors are shown to the player and play
    /// continues; only output failures are returned.
    pub async fn execute(&mut self, command: Command) -> Result<Flow, Error> {
        match self.dispatch(command).await {
            Ok(flow) => Ok(flow),
            Err(e) => match e.downcast_ref::<GameError>() {
                Some(game_error) => {
                    debug!("{command:?} failed: {game_error}");
                    writeln!(self.out, "{}", game_error.client_message())?;
                    Ok(Flow::Continue)
                }
                None => Err(e),
            },
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Flow, Error> {
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => write!(self.out, "{COMMANDS_HELP}")?,
            Command::Balance => {
                let balance = self.session.refresh_balance().await?;
                writeln!(self.out, "Balance: {balance}")?;
            }
            Command::History(limit) => {
                let results = self
                    .ledger
                    .recent_results(self.session.player_id(), limit)
                    .await
                    .map_err(GameError::from)?;
                if results.is_empty() {
                    writeln!(self.out, "No results yet")?;
                }
                for record in results {
                    writeln!(
                        self.out,
                        "{}  {:<10}  payout {:>6}  streak {}",
                        record.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                        record.game,
                        record.payout,
                        record.streak
                    )?;
                }
            }
            Command::Status => {
                let s = &self.session;
                writeln!(
                    self.out,
                    "{} | {} | wager {} | pot {} | streak {} | balance {}",
                    s.game(),
                    s.phase_name(),
                    s.wager(),
                    s.pot(),
                    s.streak(),
                    s.balance()
                )?;
            }
            _ => {
                let Self {
                    session,
                    settle,
                    out,
                    ..
                } = self;
                match session {
                    GameSession::HighCard(game) => play_high_card(game, command, out, settle).await?,
                    GameSession::DiceClimb(game) => play_dice(game, command, out, settle).await?,
                }
            }
        }
        Ok(Flow::Continue)
    }
}

async fn play_high_card<W: Write>(
    game: &mut HighCardGame,
    command: Command,
    out: &mut W,
    settle: &SettleTimings,
) -> Result<(), Error> {
    match command {
        Command::Bet(wager) => {
            if let Some(reference) = game.start_round(wager).await? {
                writeln!(
                    out,
                    "Wager {wager} placed, each win pays {}. Card: {reference}. Higher or lower?",
                    game.increment()
                )?;
            }
        }
        Command::Guess(prediction) => match game.begin_reveal(prediction).await? {
            Some(RevealStart::Pending(pending)) => {
                sleep(settle.reveal).await;
                let drawn = pending.drawn();
                if let Some(outcome) = game.commit_reveal(pending).await? {
                    if outcome.won {
                        writeln!(out, "Drew {drawn}. Correct! Pot: {}", outcome.pot)?;
                    } else {
                        writeln!(out, "Drew {drawn}. Wrong call, the pot is lost.")?;
                    }
                    if let Some(end) = outcome.round_end {
                        show_round_end(out, end, game.balance())?;
                    }
                }
            }
            Some(RevealStart::RoundEnded(end)) => show_round_end(out, end, game.balance())?,
            None => {}
        },
        Command::Retire => {
            if let Some(end) = game.retire().await? {
                show_round_end(out, end, game.balance())?;
            }
        }
        Command::NewRound => {
            if game.new_round()? {
                writeln!(out, "New round. Place your bet.")?;
            }
        }
        other => writeln!(out, "{other:?} is not a high card command")?,
    }
    Ok(())
}

fn show_round_end<W: Write>(out: &mut W, end: RoundOutcome, balance: i64) -> Result<(), Error> {
    match end {
        RoundOutcome::Lost => writeln!(out, "Round over. Type 'new' to play again.")?,
        RoundOutcome::Retired { payout } => {
            writeln!(out, "Retired with {payout}. Balance: {balance}")?;
        }
        RoundOutcome::DeckExhausted { payout: 0 } => {
            writeln!(out, "The deck ran out. Type 'new' to play again.")?;
        }
        RoundOutcome::DeckExhausted { payout } => {
            writeln!(out, "The deck ran out, {payout} paid out. Balance: {balance}")?;
        }
    }
    Ok(())
}

async fn play_dice<W: Write>(
    game: &mut DiceClimbGame,
    command: Command,
    out: &mut W,
    settle: &SettleTimings,
) -> Result<(), Error> {
    match command {
        Command::Bet(wager) => {
            if let Some(pot) = game.confirm_bet(wager).await? {
                writeln!(out, "Wager {wager} placed. Pot: {pot}. Roll when ready.")?;
            }
        }
        Command::Roll => {
            if let Some(pending) = game.begin_roll()? {
                show_dice(out, settle, "You", pending.roll()).await?;
                if let Some(outcome) = game.commit_roll(pending).await? {
                    writeln!(out, "Your total: {}", outcome.player_total)?;
                    if let Some(end) = outcome.round_end {
                        show_dice_end(out, end, game.pot())?;
                    }
                }
            }
        }
        Command::Pass => {
            if let Some(bank) = game.begin_stand()? {
                for &roll in bank.rolls() {
                    show_dice(out, settle, "Bank", roll).await?;
                }
                writeln!(out, "Bank total: {}", bank.total())?;
                if let Some(end) = game.commit_stand(bank).await? {
                    show_dice_end(out, end, game.pot())?;
                }
            }
        }
        Command::CashOut => {
            if let Some(payout) = game.cash_out().await? {
                writeln!(out, "Cashed out {payout}. Balance: {}", game.balance())?;
            }
        }
        Command::Double => {
            if game.double_and_continue()? {
                writeln!(out, "Pot doubled to {}. Roll again from zero.", game.pot())?;
            }
        }
        Command::NewRound => {
            if game.new_bet()? {
                writeln!(out, "Place a new bet.")?;
            }
        }
        other => writeln!(out, "{other:?} is not a dice climb command")?,
    }
    Ok(())
}

/// Reveal a roll die by die: the first settles, then the second is thrown.
async fn show_dice<W: Write>(
    out: &mut W,
    settle: &SettleTimings,
    who: &str,
    roll: DiceRoll,
) -> Result<(), Error> {
    sleep(settle.die).await;
    writeln!(out, "{who} rolled {}", roll.first())?;
    sleep(settle.gap + settle.die).await;
    writeln!(out, "{who} rolled {} ({roll})", roll.second())?;
    Ok(())
}

fn show_dice_end<W: Write>(out: &mut W, end: DiceOutcome, pot: i64) -> Result<(), Error> {
    if end.is_win() {
        writeln!(out, "You {end}! Pot: {pot}. 'cash' to collect or 'double' to risk it.")?;
    } else {
        writeln!(out, "You {end}. Type 'new' to bet again.")?;
    }
    Ok(())
}
