//! Play the high card or dice climb game from a terminal against a
//! Postgres or in-memory points ledger.

use std::{io::BufRead, sync::Arc, thread, time::Duration};

use anyhow::Error;
use ctrlc::set_handler;
use log::{info, warn};
use pico_args::Arguments;
use tokio::sync::mpsc;
use wager_cli::{
    commands::{COMMANDS_HELP, parse_command},
    config::{CliConfig, CliOverrides, LedgerBackend},
    driver::{Driver, Flow, SettleTimings, build_session},
    logging,
};
use wager_engine::{
    db::Database,
    ledger::{InMemoryLedger, Ledger, PgLedger},
};

const HELP: &str = "\
Play a wagering mini-game against the points ledger

USAGE:
  wager_cli [OPTIONS]

OPTIONS:
  --game       GAME        high_card or dice_climb     [default: env WAGER_GAME or high_card]
  --player     UUID        Player to play as           [default: env PLAYER_ID or a new player]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --points     N           Balance for a new account   [default: env STARTING_POINTS or 0]

FLAGS:
  --memory                 Keep the ledger in memory (nothing is saved)
  --local-deck             Shuffle cards locally instead of using the deck service
  -h, --help               Print help information

ENVIRONMENT:
  DECK_API_URL             Deck service root
  REVEAL_SETTLE_MS         Card reveal settle time
  DIE_SETTLE_MS            Per-die settle time
  DIE_GAP_MS               Pause between the two dice
  (See .env file for all configuration options)
";

/// How long teardown waits for an abandoned round's record
const ABANDON_GRACE: Duration = Duration::from_secs(1);

/// Read stdin on its own thread so a pending read never holds up shutdown.
/// The channel closes at end of input.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {e}");
                    break;
                }
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        game: pargs.opt_value_from_str("--game")?,
        player_id: pargs.opt_value_from_str("--player")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory: pargs.contains("--memory"),
        starting_points: pargs.opt_value_from_str("--points")?,
        local_deck: pargs.contains("--local-deck"),
    };

    // Ctrl-C and SIGTERM stop the input loop; the round in play is then
    // abandoned like any other exit.
    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
    set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    logging::init();
    let config = CliConfig::from_env(overrides)?;

    let ledger: Arc<dyn Ledger> = match &config.ledger {
        LedgerBackend::Memory => {
            info!("Using an in-memory ledger");
            Arc::new(InMemoryLedger::new())
        }
        LedgerBackend::Postgres(db_config) => {
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            info!("Database connected successfully");
            Arc::new(PgLedger::new(db.pool().clone()).with_timeout(config.engine.ledger_timeout))
        }
    };

    let balance = ledger
        .ensure_account(config.player_id, config.engine.starting_points)
        .await?;
    info!(
        "Playing {} as {} with {balance} points",
        config.game, config.player_id
    );

    let mut session = build_session(&config, ledger.clone())?;
    session.refresh_balance().await?;
    let mut driver = Driver::new(
        session,
        ledger,
        SettleTimings::from(&config.engine),
        std::io::stdout(),
    );

    println!("{} | balance {balance}", config.game);
    print!("{COMMANDS_HELP}");

    let mut lines = spawn_stdin_reader();
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = stop_rx.recv() => {
                info!("Interrupted, leaving the table");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if driver.execute(command).await? == Flow::Quit {
            break;
        }
    }

    let streak = driver.finish(ABANDON_GRACE).await;
    info!("Session over, final streak {streak}");
    Ok(())
}
