//! Two scripted peers play one full match through the real wire protocol
//! over an in-memory link, then a one-line JSON summary is printed.

use std::time::Duration;

use battleship_link::link::LinkAttachment;
use battleship_link::presenter::NullPresenter;
use battleship_link::session::{Session, SessionHandle};
use battleship_link::transport::in_memory::InMemoryTransport;
use battleship_link::{choose_target, MatchOutcome, Role, SessionConfig, TurnState, SHIPS};
use clap::Parser;
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

#[derive(Parser)]
#[command(about = "Bot vs bot match over an in-memory link")]
struct Args {
    seed1: u64,
    seed2: u64,
    /// Tick length in milliseconds.
    #[arg(long, default_value_t = 5)]
    tick_ms: u64,
}

struct BotReport {
    outcome: Option<MatchOutcome>,
    shots: usize,
    tally: battleship_link::Tally,
}

async fn play(handle: SessionHandle, seed: u64) -> anyhow::Result<BotReport> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let lengths: Vec<usize> = SHIPS.iter().map(|s| s.length()).collect();

    handle
        .wait_until(|s| s.epoch >= 1 && s.turn == TurnState::Placing)
        .await?;
    handle.auto_place()?;

    let mut shots = 0;
    loop {
        let snap = handle
            .wait_until(|s| s.can_fire || s.turn == TurnState::GameOver || !s.connected)
            .await?;
        if snap.turn == TurnState::GameOver || !snap.connected {
            return Ok(BotReport {
                outcome: snap.outcome,
                shots,
                tally: snap.tally,
            });
        }
        let fired_before = snap.opponent_grid.hit_count() + snap.opponent_grid.miss_count();
        let (row, col) = choose_target(&snap.opponent_grid, &lengths, &mut rng)
            .ok_or_else(|| anyhow::anyhow!("no cell left to fire at"))?;
        handle.fire(row, col)?;
        shots += 1;
        handle
            .wait_until(|s| {
                s.opponent_grid.hit_count() + s.opponent_grid.miss_count() > fired_before
                    || s.turn != TurnState::LocalTurn
            })
            .await?;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    battleship_link::init_logging();
    let args = Args::parse();

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let host_cfg = SessionConfig::new("host")
        .map_err(|e| anyhow::anyhow!(e))?
        .with_tick(tick)
        .with_pre_battle_ticks(1)
        .with_turn_ticks(200)
        .with_seed(Some(args.seed1));
    let client_cfg = SessionConfig::new("client")
        .map_err(|e| anyhow::anyhow!(e))?
        .with_tick(tick)
        .with_pre_battle_ticks(1)
        .with_turn_ticks(200)
        .with_seed(Some(args.seed2));

    let (host, host_task) = Session::spawn(host_cfg, NullPresenter);
    let (client, client_task) = Session::spawn(client_cfg, NullPresenter);

    let (t1, t2) = InMemoryTransport::pair();
    host.attach(LinkAttachment::start(Role::Host, t1))?;
    client.attach(LinkAttachment::start(Role::Client, t2))?;
    host.wait_until(|s| s.connected).await?;
    host.start()?;

    let (r1, r2) = tokio::try_join!(play(host.clone(), args.seed1), play(client.clone(), args.seed2))?;

    host.shutdown()?;
    client.shutdown()?;
    let _ = tokio::join!(host_task, client_task);

    let winner = match (r1.outcome, r2.outcome) {
        (Some(MatchOutcome::Won), _) => Some("host"),
        (_, Some(MatchOutcome::Won)) => Some("client"),
        _ => None,
    };
    let result = json!({
        "host": {"outcome": r1.outcome, "shots": r1.shots, "tally": r1.tally},
        "client": {"outcome": r2.outcome, "shots": r2.shots, "tally": r2.tally},
        "winner": winner,
    });
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
