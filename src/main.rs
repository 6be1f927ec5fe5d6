use battleship_link::{
    coord_label, init_logging, parse_coord_label, Cell, Grid, SessionConfig, SideId, TurnState,
    BOARD_SIZE, DEFAULT_ADDRESS, DEFAULT_PORT, SHIPS,
};
use battleship_link::presenter::{ConnectionEvent, Presenter};
use battleship_link::session::{MatchSnapshot, Session, SessionHandle};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Two-player battleship over a direct TCP link", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Display name announced to the opponent.
    #[arg(long, global = true, default_value = "Player")]
    name: String,

    #[arg(long, global = true, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,

    /// Seconds per turn before it is forfeited.
    #[arg(long, global = true, default_value_t = battleship_link::TURN_TICKS)]
    turn_seconds: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the computer on this machine.
    Local,
    /// Host a networked game and wait for an opponent.
    Host {
        #[arg(long, default_value_t = DEFAULT_PORT as u32)]
        port: u32,
    },
    /// Join a game hosted elsewhere.
    Join {
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        address: String,
        #[arg(long, default_value_t = DEFAULT_PORT as u32)]
        port: u32,
    },
}

/// Prints session callbacks to stdout.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn on_chat_line(&mut self, text: &str) {
        println!("{}", text);
    }

    fn on_grid_changed(&mut self, _side: SideId, _grid: &Grid) {}

    fn on_turn_changed(&mut self, turn: TurnState) {
        match turn {
            TurnState::LocalTurn => println!("== YOUR TURN =="),
            TurnState::RemoteTurn => println!("== OPPONENT'S TURN =="),
            TurnState::GameOver => println!("== GAME OVER =="),
            _ => {}
        }
    }

    fn on_time_remaining(&mut self, seconds: u32) {
        if seconds <= 3 || seconds % 5 == 0 {
            println!("{}s left", seconds);
        }
    }

    fn on_game_over(&mut self, winner: Option<SideId>) {
        match winner {
            Some(SideId::Local) => println!("VICTORY! You have sunk all enemy ships!"),
            Some(SideId::Opponent) => println!("DEFEAT. Your fleet is at the bottom of the sea."),
            None => println!("Game aborted."),
        }
    }

    fn on_connection_status(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected { peer: Some(peer) } => println!("Connected to {}", peer),
            ConnectionEvent::Failed(reason) => println!("Connection failed: {}", reason),
            _ => {}
        }
    }
}

enum Input {
    Start,
    Place { row: usize, col: usize, horizontal: bool },
    Auto,
    Fire { row: usize, col: usize },
    Chat(String),
    Restart,
    Swap,
    Board,
    Disconnect,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let input = match word.to_ascii_lowercase().as_str() {
        "start" => Input::Start,
        "auto" => Input::Auto,
        "restart" => Input::Restart,
        "swap" => Input::Swap,
        "board" => Input::Board,
        "disconnect" => Input::Disconnect,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "say" | "chat" => Input::Chat(rest.to_string()),
        "fire" | "f" => {
            let (row, col) =
                parse_coord_label(rest).ok_or_else(|| format!("Invalid coordinate '{}'", rest))?;
            Input::Fire { row, col }
        }
        "place" | "p" => {
            let mut parts = rest.split_whitespace();
            let cell = parts.next().unwrap_or("");
            let (row, col) =
                parse_coord_label(cell).ok_or_else(|| format!("Invalid coordinate '{}'", cell))?;
            let horizontal = match parts.next().map(|s| s.to_ascii_lowercase()) {
                None => true,
                Some(o) if o == "h" || o == "horizontal" => true,
                Some(o) if o == "v" || o == "vertical" => false,
                Some(o) => return Err(format!("Invalid orientation '{}', use h or v", o)),
            };
            Input::Place { row, col, horizontal }
        }
        _ => return Err(format!("Unknown command '{}'. Type help for a list.", word)),
    };
    Ok(input)
}

fn print_help() {
    println!("Commands:");
    println!("  start                 host: start the game / local: play the computer");
    println!("  place <E4> [h|v]      place your next ship with its head at E4");
    println!("  auto                  place the remaining ships randomly");
    println!("  fire <E4>             fire at a cell of the enemy grid");
    println!("  say <text>            chat with your opponent");
    println!("  board                 show both grids");
    println!("  swap                  toggle between your grid and the target grid");
    println!("  restart               ask for (or agree to) a new game");
    println!("  disconnect | quit");
    println!("Ships: {}", SHIPS.iter().map(|s| format!("{} ({})", s.name(), s.length())).collect::<Vec<_>>().join(", "));
}

fn cell_char(cell: Cell, reveal: bool) -> char {
    match cell {
        Cell::Hit => 'X',
        Cell::Miss => 'o',
        Cell::Occupied if reveal => 'S',
        _ => '.',
    }
}

fn print_grids(snap: &MatchSnapshot) {
    let own = snap.local_grid.to_cells();
    let target = snap.opponent_grid.to_public_cells();
    let size = BOARD_SIZE as usize;
    let header: String = (0..size).map(|c| format!(" {}", (b'A' + c as u8) as char)).collect();
    println!("   YOUR FLEET{:width$}   TARGET", "", width = size * 2 - 10);
    println!("  {}     {}", header, header);
    for r in 0..size {
        let left: String = own[r].iter().map(|&c| format!(" {}", cell_char(c, true))).collect();
        let right: String = target[r].iter().map(|&c| format!(" {}", cell_char(c, false))).collect();
        println!("{:2}{}   {:2}{}", r + 1, left, r + 1, right);
    }
    let view = if snap.showing_own_grid { "your fleet" } else { "target grid" };
    println!(
        "Turn: {:?} | viewing {} | wins {} losses {}",
        snap.turn, view, snap.tally.wins, snap.tally.losses
    );
}

async fn drive(handle: SessionHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let input = match parse_input(&line) {
            Ok(i) => i,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match input {
            Input::Start => handle.start()?,
            Input::Place { row, col, horizontal } => {
                log::debug!("placing at {}", coord_label(row, col));
                handle.place_ship(row, col, horizontal)?
            }
            Input::Auto => handle.auto_place()?,
            Input::Fire { row, col } => handle.fire(row, col)?,
            Input::Chat(text) => handle.chat(text)?,
            Input::Restart => handle.restart()?,
            Input::Swap => handle.swap_view()?,
            Input::Board => print_grids(&handle.snapshot()),
            Input::Disconnect => handle.disconnect()?,
            Input::Help => print_help(),
            Input::Quit => break,
        }
    }
    handle.shutdown()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = SessionConfig::new(cli.name)
        .map_err(|e| anyhow::anyhow!(e))?
        .with_seed(cli.seed)
        .with_turn_ticks(cli.turn_seconds);
    if let Some(s) = cli.seed {
        println!("Using fixed seed: {} (game will be reproducible)", s);
    }

    let (handle, task) = Session::spawn(config, ConsolePresenter);
    match cli.command {
        Commands::Local => {
            println!("Starting a local game against the computer...");
            handle.start()?;
        }
        Commands::Host { port } => handle.host(port)?,
        Commands::Join { address, port } => handle.join(address, port)?,
    }
    print_help();

    drive(handle).await?;
    // give the session a moment to send DISCONNECT
    let _ = tokio::time::timeout(Duration::from_secs(2), task).await;
    Ok(())
}
