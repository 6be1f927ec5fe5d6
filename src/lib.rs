mod ai;
mod bitboard;
mod common;
mod config;
mod fire;
mod fleet;
mod game;
mod grid;
mod logging;
mod ship;
mod turn;

pub mod barrier;
pub mod link;
pub mod prelude;
pub mod presenter;
pub mod protocol;
pub mod restart;
pub mod session;
pub mod transport;

pub use ai::{calc_pdf, choose_target, sample_pdf, Pdf};
pub use bitboard::{BitBoard, BitBoardError, Bits};
pub use common::*;
pub use config::*;
pub use fire::{fire, resolve, ShotReport};
pub use fleet::Fleet;
pub use game::*;
pub use grid::Grid;
pub use logging::{init_logging, parse_level};
pub use ship::*;
pub use turn::*;
