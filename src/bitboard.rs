//! One bit per cell of an N×N square, packed row-major into an integer.
//!
//! A [`Grid`](crate::grid::Grid) keeps three of these (ships, hits, misses)
//! so a cell query is a shift and a mask.

use core::fmt;
use core::ops::{BitAnd, BitOr, Not};
use num_traits::{PrimInt, Unsigned};

/// Backing integer for a [`BitBoard`].
pub trait Bits: PrimInt + Unsigned {
    const WIDTH: usize = core::mem::size_of::<Self>() * 8;
}

impl<T: PrimInt + Unsigned> Bits for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Row or column is `>= N`.
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::IndexOutOfBounds { row, col } => {
                write!(f, "Cell ({}, {}) is outside the bitboard", row, col)
            }
        }
    }
}

impl std::error::Error for BitBoardError {}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BitBoard<T: Bits, const N: usize> {
    bits: T,
}

impl<T: Bits, const N: usize> BitBoard<T, N> {
    const CELLS: usize = N * N;
    const FITS: () = assert!(N * N <= T::WIDTH, "board does not fit the backing integer");

    pub fn new() -> Self {
        let () = Self::FITS;
        Self { bits: T::zero() }
    }

    fn offset(row: usize, col: usize) -> Result<usize, BitBoardError> {
        if row < N && col < N {
            Ok(row * N + col)
        } else {
            Err(BitBoardError::IndexOutOfBounds { row, col })
        }
    }

    fn bit(&self, offset: usize) -> bool {
        !((self.bits >> offset) & T::one()).is_zero()
    }

    /// Every cell set, nothing past `N * N`.
    fn all() -> T {
        if Self::CELLS == T::WIDTH {
            T::max_value()
        } else {
            (T::one() << Self::CELLS) - T::one()
        }
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        Self::offset(row, col).map(|o| self.bit(o))
    }

    /// Like [`BitBoard::get`], reading off-board cells as unset.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        Self::offset(row, col).is_ok_and(|o| self.bit(o))
    }

    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        let o = Self::offset(row, col)?;
        self.bits = self.bits | (T::one() << o);
        Ok(())
    }

    pub fn clear(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        let o = Self::offset(row, col)?;
        self.bits = self.bits & !(T::one() << o);
        Ok(())
    }

    /// `(row, col)` of each set cell, row-major.
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..Self::CELLS)
            .filter(move |&o| self.bit(o))
            .map(|o| (o / N, o % N))
    }
}

impl<T: Bits, const N: usize> Default for BitBoard<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Bits, const N: usize> BitAnd for BitBoard<T, N> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self { bits: self.bits & rhs.bits }
    }
}

impl<T: Bits, const N: usize> BitOr for BitBoard<T, N> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self { bits: self.bits | rhs.bits }
    }
}

impl<T: Bits, const N: usize> Not for BitBoard<T, N> {
    type Output = Self;

    fn not(self) -> Self {
        Self { bits: !self.bits & Self::all() }
    }
}

impl<T: Bits, const N: usize> fmt::Debug for BitBoard<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}x{}> [", N, N)?;
        for row in 0..N {
            let line: String = (0..N)
                .map(|col| if self.contains(row, col) { '1' } else { '.' })
                .collect();
            writeln!(f, "  {}", line)?;
        }
        write!(f, "]")
    }
}
