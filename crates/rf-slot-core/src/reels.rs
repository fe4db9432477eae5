//! Reels and outcome generation
//!
//! Reels are not fixed strips: every spin draws three fresh reels. Each reel
//! is the first nine entries of a uniformly shuffled pool that holds every
//! symbol `weight` times, so symbol frequency tracks the weights while the
//! exact multiset changes from spin to spin.

use std::ops::Index;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{REEL_COUNT, REEL_LENGTH, VISIBLE_ROWS};
use crate::symbols::{total_weight, Symbol};

/// Symbol forced onto the middle row by a forced win
pub const FORCED_WIN_SYMBOL: Symbol = Symbol::Bell;

/// One reel: nine symbols, read with wrap-around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reel([Symbol; REEL_LENGTH]);

impl Reel {
    pub const fn new(symbols: [Symbol; REEL_LENGTH]) -> Self {
        Self(symbols)
    }

    /// A reel holding one symbol in every position
    pub const fn uniform(symbol: Symbol) -> Self {
        Self([symbol; REEL_LENGTH])
    }

    /// Symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> Symbol {
        self.0[position % REEL_LENGTH]
    }

    /// The three symbols visible when the reel rests at `stop`
    pub fn visible(&self, stop: usize) -> [Symbol; VISIBLE_ROWS] {
        let base = stop % REEL_LENGTH;
        std::array::from_fn(|row| self.symbol_at(base + row))
    }

    pub fn symbols(&self) -> &[Symbol; REEL_LENGTH] {
        &self.0
    }

    pub fn len(&self) -> usize {
        REEL_LENGTH
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Occurrences of a symbol on this reel
    pub fn count(&self, symbol: Symbol) -> usize {
        self.0.iter().filter(|&&s| s == symbol).count()
    }
}

impl Index<usize> for Reel {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Symbol {
        &self.0[index]
    }
}

/// The three reels of one spin
pub type ReelSet = [Reel; REEL_COUNT];

/// Weighted pool: every symbol repeated `weight` times, in catalog order
pub fn weighted_pool() -> Vec<Symbol> {
    let mut pool = Vec::with_capacity(total_weight() as usize);
    for symbol in Symbol::ALL {
        for _ in 0..symbol.weight() {
            pool.push(symbol);
        }
    }
    pool
}

/// Generate one reel by pool-and-shuffle
pub fn generate_reel<R: Rng + ?Sized>(rng: &mut R) -> Reel {
    let mut pool = weighted_pool();
    pool.shuffle(rng);
    Reel(std::array::from_fn(|i| pool[i]))
}

/// Generate three independent reels
pub fn generate_reel_set<R: Rng + ?Sized>(rng: &mut R) -> ReelSet {
    std::array::from_fn(|_| generate_reel(&mut *rng))
}

/// Reel set shown before the first spin: every reel in catalog order
pub fn initial_reel_set() -> ReelSet {
    [Reel(Symbol::ALL); REEL_COUNT]
}

/// Deterministic reel set for a forced win
///
/// At stop position 0 the middle row is all [`FORCED_WIN_SYMBOL`] while the
/// top and bottom rows mismatch, giving exactly one row win.
pub fn forced_win_reel_set() -> ReelSet {
    use crate::symbols::Symbol::*;
    [
        Reel([Seven, Bell, Cherry, Banana, Melon, Lemon, Bar, Orange, Plum]),
        Reel([Bar, Bell, Lemon, Orange, Plum, Cherry, Seven, Banana, Melon]),
        Reel([Melon, Bell, Plum, Cherry, Seven, Banana, Lemon, Bar, Orange]),
    ]
}

/// Reel set for a forced jackpot: the top symbol in every cell
pub fn forced_jackpot_reel_set() -> ReelSet {
    [Reel::uniform(Symbol::TOP); REEL_COUNT]
}
