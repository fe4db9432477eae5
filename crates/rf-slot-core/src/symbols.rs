//! Symbol catalog — payout multipliers and selection weights

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of distinct symbol kinds on the machine
pub const SYMBOL_COUNT: usize = 9;

/// A reel symbol
///
/// Rarer symbols pay more: `Seven` has the lowest weight and the highest
/// payout, `Cherry` the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Symbol {
    Seven = 0,
    Banana = 1,
    Melon = 2,
    Lemon = 3,
    Bar = 4,
    Bell = 5,
    Orange = 6,
    Plum = 7,
    Cherry = 8,
}

impl Symbol {
    /// Every symbol in catalog order
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        Symbol::Seven,
        Symbol::Banana,
        Symbol::Melon,
        Symbol::Lemon,
        Symbol::Bar,
        Symbol::Bell,
        Symbol::Orange,
        Symbol::Plum,
        Symbol::Cherry,
    ];

    /// Highest paying symbol
    pub const TOP: Symbol = Symbol::Seven;

    /// Payout multiplier for one matched symbol
    pub const fn payout(self) -> u32 {
        match self {
            Symbol::Seven => 50,
            Symbol::Bar => 20,
            Symbol::Bell => 15,
            Symbol::Melon => 10,
            Symbol::Banana => 8,
            Symbol::Orange => 6,
            Symbol::Plum => 5,
            Symbol::Lemon => 4,
            Symbol::Cherry => 3,
        }
    }

    /// Selection weight (copies of this symbol in the reel pool)
    pub const fn weight(self) -> u32 {
        match self {
            Symbol::Seven => 1,
            Symbol::Bar => 2,
            Symbol::Bell => 3,
            Symbol::Melon => 4,
            Symbol::Banana => 5,
            Symbol::Orange => 6,
            Symbol::Plum => 7,
            Symbol::Lemon => 8,
            Symbol::Cherry => 9,
        }
    }

    /// Lowercase display name
    pub const fn name(self) -> &'static str {
        match self {
            Symbol::Seven => "seven",
            Symbol::Banana => "banana",
            Symbol::Melon => "melon",
            Symbol::Lemon => "lemon",
            Symbol::Bar => "bar",
            Symbol::Bell => "bell",
            Symbol::Orange => "orange",
            Symbol::Plum => "plum",
            Symbol::Cherry => "cherry",
        }
    }

    /// Look up a symbol by its display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sum of all selection weights (size of the weighted reel pool)
pub fn total_weight() -> u32 {
    Symbol::ALL.iter().map(|s| s.weight()).sum()
}

/// One row of the printed paytable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaytableEntry {
    pub symbol: Symbol,
    /// Payout multiplier per symbol
    pub payout: u32,
    /// Raw pay for a full row (payout × 3), before multiplier and bet
    pub line_pay: u32,
    pub weight: u32,
    /// Chance of this symbol sitting at any single reel index
    pub cell_probability: f64,
}

/// Paytable sorted from highest to lowest payout
pub fn paytable_entries() -> Vec<PaytableEntry> {
    let pool = total_weight() as f64;
    let mut entries: Vec<PaytableEntry> = Symbol::ALL
        .iter()
        .map(|&symbol| PaytableEntry {
            symbol,
            payout: symbol.payout(),
            line_pay: symbol.payout() * 3,
            weight: symbol.weight(),
            // Each reel index is a uniform draw from the shuffled pool
            cell_probability: symbol.weight() as f64 / pool,
        })
        .collect();
    entries.sort_by(|a, b| b.payout.cmp(&a.payout));
    entries
}
