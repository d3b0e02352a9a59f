//! Search statistics counters.

use std::fmt;

use itertools::Itertools;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// What the solver counts while it works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumCountMacro, EnumIter)]
pub enum Counter {
    /// Branches tried by the search driver.
    Guesses,
    /// Branches rewound after a contradiction.
    Backtracks,
    /// Speculative single-edge probes.
    Trials,
    /// Probes cut short by the dead-end cache.
    CacheHits,
    /// Edge pairs forced by area parity.
    AreaForcings,
}

/// A flat counter table indexed by [`Counter`].
#[derive(Debug, Default, Clone)]
pub struct Statistics {
    counts: [u64; Counter::COUNT],
}

impl Statistics {
    pub fn increment(&mut self, counter: Counter) {
        self.counts[counter as usize] += 1;
    }

    pub fn add(&mut self, counter: Counter, amount: u64) {
        self.counts[counter as usize] += amount;
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counts[counter as usize]
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = Counter::iter()
            .map(|counter| format!("{counter}: {}", self.get(counter)))
            .join(", ");
        f.write_str(&line)
    }
}
