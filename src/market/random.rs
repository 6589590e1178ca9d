use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed integers.
pub trait PriceRng {
    /// A value in `[low, high)`. An empty range yields `low`.
    fn next_in_range(&mut self, low: u32, high: u32) -> u32;
}

impl PriceRng for StdRng {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.gen_range(low..high)
    }
}

/// The single random stream shared by pattern generation and rest-day rolls.
#[derive(Resource, Debug, Clone)]
pub struct MarketRng(pub StdRng);

impl MarketRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Default for MarketRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl PriceRng for MarketRng {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        self.0.next_in_range(low, high)
    }
}

/// Replays a fixed list of draws, clamped into each requested range.
#[cfg(test)]
pub(crate) struct ScriptedRng {
    draws: std::collections::VecDeque<u32>,
}

#[cfg(test)]
impl ScriptedRng {
    pub(crate) fn new(draws: &[u32]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl PriceRng for ScriptedRng {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        let next = self.draws.pop_front().unwrap_or(low);
        next.clamp(low, high - 1)
    }
}
