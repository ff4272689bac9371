//! Place-based points and final standings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::round::Ranking;

/// Points awarded by finishing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTable {
    pub first_place: u32,
    pub second_place: u32,
    pub third_place: u32,
    /// Every position after third
    #[serde(default)]
    pub other_place: u32,
}

impl Default for PointTable {
    fn default() -> Self {
        Self {
            first_place: 3,
            second_place: 2,
            third_place: 1,
            other_place: 0,
        }
    }
}

impl PointTable {
    pub fn for_position(&self, index: usize) -> u32 {
        match index {
            0 => self.first_place,
            1 => self.second_place,
            2 => self.third_place,
            _ => self.other_place,
        }
    }

    /// Points must not increase with position.
    pub fn is_monotonic(&self) -> bool {
        self.first_place >= self.second_place
            && self.second_place >= self.third_place
            && self.third_place >= self.other_place
    }
}

/// Points for each ranked contestant, in ranking order.
pub fn award(ranking: &Ranking, table: &PointTable) -> Vec<(String, u32)> {
    ranking
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.participant.clone(), table.for_position(i)))
        .collect()
}

/// Every participant with their total, best first; ties keep participant order.
pub fn final_standings(totals: &HashMap<String, u64>, participants: &[String]) -> Vec<(String, u64)> {
    let mut standings: Vec<(String, u64)> = participants
        .iter()
        .map(|name| (name.clone(), totals.get(name).copied().unwrap_or(0)))
        .collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1));
    standings
}
