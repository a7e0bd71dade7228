use std::fmt;

use serde::{Deserialize, Serialize};

/// Badge earned from a user's best typing speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Krill,
    Clownfish,
    Tuna,
    Swordfish,
    Whale,
}

impl Rank {
    pub fn for_wpm(wpm: f64) -> Self {
        if wpm >= 120.0 {
            Rank::Whale
        } else if wpm >= 90.0 {
            Rank::Swordfish
        } else if wpm >= 60.0 {
            Rank::Tuna
        } else if wpm >= 30.0 {
            Rank::Clownfish
        } else {
            Rank::Krill
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Krill => "Krill",
            Rank::Clownfish => "Clownfish",
            Rank::Tuna => "Tuna",
            Rank::Swordfish => "Swordfish",
            Rank::Whale => "Whale",
        }
    }

    /// WPM needed for the next rank, if any.
    pub fn next_threshold(self) -> Option<f64> {
        match self {
            Rank::Krill => Some(30.0),
            Rank::Clownfish => Some(60.0),
            Rank::Tuna => Some(90.0),
            Rank::Swordfish => Some(120.0),
            Rank::Whale => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(Rank::for_wpm(0.0), Rank::Krill);
        assert_eq!(Rank::for_wpm(29.9), Rank::Krill);
        assert_eq!(Rank::for_wpm(30.0), Rank::Clownfish);
        assert_eq!(Rank::for_wpm(60.0), Rank::Tuna);
        assert_eq!(Rank::for_wpm(90.0), Rank::Swordfish);
        assert_eq!(Rank::for_wpm(120.0), Rank::Whale);
        assert_eq!(Rank::for_wpm(400.0), Rank::Whale);
    }

    #[test]
    fn test_next_threshold_matches_boundaries() {
        let mut rank = Rank::Krill;
        while let Some(wpm) = rank.next_threshold() {
            let next = Rank::for_wpm(wpm);
            assert!(next > rank);
            rank = next;
        }
        assert_eq!(rank, Rank::Whale);
    }
}
