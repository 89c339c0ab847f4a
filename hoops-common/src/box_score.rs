//! Per-side statistics ledger.
//!
//! A [`BoxScore`] is a fixed set of sixteen counters, addressed through the
//! closed [`StatKey`] enumeration. Counters never go below zero.

use core::ops::{Index, IndexMut};
use enum_iterator::{Sequence, all};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence)]
pub enum StatKey {
    FieldGoalsMade,
    FieldGoalsAttempted,
    ThreePointersMade,
    ThreePointersAttempted,
    FreeThrowsMade,
    FreeThrowsAttempted,
    Assists,
    OffensiveRebounds,
    DefensiveRebounds,
    TotalRebounds,
    Blocks,
    Steals,
    Turnovers,
    Fouls,
    TechnicalFouls,
    TimeoutsUsed,
}

impl StatKey {
    /// Name of the counter in the results payload, without the side prefix
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::FieldGoalsMade => "field_goals_made",
            Self::FieldGoalsAttempted => "field_goals_attempted",
            Self::ThreePointersMade => "three_pointers_made",
            Self::ThreePointersAttempted => "three_pointers_attempted",
            Self::FreeThrowsMade => "free_throws_made",
            Self::FreeThrowsAttempted => "free_throws_attempted",
            Self::Assists => "assists",
            Self::OffensiveRebounds => "offensive_rebounds",
            Self::DefensiveRebounds => "defensive_rebounds",
            Self::TotalRebounds => "total_rebounds",
            Self::Blocks => "blocks",
            Self::Steals => "steals",
            Self::Turnovers => "turnovers",
            Self::Fouls => "fouls",
            Self::TechnicalFouls => "technical_fouls",
            Self::TimeoutsUsed => "timeouts_used",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FieldGoalsMade => "FGM",
            Self::FieldGoalsAttempted => "FGA",
            Self::ThreePointersMade => "3PM",
            Self::ThreePointersAttempted => "3PA",
            Self::FreeThrowsMade => "FTM",
            Self::FreeThrowsAttempted => "FTA",
            Self::Assists => "AST",
            Self::OffensiveRebounds => "OREB",
            Self::DefensiveRebounds => "DREB",
            Self::TotalRebounds => "REB",
            Self::Blocks => "BLK",
            Self::Steals => "STL",
            Self::Turnovers => "TOV",
            Self::Fouls => "PF",
            Self::TechnicalFouls => "TF",
            Self::TimeoutsUsed => "TO",
        }
    }
}

impl core::fmt::Display for StatKey {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::FieldGoalsMade => write!(f, "Field Goals Made"),
            Self::FieldGoalsAttempted => write!(f, "Field Goals Attempted"),
            Self::ThreePointersMade => write!(f, "Three Pointers Made"),
            Self::ThreePointersAttempted => write!(f, "Three Pointers Attempted"),
            Self::FreeThrowsMade => write!(f, "Free Throws Made"),
            Self::FreeThrowsAttempted => write!(f, "Free Throws Attempted"),
            Self::Assists => write!(f, "Assists"),
            Self::OffensiveRebounds => write!(f, "Offensive Rebounds"),
            Self::DefensiveRebounds => write!(f, "Defensive Rebounds"),
            Self::TotalRebounds => write!(f, "Total Rebounds"),
            Self::Blocks => write!(f, "Blocks"),
            Self::Steals => write!(f, "Steals"),
            Self::Turnovers => write!(f, "Turnovers"),
            Self::Fouls => write!(f, "Fouls"),
            Self::TechnicalFouls => write!(f, "Technical Fouls"),
            Self::TimeoutsUsed => write!(f, "Timeouts Used"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScore {
    pub field_goals_made: u16,
    pub field_goals_attempted: u16,
    pub three_pointers_made: u16,
    pub three_pointers_attempted: u16,
    pub free_throws_made: u16,
    pub free_throws_attempted: u16,
    pub assists: u16,
    pub offensive_rebounds: u16,
    pub defensive_rebounds: u16,
    pub total_rebounds: u16,
    pub blocks: u16,
    pub steals: u16,
    pub turnovers: u16,
    pub fouls: u16,
    pub technical_fouls: u16,
    pub timeouts_used: u16,
}

impl BoxScore {
    /// Applies `delta` to the counter, clamping at zero and saturating at the top.
    /// Returns the new value.
    pub fn adjust(&mut self, key: StatKey, delta: i16) -> u16 {
        let counter = &mut self[key];
        *counter = counter.saturating_add_signed(delta);
        *counter
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, u16)> + '_ {
        all::<StatKey>().map(move |key| (key, self[key]))
    }

    pub fn field_goal_pct(&self) -> f64 {
        compute_percentage(self.field_goals_made, self.field_goals_attempted)
    }

    pub fn three_point_pct(&self) -> f64 {
        compute_percentage(self.three_pointers_made, self.three_pointers_attempted)
    }

    pub fn free_throw_pct(&self) -> f64 {
        compute_percentage(self.free_throws_made, self.free_throws_attempted)
    }
}

impl Index<StatKey> for BoxScore {
    type Output = u16;

    fn index(&self, key: StatKey) -> &Self::Output {
        match key {
            StatKey::FieldGoalsMade => &self.field_goals_made,
            StatKey::FieldGoalsAttempted => &self.field_goals_attempted,
            StatKey::ThreePointersMade => &self.three_pointers_made,
            StatKey::ThreePointersAttempted => &self.three_pointers_attempted,
            StatKey::FreeThrowsMade => &self.free_throws_made,
            StatKey::FreeThrowsAttempted => &self.free_throws_attempted,
            StatKey::Assists => &self.assists,
            StatKey::OffensiveRebounds => &self.offensive_rebounds,
            StatKey::DefensiveRebounds => &self.defensive_rebounds,
            StatKey::TotalRebounds => &self.total_rebounds,
            StatKey::Blocks => &self.blocks,
            StatKey::Steals => &self.steals,
            StatKey::Turnovers => &self.turnovers,
            StatKey::Fouls => &self.fouls,
            StatKey::TechnicalFouls => &self.technical_fouls,
            StatKey::TimeoutsUsed => &self.timeouts_used,
        }
    }
}

impl IndexMut<StatKey> for BoxScore {
    fn index_mut(&mut self, key: StatKey) -> &mut Self::Output {
        match key {
            StatKey::FieldGoalsMade => &mut self.field_goals_made,
            StatKey::FieldGoalsAttempted => &mut self.field_goals_attempted,
            StatKey::ThreePointersMade => &mut self.three_pointers_made,
            StatKey::ThreePointersAttempted => &mut self.three_pointers_attempted,
            StatKey::FreeThrowsMade => &mut self.free_throws_made,
            StatKey::FreeThrowsAttempted => &mut self.free_throws_attempted,
            StatKey::Assists => &mut self.assists,
            StatKey::OffensiveRebounds => &mut self.offensive_rebounds,
            StatKey::DefensiveRebounds => &mut self.defensive_rebounds,
            StatKey::TotalRebounds => &mut self.total_rebounds,
            StatKey::Blocks => &mut self.blocks,
            StatKey::Steals => &mut self.steals,
            StatKey::Turnovers => &mut self.turnovers,
            StatKey::Fouls => &mut self.fouls,
            StatKey::TechnicalFouls => &mut self.technical_fouls,
            StatKey::TimeoutsUsed => &mut self.timeouts_used,
        }
    }
}

/// `made / attempted * 100`, rounded to one decimal place. Zero attempts gives `0.0`.
pub fn compute_percentage(made: u16, attempted: u16) -> f64 {
    if attempted == 0 {
        return 0.0;
    }
    (f64::from(made) * 1000.0 / f64::from(attempted)).round() / 10.0
}
