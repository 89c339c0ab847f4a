use crate::side::Side;
use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum GameStatus {
    #[derivative(Default)]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// Operator actions that move a game between statuses
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Sequence)]
pub enum GameAction {
    Start,
    End,
    Cancel,
}

impl GameStatus {
    /// The status reached by applying `action`, or `None` if the action is not legal from here.
    pub fn after(self, action: GameAction) -> Option<GameStatus> {
        match (self, action) {
            (Self::Scheduled, GameAction::Start) => Some(Self::InProgress),
            (Self::InProgress, GameAction::End) => Some(Self::Completed),
            (Self::Scheduled | Self::InProgress, GameAction::Cancel) => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl core::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Scheduled => write!(f, "Scheduled"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl core::fmt::Display for GameAction {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Outcome {
    Winner(Side),
    Tie,
}

impl Outcome {
    /// Strict comparison of the final totals, equal scores are a tie
    pub fn from_scores(home: u16, away: u16) -> Self {
        match home.cmp(&away) {
            Ordering::Greater => Self::Winner(Side::Home),
            Ordering::Less => Self::Winner(Side::Away),
            Ordering::Equal => Self::Tie,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Self::Winner(side) => Some(side),
            Self::Tie => None,
        }
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Winner(side) => write!(f, "{side} win"),
            Self::Tie => write!(f, "Tie"),
        }
    }
}
