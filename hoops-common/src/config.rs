use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueApi {
    pub url: String,
    pub timeout_secs: u64,
    pub require_https: bool,
    pub access_token: String,
}

impl LeagueApi {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn access_token(&self) -> Option<&str> {
        if self.access_token.is_empty() {
            None
        } else {
            Some(&self.access_token)
        }
    }
}

impl Default for LeagueApi {
    fn default() -> Self {
        Self {
            url: "https://api.regionalhoops.org".to_string(),
            timeout_secs: 10,
            require_https: true,
            access_token: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoring {
    /// Point values offered as quick score buttons
    pub quick_points: Vec<i16>,
    pub confirm_end_game: bool,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            quick_points: vec![1, 2, 3],
            confirm_end_game: true,
        }
    }
}
