use hoops_common::config::{LeagueApi, Scoring};
use log::*;
use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::Path};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Console {
    /// Show the box score table after every action
    pub show_box_score: bool,
    pub use_local_time: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            show_box_score: false,
            use_local_time: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub league: LeagueApi,
    pub scoring: Scoring,
    pub console: Console,
}

impl Config {
    pub fn new_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let config_file = match read_to_string(path) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to read config file: {}", e);
                return Err(Box::new(e));
            }
        };

        match toml::from_str(&config_file) {
            Ok(c) => Ok(c),
            Err(e) => {
                error!("Failed to parse config file: {}", e);
                Err(Box::new(e))
            }
        }
    }
}
