pub mod side;

pub mod bundles;

pub mod box_score;

pub mod game_status;

pub mod match_record;

pub mod config;

pub mod league_api;
