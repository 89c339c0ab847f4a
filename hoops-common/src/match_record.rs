use crate::{
    box_score::BoxScore,
    bundles::HomeAwayBundle,
    game_status::GameStatus,
    side::Side,
};
use serde::{
    Deserialize, Serialize, Serializer,
    ser::{Error as _, SerializeMap},
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,
    #[serde(default, rename = "logo")]
    pub crest: Option<String>,
}

impl TeamInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            crest: None,
        }
    }
}

/// The fixture a scoring session is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchIdentity {
    #[serde(rename = "id")]
    pub fixture_id: u32,
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_at: Option<OffsetDateTime>,
}

impl MatchIdentity {
    pub fn team(&self, side: Side) -> &TeamInfo {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameTimestamps {
    pub started_at: Option<OffsetDateTime>,
    pub ended_at: Option<OffsetDateTime>,
}

/// Finalized statistics for one fixture, as posted to the results endpoint.
///
/// Serializes to the flat layout the backend expects: `home_team_score`,
/// `away_team_score`, one `home_*`/`away_*` entry per [`StatKey`](crate::box_score::StatKey), then the
/// status, timestamps, winner and notes. Absent optional values are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSaveRecord {
    pub match_id: u32,
    pub scores: HomeAwayBundle<u16>,
    pub box_scores: HomeAwayBundle<BoxScore>,
    pub status: GameStatus,
    pub timestamps: GameTimestamps,
    pub winner: Option<Side>,
    pub notes: Option<String>,
}

impl Serialize for MatchSaveRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("match_id", &self.match_id)?;
        map.serialize_entry("home_team_score", &self.scores.home)?;
        map.serialize_entry("away_team_score", &self.scores.away)?;

        for (side, box_score) in self.box_scores.iter() {
            for (key, value) in box_score.iter() {
                let field = format!("{}_{}", side.wire_prefix(), key.wire_name());
                map.serialize_entry(&field, &value)?;
            }
        }

        map.serialize_entry("status", &self.status)?;
        if let Some(started_at) = self.timestamps.started_at {
            let formatted = started_at.format(&Rfc3339).map_err(S::Error::custom)?;
            map.serialize_entry("game_start_time", &formatted)?;
        }
        if let Some(ended_at) = self.timestamps.ended_at {
            let formatted = ended_at.format(&Rfc3339).map_err(S::Error::custom)?;
            map.serialize_entry("game_end_time", &formatted)?;
        }
        if let Some(winner) = self.winner {
            map.serialize_entry("winner", &winner)?;
        }
        if let Some(ref notes) = self.notes {
            map.serialize_entry("notes", notes)?;
        }
        map.end()
    }
}
