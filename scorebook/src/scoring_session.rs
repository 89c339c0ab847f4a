use enum_iterator::all;
use hoops_common::{
    box_score::{BoxScore, StatKey},
    bundles::HomeAwayBundle,
    game_status::{GameAction, GameStatus, Outcome},
    league_api::{Ack, Credential, MatchResultsSink, SaveError},
    match_record::{GameTimestamps, MatchIdentity, MatchSaveRecord},
    side::Side,
};
use log::*;
use thiserror::Error;
use time::OffsetDateTime;

/// Live statistics for one fixture, from tip-off to the saved result.
///
/// The session owns the status state machine; callers ask it which actions are
/// legal instead of keeping their own copy of the rules. Scores and box score
/// counters are tracked separately and are never reconciled with each other.
#[derive(Debug)]
pub struct MatchScoringSession {
    identity: MatchIdentity,
    status: GameStatus,
    scores: HomeAwayBundle<u16>,
    box_scores: HomeAwayBundle<BoxScore>,
    timestamps: GameTimestamps,
    outcome: Option<Outcome>,
    saved: bool,
}

impl MatchScoringSession {
    pub fn new(identity: MatchIdentity) -> Self {
        info!(
            "Opening scoring session for fixture {}: {} vs {}",
            identity.fixture_id, identity.home_team.name, identity.away_team.name
        );
        Self {
            identity,
            status: GameStatus::Scheduled,
            scores: Default::default(),
            box_scores: Default::default(),
            timestamps: Default::default(),
            outcome: None,
            saved: false,
        }
    }

    pub fn identity(&self) -> &MatchIdentity {
        &self.identity
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn scores(&self) -> HomeAwayBundle<u16> {
        self.scores
    }

    pub fn box_scores(&self) -> &HomeAwayBundle<BoxScore> {
        &self.box_scores
    }

    pub fn timestamps(&self) -> GameTimestamps {
        self.timestamps
    }

    /// Only known once the game has been ended
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(Outcome::winner)
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    fn status_string(&self) -> String {
        format!(
            "[#{} {} {}-{}]",
            self.identity.fixture_id, self.status, self.scores.home, self.scores.away
        )
    }

    /// Returns `Ok` if `action` can be applied now, otherwise returns `Err` describing why not
    fn can_apply(&self, action: GameAction) -> Result<()> {
        match self.status.after(action) {
            Some(_) => Ok(()),
            None => Err(SessionError::InvalidTransition {
                action,
                status: self.status,
            }),
        }
    }

    pub fn can_start_game(&self) -> Result<()> {
        self.can_apply(GameAction::Start)
    }

    pub fn can_end_game(&self) -> Result<()> {
        self.can_apply(GameAction::End)
    }

    pub fn can_cancel_game(&self) -> Result<()> {
        self.can_apply(GameAction::Cancel)
    }

    pub fn legal_actions(&self) -> Vec<GameAction> {
        all::<GameAction>()
            .filter(|action| self.can_apply(*action).is_ok())
            .collect()
    }

    pub fn start_game(&mut self, now: OffsetDateTime) -> Result<()> {
        self.can_start_game()?;
        self.status = GameStatus::InProgress;
        self.timestamps.started_at = Some(now);
        info!("{} Game started", self.status_string());
        Ok(())
    }

    pub fn end_game(&mut self, now: OffsetDateTime) -> Result<Outcome> {
        self.can_end_game()?;
        self.status = GameStatus::Completed;
        self.timestamps.ended_at = Some(now);
        let outcome = Outcome::from_scores(self.scores.home, self.scores.away);
        self.outcome = Some(outcome);
        info!("{} Game ended, {outcome}", self.status_string());
        Ok(outcome)
    }

    /// A game that never started keeps no end time
    pub fn cancel_game(&mut self, now: OffsetDateTime) -> Result<()> {
        self.can_cancel_game()?;
        let was_in_progress = self.status == GameStatus::InProgress;
        self.status = GameStatus::Cancelled;
        if was_in_progress {
            self.timestamps.ended_at = Some(now);
        }
        info!("{} Game cancelled", self.status_string());
        Ok(())
    }

    /// Adds `delta` points to `side`, never going below zero. Returns the new total.
    pub fn adjust_score(&mut self, side: Side, delta: i16) -> u16 {
        let score = &mut self.scores[side];
        *score = score.saturating_add_signed(delta);
        info!(
            "{} {side} score adjusted by {delta:+}",
            self.status_string()
        );
        self.scores[side]
    }

    /// Adds `delta` to one of `side`'s counters, never going below zero. Returns the new value.
    pub fn adjust_stat(&mut self, side: Side, key: StatKey, delta: i16) -> u16 {
        let value = self.box_scores[side].adjust(key, delta);
        debug!(
            "{} {side} {key} adjusted by {delta:+} to {value}",
            self.status_string()
        );
        value
    }

    /// Snapshot of the current state, ready to submit. Blank notes are dropped.
    pub fn build_save_record(&self, notes: &str) -> MatchSaveRecord {
        let notes = notes.trim();
        MatchSaveRecord {
            match_id: self.identity.fixture_id,
            scores: self.scores,
            box_scores: self.box_scores,
            status: self.status,
            timestamps: self.timestamps,
            winner: self.winner(),
            notes: if notes.is_empty() {
                None
            } else {
                Some(notes.to_string())
            },
        }
    }

    /// Submits `record` once. On failure nothing in the session changes, so the
    /// same record can be submitted again.
    pub async fn save<S: MatchResultsSink>(
        &mut self,
        sink: &S,
        record: &MatchSaveRecord,
        credential: &Credential,
    ) -> Result<Ack> {
        if self.saved {
            return Err(SessionError::AlreadySaved);
        }

        let ack = sink.post_match_result(record, credential).await?;
        self.saved = true;
        info!("{} Result saved", self.status_string());
        Ok(ack)
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Can't {action} a game that is {status}")]
    InvalidTransition {
        action: GameAction,
        status: GameStatus,
    },
    #[error("The result for this match has already been saved")]
    AlreadySaved,
    #[error(transparent)]
    Save(#[from] SaveError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod test {
    use super::SessionError as SErr;
    use super::*;
    use core::future::Future;
    use hoops_common::{league_api::ApiError, match_record::TeamInfo};
    use std::{cell::RefCell, sync::Once};
    use time::macros::datetime;

    static INIT: Once = Once::new();

    pub fn initialize() {
        INIT.call_once(|| {
            env_logger::init();
        });
    }

    struct FakeSink {
        reply: std::result::Result<Ack, SaveError>,
        received: RefCell<Vec<MatchSaveRecord>>,
    }

    impl FakeSink {
        fn accepting() -> Self {
            Self {
                reply: Ok(Ack {
                    message: None,
                    data: None,
                }),
                received: RefCell::new(vec![]),
            }
        }

        fn failing(err: SaveError) -> Self {
            Self {
                reply: Err(err),
                received: RefCell::new(vec![]),
            }
        }
    }

    impl MatchResultsSink for FakeSink {
        fn post_match_result(
            &self,
            record: &MatchSaveRecord,
            _credential: &Credential,
        ) -> impl Future<Output = std::result::Result<Ack, SaveError>> {
            self.received.borrow_mut().push(record.clone());
            core::future::ready(self.reply.clone())
        }
    }

    fn fixture(id: u32) -> MatchIdentity {
        MatchIdentity {
            fixture_id: id,
            home_team: TeamInfo::new("Riverside Rockets"),
            away_team: TeamInfo::new("Harbor Hawks"),
            venue: Some("Eastside Gym".to_string()),
            scheduled_at: Some(datetime!(2026-03-14 19:00 UTC)),
        }
    }

    fn credential() -> Credential {
        Credential::new("statistician-token")
    }

    const START: OffsetDateTime = datetime!(2026-03-14 19:02 UTC);
    const END: OffsetDateTime = datetime!(2026-03-14 20:35 UTC);

    #[test]
    fn test_new_session() {
        initialize();
        let session = MatchScoringSession::new(fixture(42));
        assert_eq!(session.status(), GameStatus::Scheduled);
        assert_eq!(session.scores(), HomeAwayBundle::default());
        assert_eq!(session.box_scores().home, BoxScore::default());
        assert_eq!(session.box_scores().away, BoxScore::default());
        assert_eq!(session.timestamps(), GameTimestamps::default());
        assert_eq!(session.outcome(), None);
        assert!(!session.is_saved());
        assert_eq!(
            session.legal_actions(),
            vec![GameAction::Start, GameAction::Cancel]
        );
    }

    #[test]
    fn test_start_game() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        assert_eq!(session.can_start_game(), Ok(()));
        assert_eq!(
            session.can_end_game(),
            Err(SErr::InvalidTransition {
                action: GameAction::End,
                status: GameStatus::Scheduled
            })
        );

        session.start_game(START).unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.timestamps().started_at, Some(START));
        assert_eq!(session.timestamps().ended_at, None);
        assert_eq!(
            session.legal_actions(),
            vec![GameAction::End, GameAction::Cancel]
        );

        let later = START + time::Duration::minutes(1);
        assert_eq!(
            session.start_game(later),
            Err(SErr::InvalidTransition {
                action: GameAction::Start,
                status: GameStatus::InProgress
            })
        );
        assert_eq!(session.timestamps().started_at, Some(START));
    }

    #[test]
    fn test_end_game_only_from_in_progress() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        assert_eq!(
            session.end_game(END),
            Err(SErr::InvalidTransition {
                action: GameAction::End,
                status: GameStatus::Scheduled
            })
        );
        assert_eq!(session.status(), GameStatus::Scheduled);
        assert_eq!(session.timestamps().ended_at, None);

        session.start_game(START).unwrap();
        session.end_game(END).unwrap();
        assert_eq!(session.status(), GameStatus::Completed);
        assert_eq!(session.timestamps().ended_at, Some(END));
        assert!(session.legal_actions().is_empty());

        assert_eq!(
            session.end_game(END),
            Err(SErr::InvalidTransition {
                action: GameAction::End,
                status: GameStatus::Completed
            })
        );
        assert_eq!(
            session.start_game(END),
            Err(SErr::InvalidTransition {
                action: GameAction::Start,
                status: GameStatus::Completed
            })
        );
    }

    #[test]
    fn test_tie_has_no_winner() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.start_game(START).unwrap();
        session.adjust_score(Side::Home, 58);
        session.adjust_score(Side::Away, 58);
        assert_eq!(session.end_game(END), Ok(Outcome::Tie));
        assert_eq!(session.winner(), None);
        assert_eq!(session.build_save_record("").winner, None);
    }

    #[test]
    fn test_home_win() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.start_game(START).unwrap();
        session.adjust_score(Side::Home, 61);
        session.adjust_score(Side::Away, 58);
        assert_eq!(session.end_game(END), Ok(Outcome::Winner(Side::Home)));
        assert_eq!(session.winner(), Some(Side::Home));
    }

    #[test]
    fn test_away_win() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.start_game(START).unwrap();
        session.adjust_score(Side::Away, 3);
        assert_eq!(session.end_game(END), Ok(Outcome::Winner(Side::Away)));
    }

    #[test]
    fn test_cancel_game() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.cancel_game(START).unwrap();
        assert_eq!(session.status(), GameStatus::Cancelled);
        assert_eq!(session.timestamps(), GameTimestamps::default());
        assert_eq!(session.outcome(), None);
        assert_eq!(
            session.cancel_game(END),
            Err(SErr::InvalidTransition {
                action: GameAction::Cancel,
                status: GameStatus::Cancelled
            })
        );

        let mut session = MatchScoringSession::new(fixture(43));
        session.start_game(START).unwrap();
        session.cancel_game(END).unwrap();
        assert_eq!(session.status(), GameStatus::Cancelled);
        assert_eq!(session.timestamps().started_at, Some(START));
        assert_eq!(session.timestamps().ended_at, Some(END));
        assert_eq!(session.outcome(), None);

        let mut session = MatchScoringSession::new(fixture(44));
        session.start_game(START).unwrap();
        session.end_game(END).unwrap();
        assert_eq!(
            session.can_cancel_game(),
            Err(SErr::InvalidTransition {
                action: GameAction::Cancel,
                status: GameStatus::Completed
            })
        );
    }

    #[test]
    fn test_transitions_follow_status_table() {
        initialize();
        for path in [
            vec![GameAction::Start, GameAction::End],
            vec![GameAction::Start, GameAction::Cancel],
            vec![GameAction::Cancel],
        ] {
            let mut session = MatchScoringSession::new(fixture(42));
            for action in path {
                let expected = session.status().after(action);
                let result = match action {
                    GameAction::Start => session.start_game(START),
                    GameAction::End => session.end_game(END).map(|_| ()),
                    GameAction::Cancel => session.cancel_game(END),
                };
                assert_eq!(result, Ok(()));
                assert_eq!(Some(session.status()), expected);
            }
        }
    }

    #[test]
    fn test_score_never_negative() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        assert_eq!(session.adjust_score(Side::Home, -1), 0);
        assert_eq!(session.adjust_score(Side::Home, 3), 3);
        assert_eq!(session.adjust_score(Side::Home, -2), 1);
        assert_eq!(session.adjust_score(Side::Home, -5), 0);
        assert_eq!(session.scores().away, 0);
    }

    #[test]
    fn test_stat_clamps_at_zero() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        assert_eq!(session.adjust_stat(Side::Home, StatKey::Steals, -1), 0);
        assert_eq!(session.box_scores().home.steals, 0);
    }

    #[test]
    fn test_counters_stay_non_negative_for_any_sequence() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        let deltas = [1, -3, 2, 2, -1, -7, 5, i16::MIN, 4, i16::MAX, -2];
        let mut expected: HomeAwayBundle<Vec<i64>> =
            HomeAwayBundle {
                home: vec![0; 16],
                away: vec![0; 16],
            };

        for (step, delta) in deltas.iter().cycle().take(200).enumerate() {
            let side = if step % 3 == 0 { Side::Away } else { Side::Home };
            let index = (step * 7) % 16;
            let key = all::<StatKey>().nth(index).unwrap();

            let value = session.adjust_stat(side, key, *delta);
            let model = &mut expected[side][index];
            *model = (*model + i64::from(*delta)).clamp(0, i64::from(u16::MAX));
            assert_eq!(i64::from(value), *model, "step {step}: {side} {key}");
        }

        for (side, box_score) in session.box_scores() {
            for (i, (_, value)) in box_score.iter().enumerate() {
                assert_eq!(i64::from(value), expected[side][i]);
            }
        }
    }

    #[test]
    fn test_stats_allowed_in_any_status() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.adjust_stat(Side::Away, StatKey::Fouls, 1);
        session.start_game(START).unwrap();
        session.adjust_stat(Side::Away, StatKey::Fouls, 1);
        session.end_game(END).unwrap();
        session.adjust_stat(Side::Away, StatKey::Fouls, 1);
        session.adjust_score(Side::Away, 2);
        assert_eq!(session.box_scores().away.fouls, 3);
        assert_eq!(session.scores().away, 2);
    }

    #[test]
    fn test_score_and_field_goals_are_independent() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.adjust_score(Side::Home, 2);
        assert_eq!(session.box_scores().home.field_goals_made, 0);
        session.adjust_stat(Side::Home, StatKey::ThreePointersMade, 1);
        assert_eq!(session.scores().home, 2);
    }

    #[test]
    fn test_save_record_is_a_snapshot() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.start_game(START).unwrap();
        session.adjust_stat(Side::Home, StatKey::Assists, 4);
        session.adjust_score(Side::Home, 2);

        let record = session.build_save_record("  ");
        session.adjust_stat(Side::Home, StatKey::Assists, 10);
        session.adjust_score(Side::Home, 3);
        session.end_game(END).unwrap();

        assert_eq!(record.box_scores.home.assists, 4);
        assert_eq!(record.scores.home, 2);
        assert_eq!(record.status, GameStatus::InProgress);
        assert_eq!(record.timestamps.ended_at, None);
        assert_eq!(record.winner, None);
        assert_eq!(record.notes, None);
        assert_eq!(session.box_scores().home.assists, 14);
    }

    #[tokio::test]
    async fn test_end_to_end() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));

        session.start_game(START).unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
        assert!(session.timestamps().started_at.is_some());

        for _ in 0..3 {
            session.adjust_score(Side::Home, 2);
        }
        session.adjust_score(Side::Away, 3);
        session.adjust_stat(Side::Home, StatKey::FieldGoalsMade, 3);
        session.adjust_stat(Side::Home, StatKey::FieldGoalsAttempted, 5);
        session.adjust_stat(Side::Away, StatKey::ThreePointersMade, 1);
        assert_eq!(session.scores(), HomeAwayBundle { home: 6, away: 3 });

        assert_eq!(session.end_game(END), Ok(Outcome::Winner(Side::Home)));
        assert_eq!(session.status(), GameStatus::Completed);

        let record = session.build_save_record("Good game");
        assert_eq!(record.match_id, 42);
        assert_eq!(record.status, GameStatus::Completed);
        assert_eq!(record.winner, Some(Side::Home));
        assert_eq!(record.notes.as_deref(), Some("Good game"));
        assert_eq!(record.box_scores, *session.box_scores());
        assert_eq!(record.box_scores.home.field_goals_attempted, 5);
        assert_eq!(record.box_scores.away.three_pointers_made, 1);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "Completed");
        assert_eq!(json["winner"], "home");
        assert_eq!(json["notes"], "Good game");

        let sink = FakeSink::accepting();
        let ack = session.save(&sink, &record, &credential()).await;
        assert!(ack.is_ok());
        assert!(session.is_saved());
        assert_eq!(sink.received.borrow().as_slice(), &[record.clone()]);

        assert_eq!(
            session.save(&sink, &record, &credential()).await,
            Err(SErr::AlreadySaved)
        );
        assert_eq!(sink.received.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_save_leaves_session_unchanged() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        session.start_game(START).unwrap();
        session.adjust_score(Side::Home, 2);
        session.adjust_stat(Side::Away, StatKey::Turnovers, 2);
        session.end_game(END).unwrap();

        let record = session.build_save_record("");
        let scores_before = session.scores();
        let box_scores_before = *session.box_scores();

        let sink = FakeSink::failing(ApiError::RemoteRejected("validation error".to_string()));
        let result = session.save(&sink, &record, &credential()).await;
        assert_eq!(
            result,
            Err(SErr::Save(ApiError::RemoteRejected(
                "validation error".to_string()
            )))
        );

        assert_eq!(session.status(), GameStatus::Completed);
        assert_eq!(session.scores(), scores_before);
        assert_eq!(*session.box_scores(), box_scores_before);
        assert!(!session.is_saved());

        let sink = FakeSink::accepting();
        assert!(session.save(&sink, &record, &credential()).await.is_ok());
        assert!(session.is_saved());
    }

    #[tokio::test]
    async fn test_transport_failure_allows_retry() {
        initialize();
        let mut session = MatchScoringSession::new(fixture(42));
        let record = session.build_save_record("");

        let sink = FakeSink::failing(ApiError::Transport("connection refused".to_string()));
        let err = session.save(&sink, &record, &credential()).await.unwrap_err();
        assert!(matches!(err, SErr::Save(ApiError::Transport(_))));
        assert!(!session.is_saved());
        assert_eq!(sink.received.borrow().len(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = SErr::InvalidTransition {
            action: GameAction::End,
            status: GameStatus::Scheduled,
        };
        assert_eq!(err.to_string(), "Can't end a game that is Scheduled");
        let err = SErr::Save(ApiError::RemoteRejected("validation error".to_string()));
        assert_eq!(
            err.to_string(),
            "The league server rejected the request: validation error"
        );
    }
}
