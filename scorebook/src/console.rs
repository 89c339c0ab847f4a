use crate::{
    config::Config,
    scoring_session::{MatchScoringSession, SessionError},
};
use enum_iterator::all;
use hoops_common::{
    box_score::StatKey,
    game_status::{GameAction, GameStatus},
    league_api::{Credential, MatchResultsSink},
    side::Side,
};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use log::*;
use prettytable::{Cell, Row, Table};
use std::fmt::{Display, Formatter};
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Transition(GameAction),
    Score(Side, i16),
    CorrectScore(Side),
    AdjustStat(Side),
    ShowBoxScore,
    Save,
    Quit,
}

impl Display for MenuChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Transition(GameAction::Start) => write!(f, "Start game"),
            Self::Transition(GameAction::End) => write!(f, "End game"),
            Self::Transition(GameAction::Cancel) => write!(f, "Cancel game"),
            Self::Score(side, points) => write!(f, "{side} {points:+}"),
            Self::CorrectScore(side) => write!(f, "Correct {side} score"),
            Self::AdjustStat(side) => write!(f, "Adjust {side} stats"),
            Self::ShowBoxScore => write!(f, "Show box score"),
            Self::Save => write!(f, "Save result"),
            Self::Quit => write!(f, "Quit"),
        }
    }
}

/// The choices to offer for the session's current state.
///
/// Score and stat entry is only offered while it makes sense for the operator,
/// the session itself accepts it at any time.
pub fn menu_choices(session: &MatchScoringSession, quick_points: &[i16]) -> Vec<MenuChoice> {
    let mut choices = Vec::new();
    let status = session.status();

    if status == GameStatus::InProgress {
        for side in all::<Side>() {
            choices.extend(quick_points.iter().map(|p| MenuChoice::Score(side, *p)));
        }
    }
    if matches!(status, GameStatus::InProgress | GameStatus::Completed) {
        choices.extend(all::<Side>().map(MenuChoice::CorrectScore));
        choices.extend(all::<Side>().map(MenuChoice::AdjustStat));
    }

    choices.extend(
        session
            .legal_actions()
            .into_iter()
            .map(MenuChoice::Transition),
    );
    choices.push(MenuChoice::ShowBoxScore);
    if status.is_finished() && !session.is_saved() {
        choices.push(MenuChoice::Save);
    }
    choices.push(MenuChoice::Quit);
    choices
}

pub fn scoreboard(session: &MatchScoringSession) -> String {
    let identity = session.identity();
    let scores = session.scores();
    let mut line = format!(
        "#{} {} {} - {} {} ({})",
        identity.fixture_id,
        identity.team(Side::Home).name,
        scores[Side::Home],
        scores[Side::Away],
        identity.team(Side::Away).name,
        session.status()
    );
    if let Some(started_at) = session.timestamps().started_at {
        line.push_str(&format!(
            ", tip-off {:02}:{:02}",
            started_at.hour(),
            started_at.minute()
        ));
    }
    if let Some(outcome) = session.outcome() {
        line.push_str(&format!(", {outcome}"));
    }
    line
}

pub fn box_score_table(session: &MatchScoringSession) -> Table {
    let identity = session.identity();
    let box_scores = session.box_scores();
    let scores = session.scores();

    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    let mut titles = vec![Cell::new("")];
    titles.extend(all::<Side>().map(|side| Cell::new(&identity.team(side).name)));
    table.set_titles(Row::new(titles));
    table.add_row(Row::new(vec![
        Cell::new("PTS"),
        Cell::new(&scores.home.to_string()),
        Cell::new(&scores.away.to_string()),
    ]));
    for key in all::<StatKey>() {
        table.add_row(Row::new(vec![
            Cell::new(key.label()),
            Cell::new(&box_scores.home[key].to_string()),
            Cell::new(&box_scores.away[key].to_string()),
        ]));
    }
    for (label, home, away) in [
        (
            "FG%",
            box_scores.home.field_goal_pct(),
            box_scores.away.field_goal_pct(),
        ),
        (
            "3P%",
            box_scores.home.three_point_pct(),
            box_scores.away.three_point_pct(),
        ),
        (
            "FT%",
            box_scores.home.free_throw_pct(),
            box_scores.away.free_throw_pct(),
        ),
    ] {
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&format!("{home:.1}")),
            Cell::new(&format!("{away:.1}")),
        ]));
    }
    table
}

/// Runs the interactive scoring loop until the result is saved or the operator quits
pub async fn run<S: MatchResultsSink>(
    mut session: MatchScoringSession,
    sink: &S,
    credential: &Credential,
    config: &Config,
) -> Result<(), InquireError> {
    let offset = if config.console.use_local_time {
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
    } else {
        UtcOffset::UTC
    };
    let now = || OffsetDateTime::now_utc().to_offset(offset);

    loop {
        println!("\n{}", scoreboard(&session));
        if config.console.show_box_score {
            println!("{}", box_score_table(&session));
        }

        let choices = menu_choices(&session, &config.scoring.quick_points);
        let choice = Select::new("Action:", choices).with_page_size(12).prompt()?;

        match choice {
            MenuChoice::Transition(GameAction::Start) => report(session.start_game(now())),
            MenuChoice::Transition(GameAction::End) => {
                let confirmed = !config.scoring.confirm_end_game
                    || Confirm::new("End the game with the current score?")
                        .with_default(false)
                        .prompt()?;
                if confirmed {
                    report(session.end_game(now()).map(|_| ()));
                }
            }
            MenuChoice::Transition(GameAction::Cancel) => {
                if Confirm::new("Cancel this game?").with_default(false).prompt()? {
                    report(session.cancel_game(now()));
                }
            }
            MenuChoice::Score(side, points) => {
                session.adjust_score(side, points);
            }
            MenuChoice::CorrectScore(side) => {
                let team = &session.identity().team(side).name;
                let delta = CustomType::<i16>::new(&format!(
                    "Points to add to {team} (negative to remove):"
                ))
                .with_default(-1)
                .prompt()?;
                session.adjust_score(side, delta);
            }
            MenuChoice::AdjustStat(side) => {
                let team = &session.identity().team(side).name;
                let key = Select::new(&format!("{team} stat:"), all::<StatKey>().collect())
                    .with_page_size(16)
                    .prompt()?;
                let delta = CustomType::<i16>::new("Change by:")
                    .with_default(1)
                    .prompt()?;
                let value = session.adjust_stat(side, key, delta);
                println!("{side} {key}: {value}");
            }
            MenuChoice::ShowBoxScore => println!("{}", box_score_table(&session)),
            MenuChoice::Save => {
                let notes = Text::new("Notes (optional):").prompt()?;
                let record = session.build_save_record(&notes);
                loop {
                    match session.save(sink, &record, credential).await {
                        Ok(ack) => {
                            info!(
                                "Result saved: {}",
                                ack.message.as_deref().unwrap_or("accepted")
                            );
                            return Ok(());
                        }
                        Err(e) => {
                            error!("Save failed: {e}");
                            let retry = Confirm::new("Retry the save?")
                                .with_default(true)
                                .prompt()?;
                            if !retry {
                                break;
                            }
                        }
                    }
                }
            }
            MenuChoice::Quit => {
                let discard = session.is_saved()
                    || Confirm::new("Quit without saving? All entered statistics will be lost.")
                        .with_default(false)
                        .prompt()?;
                if discard {
                    warn!("Scoring session closed without saving");
                    return Ok(());
                }
            }
        }
    }
}

fn report(result: Result<(), SessionError>) {
    if let Err(e) = result {
        error!("{e}");
    }
}
