//! Read-only snapshots of a session for pollers.
//!
//! A snapshot combines the record's status with the engine's last published
//! [`GameView`]. Projection never touches the engine and never blocks on it.

use std::sync::LazyLock;

use impostor_core::{ActivityEntry, GameView, Phase, SessionId, Team};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::{SessionRecord, SessionStatus};

static SPEAK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^SPEAK\s*:?\s*(.*)$").unwrap());

/// One offered move, numbered for submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Index to submit.
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Whether the move takes free text.
    pub requires_message: bool,
}

/// Where one player stands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPosition {
    /// Player name.
    pub name: String,
    /// Current room.
    pub room: String,
    /// Player color.
    pub color: String,
    /// Whether the player is alive.
    pub is_alive: bool,
}

/// One public utterance from a meeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingMessage {
    /// Stable id: `"{timestep}:{round}:{player}:{text}"`. A missing round
    /// leaves its segment empty (`"3::Player 1: red:hello"`).
    pub id: String,
    /// Timestep spoken at.
    pub timestep: u32,
    /// Discussion round.
    pub round: Option<u32>,
    /// Speaker.
    pub player: String,
    /// Spoken text (`...` when empty).
    pub text: String,
}

/// Transport-agnostic view of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Session id.
    pub game_id: SessionId,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Recorded failure.
    pub error: Option<String>,
    /// Winning side, once completed.
    pub winner: Option<Team>,
    /// Why the winner won.
    pub winner_reason: Option<String>,
    /// Whether seats have been dealt.
    pub initialized: bool,
    /// Whether the human seat exists.
    pub has_human: bool,
    /// Current timestep.
    pub timestep: u32,
    /// Timestep limit.
    pub max_timesteps: Option<u32>,
    /// Current phase.
    pub current_phase: Option<Phase>,
    /// Player currently acting.
    pub current_player: Option<String>,
    /// Whether the acting player is the human.
    pub is_human_turn: bool,
    /// Name of the human's seat.
    pub human_player_name: Option<String>,
    /// Step being decided on the human's turn.
    pub current_step: Option<String>,
    /// Situation description for the UI.
    pub player_info: Option<String>,
    /// Moves offered to the human (empty off-turn).
    pub available_actions: Vec<ActionEntry>,
    /// Every player's position.
    pub player_positions: Vec<PlayerPosition>,
    /// Meeting speech in log order.
    pub meeting_messages: Vec<MeetingMessage>,
}

/// Build the snapshot of `record`.
pub fn project(record: &SessionRecord) -> GameSnapshot {
    let (status, error, outcome) = record.status_parts();
    let (winner, winner_reason) = match outcome {
        Some(o) => (Some(o.winner), Some(o.reason)),
        None => (None, None),
    };

    record.view().read(|view| {
        let human = view.human.as_ref();
        let is_human_turn = match (human, view.current_player.as_deref()) {
            (Some(h), Some(current)) => h.player_name == current,
            _ => false,
        };

        let mut available_actions = Vec::new();
        let mut current_step = None;
        let player_info;
        if let (true, Some(h)) = (is_human_turn, human) {
            available_actions = h
                .available_actions
                .iter()
                .enumerate()
                .map(|(index, a)| ActionEntry {
                    index,
                    name: a.name.clone(),
                    requires_message: a.requires_message,
                })
                .collect();
            current_step.clone_from(&h.current_step);
            player_info = h.player_info.clone();
        } else {
            // Off-turn: keep the acting player's situation visible.
            player_info = view
                .current_player
                .as_deref()
                .and_then(|name| view.player(name))
                .and_then(|p| p.info.clone());
        }

        GameSnapshot {
            game_id: record.id(),
            status,
            error,
            winner,
            winner_reason,
            initialized: view.initialized,
            has_human: human.is_some(),
            timestep: view.timestep,
            max_timesteps: view.max_timesteps,
            current_phase: view.current_phase,
            current_player: view.current_player.clone(),
            is_human_turn,
            human_player_name: human.map(|h| h.player_name.clone()),
            current_step,
            player_info,
            available_actions,
            player_positions: player_positions(view),
            meeting_messages: meeting_messages(&view.activity_log),
        }
    })
}

fn player_positions(view: &GameView) -> Vec<PlayerPosition> {
    view.players
        .iter()
        .map(|p| PlayerPosition {
            name: p.name.clone(),
            room: p.location.clone(),
            color: p.color.clone(),
            is_alive: p.is_alive,
        })
        .collect()
}

/// Extract meeting speech from an activity log.
pub fn meeting_messages(log: &[ActivityEntry]) -> Vec<MeetingMessage> {
    log.iter()
        .filter(|e| e.phase == Phase::Meeting)
        .filter_map(|e| {
            let player = e.player.as_deref()?;
            let action = e.action.as_deref()?;
            if !action.starts_with("SPEAK") {
                return None;
            }
            let text = speech_text(action);
            let round = e.round.map(|r| r.to_string()).unwrap_or_default();
            Some(MeetingMessage {
                id: format!("{}:{round}:{player}:{text}", e.timestep),
                timestep: e.timestep,
                round: e.round,
                player: player.to_owned(),
                text,
            })
        })
        .collect()
}

fn speech_text(action: &str) -> String {
    let text = SPEAK_PATTERN
        .captures(action)
        .and_then(|c| c.get(1))
        .map_or(action, |m| m.as_str())
        .trim();
    if text.is_empty() {
        "...".to_owned()
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impostor_core::{
        ActionOption, GameConfig, GameOutcome, HumanView, PlayerSummary, ViewPublisher,
        view_channel,
    };

    fn player(name: &str, room: &str, info: Option<&str>) -> PlayerSummary {
        PlayerSummary {
            name: name.into(),
            location: room.into(),
            color: name.rsplit(' ').next().unwrap_or_default().into(),
            is_alive: true,
            info: info.map(Into::into),
        }
    }

    fn speak(timestep: u32, round: u32, who: &str, action: &str) -> ActivityEntry {
        ActivityEntry {
            timestep,
            round: Some(round),
            phase: Phase::Meeting,
            player: Some(who.into()),
            action: Some(action.into()),
        }
    }

    fn seeded() -> (SessionRecord, ViewPublisher) {
        let (publisher, reader) = view_channel();
        publisher.publish(GameView {
            initialized: true,
            current_phase: Some(Phase::Task),
            timestep: 3,
            max_timesteps: Some(50),
            current_player: Some("Player 1: red".into()),
            players: vec![
                player("Player 1: red", "Cafeteria", Some("red sees nobody")),
                player("Player 2: blue", "Admin", None),
            ],
            activity_log: vec![],
            human: Some(HumanView {
                player_name: "Player 2: blue".into(),
                available_actions: vec![
                    ActionOption::new("MOVE to Cafeteria"),
                    ActionOption::with_message("SPEAK"),
                ],
                current_step: Some("task phase".into()),
                player_info: Some("blue is alone".into()),
            }),
        });
        let record = SessionRecord::new(SessionId::new(5), GameConfig::default(), reader);
        (record, publisher)
    }

    #[test]
    fn empty_view_projects_defaults() {
        let (_publisher, reader) = view_channel();
        let record = SessionRecord::new(SessionId::new(1), GameConfig::default(), reader);
        let snap = project(&record);
        assert_eq!(snap.status, SessionStatus::Initializing);
        assert!(!snap.initialized);
        assert!(!snap.has_human);
        assert!(!snap.is_human_turn);
        assert!(snap.available_actions.is_empty());
        assert!(snap.player_positions.is_empty());
    }

    #[test]
    fn off_turn_shows_current_player_info() {
        let (record, _publisher) = seeded();
        let snap = project(&record);
        assert!(snap.has_human);
        assert!(!snap.is_human_turn);
        assert_eq!(snap.human_player_name.as_deref(), Some("Player 2: blue"));
        assert!(snap.available_actions.is_empty());
        assert!(snap.current_step.is_none());
        assert_eq!(snap.player_info.as_deref(), Some("red sees nobody"));
    }

    #[test]
    fn human_turn_exposes_actions() {
        let (record, publisher) = seeded();
        publisher.update(|v| v.current_player = Some("Player 2: blue".into()));
        let snap = project(&record);
        assert!(snap.is_human_turn);
        assert_eq!(snap.available_actions.len(), 2);
        assert_eq!(snap.available_actions[1].index, 1);
        assert!(snap.available_actions[1].requires_message);
        assert_eq!(snap.current_step.as_deref(), Some("task phase"));
        assert_eq!(snap.player_info.as_deref(), Some("blue is alone"));
    }

    #[test]
    fn positions_follow_players() {
        let (record, _publisher) = seeded();
        let snap = project(&record);
        assert_eq!(snap.player_positions.len(), 2);
        assert_eq!(snap.player_positions[1].room, "Admin");
        assert_eq!(snap.player_positions[1].color, "blue");
    }

    #[test]
    fn outcome_and_error_are_projected() {
        let (record, _publisher) = seeded();
        assert!(record.complete(GameOutcome {
            winner: Team::Crewmates,
            reason: "time limit reached".into(),
        }));
        let snap = project(&record);
        assert_eq!(snap.status, SessionStatus::Completed);
        assert_eq!(snap.winner, Some(Team::Crewmates));
        assert_eq!(snap.winner_reason.as_deref(), Some("time limit reached"));
        assert!(snap.error.is_none());
    }

    #[test]
    fn meeting_messages_filtered_and_parsed() {
        let log = vec![
            speak(4, 1, "Player 1: red", "SPEAK: I saw blue vent"),
            ActivityEntry {
                timestep: 4,
                round: None,
                phase: Phase::Task,
                player: Some("Player 3: green".into()),
                action: Some("SPEAK: not a meeting".into()),
            },
            speak(4, 1, "Player 2: blue", "VOTE Player 1: red"),
            speak(4, 2, "Player 2: blue", "SPEAK   trust me  "),
            speak(4, 2, "Player 3: green", "SPEAK:"),
            ActivityEntry {
                timestep: 4,
                round: Some(2),
                phase: Phase::Meeting,
                player: None,
                action: Some("SPEAK: ghost".into()),
            },
        ];
        let msgs = meeting_messages(&log);
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0].text, "I saw blue vent");
        assert_eq!(msgs[0].id, "4:1:Player 1: red:I saw blue vent");
        assert_eq!(msgs[1].text, "trust me");
        assert_eq!(msgs[1].round, Some(2));
        assert_eq!(msgs[2].text, "...");
    }

    #[test]
    fn speak_prefix_is_case_sensitive_but_regex_is_not() {
        let log = vec![
            speak(1, 1, "Player 1: red", "speak: lowercase ignored"),
            speak(1, 1, "Player 1: red", "SPEAK: multi\nline"),
        ];
        let msgs = meeting_messages(&log);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].text, "multi\nline");
    }

    #[test]
    fn snapshot_serializes_snake_case() {
        let (record, _publisher) = seeded();
        let json = serde_json::to_value(project(&record)).unwrap();
        assert_eq!(json["game_id"], 5);
        assert_eq!(json["status"], "initializing");
        assert_eq!(json["current_phase"], "task");
        assert!(json["is_human_turn"].is_boolean());
        assert!(json["winner"].is_null());
    }
}
