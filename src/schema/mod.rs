//! Decoded Log Records
//!
//! Well-typed records produced by the log decoder. The playback engine
//! consumes these and never sees the binary wire format.
//!
//! ## Module Structure
//!
//! - `header`: game header, match header, map and spawn records
//! - `round`: per-round deltas and per-turn records
//! - `action`: the action union attached to turns
//! - `footer`: match and game footers

pub mod header;
pub mod round;
pub mod action;
pub mod footer;

use serde::{Serialize, Deserialize};

pub use header::{
    BodyId, GameHeader, MapRecord, MatchHeader, RobotKind, RobotKindMetadata,
    SpawnRecord, TeamData, TeamId, NEUTRAL_TEAM, PLAYER_TEAMS,
};
pub use round::{RoundDelta, TeamRoundTotals, TurnRecord};
pub use action::{ActionRecord, DieCause};
pub use footer::{
    GameFooter, MatchFooter, ProfileRecord, ProfilerEventRecord, ProfilerFileRecord,
    TimelineMarkerRecord, WinType,
};

/// One entry of the event stream, in log order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    /// Start of the game
    GameHeader(GameHeader),
    /// Start of a match
    MatchHeader(MatchHeader),
    /// One round of the current match
    Round(RoundDelta),
    /// End of the current match
    MatchFooter(MatchFooter),
    /// End of the game
    GameFooter(GameFooter),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vector;

    #[test]
    fn test_event_json_shape() {
        let event = Event::Round(RoundDelta {
            round_id: 1,
            turns: vec![TurnRecord::idle(7, Vector::new(1, 2), 10)
                .with_action(ActionRecord::CheesePickup { loc: Vector::new(1, 2) })],
            died_ids: vec![],
            team_totals: vec![],
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"Round\""));
        assert!(json.contains("\"type\":\"CheesePickup\""));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_turn_defaults_when_fields_missing() {
        let json = r#"{
            "robot_id": 3, "pos": {"x": 0, "y": 0}, "dir": "North", "health": 5,
            "move_cooldown": 0, "action_cooldown": 0, "turning_cooldown": 0,
            "bytecodes_used": 12
        }"#;
        let turn: TurnRecord = serde_json::from_str(json).unwrap();
        assert!(turn.actions.is_empty());
        assert_eq!(turn.cheese, None);
        assert!(!turn.is_cooperation);
    }

    #[test]
    fn test_default_game_header_has_all_kinds() {
        let header = GameHeader::default();
        assert_eq!(header.teams.len(), 2);
        assert_eq!(header.robot_kinds.len(), RobotKind::ALL.len());
        assert_eq!(RobotKindMetadata::stock(RobotKind::Cat).base_health, 500);
    }
}
