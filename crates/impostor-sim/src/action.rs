//! Moves a seat can make.

use impostor_core::ActionOption;

use crate::map::Room;
use crate::seat::Seat;

/// A move. Seat references are indices into the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Walk to an adjacent room.
    Move(Room),
    /// Do one task in the current room.
    CompleteTask,
    /// Kill a crewmate in the same room.
    Kill(usize),
    /// Report a body in the same room.
    Report(usize),
    /// Press the emergency button.
    CallMeeting,
    /// Stay put.
    Wait,
    /// Say something during a meeting.
    Speak,
    /// Vote to eject a seat.
    Vote(usize),
    /// Vote to eject nobody.
    SkipVote,
}

impl Action {
    /// Display name, as offered to the player.
    pub fn label(self, seats: &[Seat], here: Room) -> String {
        match self {
            Self::Move(room) => format!("MOVE from {here} to {room}"),
            Self::CompleteTask => format!("COMPLETE TASK in {here}"),
            Self::Kill(target) => format!("KILL {}", seats[target].name),
            Self::Report(body) => format!("REPORT DEAD BODY of {}", seats[body].name),
            Self::CallMeeting => "CALL MEETING using the emergency button".to_owned(),
            Self::Wait => "WAIT".to_owned(),
            Self::Speak => "SPEAK".to_owned(),
            Self::Vote(target) => format!("VOTE {}", seats[target].name),
            Self::SkipVote => "SKIP VOTE".to_owned(),
        }
    }

    /// Option offered to the player.
    pub fn option(self, seats: &[Seat], here: Room) -> ActionOption {
        let label = self.label(seats, here);
        if self == Self::Speak {
            ActionOption::with_message(label)
        } else {
            ActionOption::new(label)
        }
    }

    /// Activity-log rendering of the move once made.
    pub fn render(self, seats: &[Seat], here: Room, message: &str) -> String {
        match self {
            Self::Speak => format!("SPEAK: {message}"),
            other => other.label(seats, here),
        }
    }

    /// Whether the move ends the task phase with a meeting.
    pub fn starts_meeting(self) -> bool {
        matches!(self, Self::Report(_) | Self::CallMeeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::Role;

    fn seats() -> Vec<Seat> {
        vec![
            Seat::new(1, "red", Role::Impostor),
            Seat::new(2, "blue", Role::Crewmate),
        ]
    }

    #[test]
    fn labels() {
        let s = seats();
        assert_eq!(
            Action::Move(Room::Admin).label(&s, Room::Cafeteria),
            "MOVE from Cafeteria to Admin"
        );
        assert_eq!(Action::Kill(1).label(&s, Room::Admin), "KILL Player 2: blue");
        assert_eq!(Action::Vote(0).label(&s, Room::Admin), "VOTE Player 1: red");
    }

    #[test]
    fn only_speech_takes_a_message() {
        let s = seats();
        assert!(Action::Speak.option(&s, Room::Admin).requires_message);
        assert!(!Action::Wait.option(&s, Room::Admin).requires_message);
    }

    #[test]
    fn speech_renders_with_text() {
        let s = seats();
        assert_eq!(
            Action::Speak.render(&s, Room::Admin, "where were you?"),
            "SPEAK: where were you?"
        );
        assert_eq!(Action::SkipVote.render(&s, Room::Admin, "ignored"), "SKIP VOTE");
    }

    #[test]
    fn meeting_starters() {
        assert!(Action::CallMeeting.starts_meeting());
        assert!(Action::Report(0).starts_meeting());
        assert!(!Action::Kill(0).starts_meeting());
    }
}
