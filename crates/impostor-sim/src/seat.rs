//! Seats at the table.

use std::fmt;

use crate::map::Room;

/// Player colors, in dealing order.
pub const COLORS: &[&str] = &[
    "red", "blue", "green", "pink", "orange", "yellow", "black", "white", "purple", "brown",
    "cyan", "lime",
];

/// Secret role of a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Does tasks, finds the impostors.
    Crewmate,
    /// Kills crewmates, blends in.
    Impostor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crewmate => write!(f, "crewmate"),
            Self::Impostor => write!(f, "impostor"),
        }
    }
}

/// One player and its private state.
#[derive(Clone, Debug)]
pub struct Seat {
    /// Display name, `Player <n>: <color>`.
    pub name: String,
    /// Color.
    pub color: &'static str,
    /// Secret role.
    pub role: Role,
    /// Current room.
    pub room: Room,
    /// Whether still in the game.
    pub alive: bool,
    /// Whether the seat is driven by the external human.
    pub human: bool,
    /// Tasks still to do (crewmates only).
    pub tasks_left: u32,
    /// Emergency meetings this seat may still call.
    pub buttons_left: u32,
    /// Timesteps until the next kill is allowed (impostors only).
    pub cooldown: u32,
    /// For dead seats: whether the body was already found.
    pub body_reported: bool,
}

impl Seat {
    /// Fresh seat at spawn.
    pub fn new(number: usize, color: &'static str, role: Role) -> Self {
        Self {
            name: format!("Player {number}: {color}"),
            color,
            role,
            room: Room::SPAWN,
            alive: true,
            human: false,
            tasks_left: 0,
            buttons_left: 0,
            cooldown: 0,
            body_reported: false,
        }
    }

    /// Alive impostor.
    pub fn is_live_impostor(&self) -> bool {
        self.alive && self.role == Role::Impostor
    }

    /// Alive crewmate.
    pub fn is_live_crewmate(&self) -> bool {
        self.alive && self.role == Role::Crewmate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_name_format() {
        let seat = Seat::new(3, "green", Role::Crewmate);
        assert_eq!(seat.name, "Player 3: green");
        assert_eq!(seat.room, Room::Cafeteria);
        assert!(seat.is_live_crewmate());
        assert!(!seat.is_live_impostor());
    }

    #[test]
    fn dead_seats_are_neither() {
        let mut seat = Seat::new(1, "red", Role::Impostor);
        assert!(seat.is_live_impostor());
        seat.alive = false;
        assert!(!seat.is_live_impostor());
        assert!(!seat.is_live_crewmate());
    }
}
