//! The Skeld: rooms and corridors.

use std::fmt;

/// A room of the map.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Room {
    Cafeteria,
    Weapons,
    Navigation,
    O2,
    Shields,
    Communications,
    Storage,
    Admin,
    Electrical,
    LowerEngine,
    Security,
    Reactor,
    UpperEngine,
    Medbay,
}

const CORRIDORS: &[(Room, Room)] = &[
    (Room::Cafeteria, Room::Weapons),
    (Room::Cafeteria, Room::Admin),
    (Room::Cafeteria, Room::UpperEngine),
    (Room::Cafeteria, Room::Medbay),
    (Room::Cafeteria, Room::Storage),
    (Room::Weapons, Room::Navigation),
    (Room::Weapons, Room::O2),
    (Room::Navigation, Room::Shields),
    (Room::Navigation, Room::O2),
    (Room::O2, Room::Shields),
    (Room::Shields, Room::Communications),
    (Room::Shields, Room::Storage),
    (Room::Communications, Room::Storage),
    (Room::Storage, Room::Admin),
    (Room::Storage, Room::Electrical),
    (Room::Storage, Room::LowerEngine),
    (Room::Electrical, Room::LowerEngine),
    (Room::LowerEngine, Room::Security),
    (Room::LowerEngine, Room::Reactor),
    (Room::LowerEngine, Room::UpperEngine),
    (Room::Security, Room::UpperEngine),
    (Room::Security, Room::Reactor),
    (Room::Reactor, Room::UpperEngine),
    (Room::UpperEngine, Room::Medbay),
];

impl Room {
    /// Where everyone spawns and where the emergency button is.
    pub const SPAWN: Room = Room::Cafeteria;

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cafeteria => "Cafeteria",
            Self::Weapons => "Weapons",
            Self::Navigation => "Navigation",
            Self::O2 => "O2",
            Self::Shields => "Shields",
            Self::Communications => "Communications",
            Self::Storage => "Storage",
            Self::Admin => "Admin",
            Self::Electrical => "Electrical",
            Self::LowerEngine => "Lower Engine",
            Self::Security => "Security",
            Self::Reactor => "Reactor",
            Self::UpperEngine => "Upper Engine",
            Self::Medbay => "Medbay",
        }
    }

    /// Rooms one corridor away, in corridor-table order.
    pub fn neighbors(self) -> Vec<Room> {
        CORRIDORS
            .iter()
            .filter_map(|&(a, b)| {
                if a == self {
                    Some(b)
                } else if b == self {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridors_are_symmetric() {
        for &(a, b) in CORRIDORS {
            assert!(a.neighbors().contains(&b));
            assert!(b.neighbors().contains(&a));
        }
    }

    #[test]
    fn every_room_is_reachable() {
        let all = [
            Room::Cafeteria,
            Room::Weapons,
            Room::Navigation,
            Room::O2,
            Room::Shields,
            Room::Communications,
            Room::Storage,
            Room::Admin,
            Room::Electrical,
            Room::LowerEngine,
            Room::Security,
            Room::Reactor,
            Room::UpperEngine,
            Room::Medbay,
        ];
        let mut seen = vec![Room::SPAWN];
        let mut frontier = vec![Room::SPAWN];
        while let Some(room) = frontier.pop() {
            for next in room.neighbors() {
                if !seen.contains(&next) {
                    seen.push(next);
                    frontier.push(next);
                }
            }
        }
        for room in all {
            assert!(seen.contains(&room), "{room} unreachable");
        }
    }

    #[test]
    fn display_uses_spaced_names() {
        assert_eq!(Room::LowerEngine.to_string(), "Lower Engine");
    }
}
