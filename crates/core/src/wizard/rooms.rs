//! The unit's fixed rooms.

use serde::Serialize;

/// A room patients and staff can be assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: &'static str,
    pub name: &'static str,
    /// Phone extension; empty when the room has none.
    pub ext: &'static str,
    /// Advisory capacity note shown while assigning.
    pub note: Option<&'static str>,
}

impl Room {
    /// `Name ext. 12345`, or just the name when there is no extension.
    pub fn heading(&self) -> String {
        if self.ext.is_empty() {
            self.name.to_string()
        } else {
            format!("{} ext. {}", self.name, self.ext)
        }
    }
}

const INTERMEDIATE_NOTE: Option<&str> = Some("Part of Intermediate area (9 babies total across 3 rooms)");

/// The overflow room, only in play while it is open.
pub const OVERFLOW_ROOM_ID: &str = "specialcare5";

/// Rooms in the main grid of the printed sheet.
pub const MAIN_GRID_LEN: usize = 9;

pub const ROOMS: [Room; 15] = [
    Room { id: "room1", name: "Room 1", ext: "21124", note: None },
    Room { id: "room2", name: "Room 2", ext: "21124", note: None },
    Room { id: "room3", name: "Room 3", ext: "21128", note: None },
    Room { id: "room4", name: "Room 4", ext: "21125", note: None },
    Room { id: "room5", name: "Room 5", ext: "21125", note: None },
    Room { id: "room6", name: "Room 6", ext: "21126", note: None },
    Room { id: "room7", name: "Room 7", ext: "21126", note: None },
    Room { id: "room8", name: "Room 8", ext: "21126", note: None },
    Room { id: "procedure", name: "Procedure Room", ext: "", note: None },
    Room { id: "intermediate1", name: "Intermediate 1", ext: "21130", note: INTERMEDIATE_NOTE },
    Room { id: "intermediate2", name: "Intermediate 2", ext: "21130", note: INTERMEDIATE_NOTE },
    Room { id: "intermediate3", name: "Intermediate 3", ext: "21129", note: INTERMEDIATE_NOTE },
    Room { id: "nest", name: "Nest", ext: "36036", note: None },
    Room { id: "loft", name: "Loft", ext: "36036", note: None },
    Room { id: OVERFLOW_ROOM_ID, name: "Special Care 5", ext: "38558", note: Some("Holds up to 4 babies") },
];

/// Rooms in fixed order, without the overflow room unless it is open.
pub fn rooms_in_play(overflow_open: bool) -> impl Iterator<Item = &'static Room> {
    ROOMS
        .iter()
        .filter(move |room| overflow_open || room.id != OVERFLOW_ROOM_ID)
}

pub fn room_count(overflow_open: bool) -> usize {
    rooms_in_play(overflow_open).count()
}

pub fn find_room(id: &str) -> Option<&'static Room> {
    ROOMS.iter().find(|room| room.id == id)
}
