//! Default roster.
//!
//! Seeded into an empty staff collection and used as the wizard's fallback when the
//! store cannot be reached.

use crate::staff::{NewStaff, StaffId, StaffMember};

/// `(last name, first name, phone)` for each default staff member, all RNs.
pub const DEFAULT_ROSTER: [(&str, &str, &str); 38] = [
    ("Hamathka", "Zoey", "78274"),
    ("Parker", "Paz", "75284"),
    ("Jones", "A+B", "78278"),
    ("Hollis", "", "78229"),
    ("Buchanan", "Hannah", "78274"),
    ("Horace", "Oreggia", "78287"),
    ("Marcelin", "Brooke", "73571"),
    ("Lamothe", "", "78287"),
    ("Paz", "Taylor", "75284"),
    ("Druhot", "Trica", "78283"),
    ("Gruner", "", "72027"),
    ("Corry", "Karla", "73665"),
    ("Cassie", "", "78270"),
    ("Madison", "", "78287"),
    ("Cindy", "", "78278"),
    ("Shelton", "Mosley", "75410"),
    ("Arwood", "Laudel", "80153"),
    ("Chatman", "", "6444"),
    ("Asuman", "", "A3029"),
    ("Smith", "", "1804"),
    ("Lusung", "", "6727"),
    ("Young", "", "7879"),
    ("Ford", "", "5896"),
    ("Powell", "", "3777"),
    ("Azor", "Nola", "0759"),
    ("Piercy", "", "6362"),
    ("Hulsey", "", "6192"),
    ("OConnor", "Meredith", "1633"),
    ("Thompson", "", "6443"),
    ("Dye", "", "4899"),
    ("Clemans", "Samantha", "73676"),
    ("Kelsey", "", "78277"),
    ("Rachel", "", "78243"),
    ("Lise", "", "79961"),
    ("Jerica", "", "75289"),
    ("Catrina", "", "78288"),
    ("MedinaPerez", "", "29038"),
    ("Anna", "", "78268"),
];

/// The default roster as records ready to insert.
pub fn seed_records() -> Vec<NewStaff> {
    DEFAULT_ROSTER
        .iter()
        .map(|(last, first, phone)| NewStaff::with_name(last, first, phone))
        .collect()
}

/// The default roster with synthetic ids (`default-1`..), in roster order.
pub fn fallback_roster() -> Vec<StaffMember> {
    seed_records()
        .into_iter()
        .enumerate()
        .map(|(i, new)| StaffMember {
            id: StaffId::new(format!("default-{}", i + 1)),
            last_name: new.last_name,
            first_name: new.first_name,
            phone: new.phone,
            extension: new.extension,
            role: new.role,
            shift: new.shift,
            is_preceptee: new.is_preceptee,
            is_traveler: new.is_traveler,
            is_charge_nurse: new.is_charge_nurse,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffing_types::StaffShift;

    #[test]
    fn test_seed_records_use_add_defaults() {
        let records = seed_records();
        assert_eq!(records.len(), 38);
        assert!(records.iter().all(|r| r.role == "RN" && r.shift == StaffShift::Unset));
        assert!(records.iter().all(|r| !r.is_charge_nurse && !r.is_preceptee));
    }

    #[test]
    fn test_fallback_ids_are_distinct() {
        let roster = fallback_roster();
        assert_eq!(roster[0].id.as_str(), "default-1");
        assert_eq!(roster[37].last_name, "Anna");

        let mut ids: Vec<&str> = roster.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 38);
    }
}
