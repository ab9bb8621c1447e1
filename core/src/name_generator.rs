//! Deterministic customer identity fields drawn from curated lists.
//!
//! All generation is deterministic (same RNG stream = same names).

use crate::rng::DataRng;

/// City and its two-letter state code.
pub type CityState = (&'static str, &'static str);

pub struct NameGenerator;

impl NameGenerator {
    /// "First Last", both drawn from the curated lists.
    pub fn full_name(rng: &mut DataRng) -> String {
        let first = Self::pick(rng, FIRST_NAMES);
        let last = Self::pick(rng, LAST_NAMES);
        format!("{first} {last}")
    }

    pub fn city_state(rng: &mut DataRng) -> CityState {
        Self::pick(rng, CITIES)
    }

    /// Lower-case mailbox derived from the name and a stable id.
    pub fn email(full_name: &str, customer_id: u64) -> String {
        let local: String = full_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(".")
            .to_lowercase();
        format!("{local}.{customer_id}@example.com")
    }

    fn pick<T: Copy>(rng: &mut DataRng, items: &[T]) -> T {
        items[rng.index(items.len())]
    }
}

const FIRST_NAMES: &[&str] = &[
    "Amelia", "Ben", "Carla", "Dmitri", "Elena", "Farid", "Grace", "Hiro",
    "Ines", "Jonas", "Keisha", "Liam", "Mara", "Nikhil", "Olga", "Pablo",
    "Quinn", "Rosa", "Samir", "Tanya", "Umar", "Vera", "Wes", "Ximena",
    "Yusuf", "Zoe", "Aaron", "Bianca", "Caleb", "Daria", "Emeka", "Fiona",
    "Gustavo", "Hana", "Ivan", "Julia", "Kofi", "Lena", "Mateo", "Nora",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Baptiste", "Castillo", "Dubois", "Eriksen", "Fujita", "Gallagher",
    "Haddad", "Iyer", "Jaramillo", "Kowalski", "Lindqvist", "Moreau", "Nakamura",
    "Okafor", "Petrov", "Quintero", "Rasmussen", "Santos", "Takahashi", "Ueda",
    "Varga", "Whitfield", "Xu", "Yilmaz", "Zimmerman", "Adeyemi", "Brennan",
    "Chaudhry", "Delgado", "Esposito", "Fitzgerald",
];

const CITIES: &[CityState] = &[
    ("New York", "NY"),
    ("Los Angeles", "CA"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("Philadelphia", "PA"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    #[test]
    fn name_generation_is_deterministic() {
        let mut rng1 = RngBank::new(12345).stream(StreamSlot::Generator);
        let mut rng2 = RngBank::new(12345).stream(StreamSlot::Generator);
        assert_eq!(NameGenerator::full_name(&mut rng1), NameGenerator::full_name(&mut rng2));
    }

    #[test]
    fn generates_two_part_names() {
        let mut rng = RngBank::new(12345).stream(StreamSlot::Generator);
        for _ in 0..100 {
            let name = NameGenerator::full_name(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert_eq!(parts.len(), 2, "Name should have exactly 2 parts: {name}");
        }
    }

    #[test]
    fn email_is_lowercase_and_unique_per_id() {
        assert_eq!(NameGenerator::email("Mara Okafor", 12), "mara.okafor.12@example.com");
        assert_ne!(NameGenerator::email("Mara Okafor", 12), NameGenerator::email("Mara Okafor", 13));
    }
}
