//! Deterministic roster fixtures.
//!
//! The generator cycles fixed name/school/game tables so a roster of any
//! size is reproducible across runs; tests and the demo CLI rely on that.

use model::{GameProfile, PlayerResult, SchoolType};

const TAG_PREFIXES: &[&str] = &[
    "ace", "nova", "viper", "blitz", "ghost", "pixel", "rogue", "zenith", "frost", "ember",
];
const TAG_SUFFIXES: &[&str] = &["player", "x", "gg", "one", "prime", "zero"];
const FIRST_NAMES: &[&str] = &["Jordan", "Casey", "Riley", "Morgan", "Avery", "Quinn", "Dakota"];
const LAST_NAMES: &[&str] = &["Lee", "Nguyen", "Garcia", "Smith", "Patel", "Kim", "Okafor"];
const SCHOOLS: &[(&str, SchoolType)] = &[
    ("Northview High", SchoolType::HighSchool),
    ("Lakeside Academy", SchoolType::Academy),
    ("Cedar Valley JC", SchoolType::JuniorCollege),
    ("State University", SchoolType::University),
];
const LOCATIONS: &[&str] = &["Austin, TX", "Seattle, WA", "Atlanta, GA", "Columbus, OH"];
const GAMES: &[(&str, &[&str])] = &[
    ("valorant", &["duelist", "controller", "igl"]),
    ("league", &["jungle", "support", "mid"]),
    ("rocket-league", &["striker", "anchor"]),
];
const PLAY_STYLES: &[&str] = &["aggressive", "anchor", "flex", "shotcaller"];
const RANKS: &[&str] = &["Gold", "Platinum", "Diamond", "Immortal"];

/// Generate `count` players with ids `1..=count`.
pub fn generate(count: usize) -> Vec<PlayerResult> {
    (1..=count as u64).map(player).collect()
}

/// Build the fixture player for an id. Deterministic in `id`.
pub fn player(id: u64) -> PlayerResult {
    let i = (id - 1) as usize;
    let (school, school_type) = SCHOOLS[i % SCHOOLS.len()];
    let (game, roles) = GAMES[i % GAMES.len()];

    let mut profiles = vec![GameProfile {
        game: game.to_string(),
        role: roles[i % roles.len()].to_string(),
        play_style: PLAY_STYLES[i % PLAY_STYLES.len()].to_string(),
        rank: RANKS[i % RANKS.len()].to_string(),
        hours_played: 200 + (i as u32 % 17) * 90,
    }];
    // Every third player carries a secondary game profile
    if i % 3 == 0 {
        let (alt_game, alt_roles) = GAMES[(i + 1) % GAMES.len()];
        profiles.push(GameProfile {
            game: alt_game.to_string(),
            role: alt_roles[i % alt_roles.len()].to_string(),
            play_style: PLAY_STYLES[(i + 2) % PLAY_STYLES.len()].to_string(),
            rank: RANKS[i % 2].to_string(),
            hours_played: 80 + (i as u32 % 11) * 40,
        });
    }

    PlayerResult {
        id,
        gamertag: format!(
            "{}{}{}",
            TAG_PREFIXES[i % TAG_PREFIXES.len()],
            TAG_SUFFIXES[i % TAG_SUFFIXES.len()],
            id
        ),
        real_name: format!(
            "{} {}",
            FIRST_NAMES[i % FIRST_NAMES.len()],
            LAST_NAMES[i % LAST_NAMES.len()]
        ),
        class_year: 2025 + (i as u16 % 4),
        gpa: 2.0 + (i as f32 % 21.0) * 0.1,
        school: school.to_string(),
        school_type,
        location: LOCATIONS[i % LOCATIONS.len()].to_string(),
        is_favorited: false,
        profiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate(50), generate(50));
    }

    #[test]
    fn ids_are_sequential_and_unique() {
        let roster = generate(25);
        for (i, p) in roster.iter().enumerate() {
            assert_eq!(p.id, i as u64 + 1);
        }
    }

    #[test]
    fn gpa_stays_in_plausible_range() {
        for p in generate(100) {
            assert!(p.gpa >= 2.0 && p.gpa <= 4.1, "gpa {} for {}", p.gpa, p.gamertag);
        }
    }
}
