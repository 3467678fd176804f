//! Avatar-keyed obstacle palettes
//!
//! The player's chosen avatar only changes which sprite set enemies are drawn
//! from. Unknown or missing avatars fall back to the default palette.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::host::AvatarId;

/// Enemy sprite tags for one avatar theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub enemies: &'static [&'static str],
}

impl Palette {
    /// Random enemy tag from this palette
    pub fn pick(&self, rng: &mut Pcg32) -> &'static str {
        self.enemies[rng.random_range(0..self.enemies.len())]
    }

    /// Enemy tag by position, wrapping around the set
    pub fn nth(&self, i: usize) -> &'static str {
        self.enemies[i % self.enemies.len()]
    }
}

pub static DEFAULT_PALETTE: Palette = Palette {
    name: "classic",
    enemies: &["ghost", "bat", "slime"],
};

static PALETTES: [(&str, Palette); 4] = [
    (
        "cat",
        Palette {
            name: "backyard",
            enemies: &["dog", "vacuum", "cucumber"],
        },
    ),
    (
        "robot",
        Palette {
            name: "factory",
            enemies: &["magnet", "drone", "spark"],
        },
    ),
    (
        "wizard",
        Palette {
            name: "dungeon",
            enemies: &["skeleton", "imp", "wisp"],
        },
    ),
    (
        "astronaut",
        Palette {
            name: "orbit",
            enemies: &["asteroid", "ufo", "comet"],
        },
    ),
];

/// Palette for an avatar, or the default when unknown
pub fn palette_for(avatar: Option<&AvatarId>) -> &'static Palette {
    let Some(avatar) = avatar else {
        return &DEFAULT_PALETTE;
    };
    match PALETTES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(avatar.as_str()))
    {
        Some((_, palette)) => palette,
        None => {
            log::debug!("Unknown avatar '{}', using default palette", avatar);
            &DEFAULT_PALETTE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_known_avatar() {
        let avatar = AvatarId::from("Robot");
        assert_eq!(palette_for(Some(&avatar)).name, "factory");
    }

    #[test]
    fn test_unknown_avatar_falls_back() {
        let avatar = AvatarId::from("dragon");
        assert_eq!(palette_for(Some(&avatar)), &DEFAULT_PALETTE);
        assert_eq!(palette_for(None), &DEFAULT_PALETTE);
    }

    #[test]
    fn test_pick_stays_in_palette() {
        let mut rng = Pcg32::seed_from_u64(9);
        let palette = palette_for(Some(&AvatarId::from("cat")));
        for _ in 0..20 {
            assert!(palette.enemies.contains(&palette.pick(&mut rng)));
        }
    }
}
