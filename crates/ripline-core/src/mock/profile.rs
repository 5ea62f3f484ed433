//! Disc profiles and the registry that holds them.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Profile used by the mock CLI when none is given.
pub const DEFAULT_PROFILE: &str = "big_buck_bunny";

const MIB: u64 = 1024 * 1024;

/// One title on a mocked disc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleProfile {
    pub index: usize,
    pub name: String,
    pub duration_secs: u64,
    pub size: u64,
    pub filename: String,
}

impl TitleProfile {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// A named disc template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscProfile {
    pub disc_title: String,
    pub disc_id: String,
    pub titles: Vec<TitleProfile>,
    /// Main feature index; `None` for TV discs.
    #[serde(default)]
    pub main_title: Option<usize>,
    /// When set, the rip fails at this percentage (1-99).
    #[serde(default)]
    pub fail_at_percent: Option<u8>,
}

impl DiscProfile {
    pub fn simulates_failure(&self) -> bool {
        self.fail_at_percent.is_some()
    }
}

/// Read-only set of named profiles plus the fallback returned for unknown
/// names. Built once and passed to the generator.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, DiscProfile>,
    fallback: DiscProfile,
}

#[derive(Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: BTreeMap<String, DiscProfile>,
}

impl ProfileRegistry {
    /// The three built-in discs.
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "big_buck_bunny".to_string(),
            DiscProfile {
                disc_title: "Big Buck Bunny".to_string(),
                disc_id: "BIGBUCKBUNNY".to_string(),
                titles: vec![
                    title(0, "Big Buck Bunny", 100 * MIB),
                    title(1, "Making Of", 50 * MIB),
                    title(2, "Trailer", 20 * MIB),
                ],
                main_title: Some(0),
                fail_at_percent: None,
            },
        );
        profiles.insert(
            "simpsons_s01d01".to_string(),
            DiscProfile {
                disc_title: "The Simpsons: Season 1: Disc 1".to_string(),
                disc_id: "SIMPSONS_S1D1".to_string(),
                titles: [
                    "Simpsons Roasting on an Open Fire",
                    "Bart the Genius",
                    "Homer's Odyssey",
                    "There's No Disgrace Like Home",
                    "Bart the General",
                ]
                .iter()
                .enumerate()
                .map(|(i, name)| title(i, name, 80 * MIB))
                .collect(),
                main_title: None,
                fail_at_percent: None,
            },
        );
        profiles.insert(
            "problem_disc".to_string(),
            DiscProfile {
                disc_title: "Problem Disc".to_string(),
                disc_id: "PROBLEMDISC".to_string(),
                titles: vec![title(0, "Title 00", 100 * MIB)],
                main_title: Some(0),
                fail_at_percent: Some(45),
            },
        );

        Self {
            profiles,
            fallback: DiscProfile {
                disc_title: "Default Movie".to_string(),
                disc_id: "DEFAULTMOVIE".to_string(),
                titles: vec![title(0, "Main Feature", 100 * MIB)],
                main_title: Some(0),
                fail_at_percent: None,
            },
        }
    }

    /// Built-ins extended (or overridden) by `[profiles.<name>]` tables.
    pub fn with_toml(toml_str: &str) -> Result<Self> {
        let file: ProfileFile = toml::from_str(toml_str).context("parse profile file")?;
        let mut registry = Self::builtin();
        for (name, profile) in file.profiles {
            registry.profiles.insert(name, profile);
        }
        Ok(registry)
    }

    /// Adds or replaces one profile.
    pub fn with_profile(mut self, name: &str, profile: DiscProfile) -> Self {
        self.profiles.insert(name.to_string(), profile);
        self
    }

    /// Looks up a profile, falling back to the single-title default.
    pub fn get(&self, name: &str) -> &DiscProfile {
        self.profiles.get(name).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn title(index: usize, name: &str, size: u64) -> TitleProfile {
    TitleProfile {
        index,
        name: name.to_string(),
        duration_secs: 5,
        size,
        filename: format!("title_t{:02}.mkv", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles() {
        let reg = ProfileRegistry::builtin();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, vec!["big_buck_bunny", "problem_disc", "simpsons_s01d01"]);

        let bbb = reg.get("big_buck_bunny");
        assert_eq!(bbb.titles.len(), 3);
        assert_eq!(bbb.main_title, Some(0));
        assert_eq!(bbb.titles[2].filename, "title_t02.mkv");
        assert_eq!(bbb.titles[1].size, 50 * MIB);

        let simpsons = reg.get("simpsons_s01d01");
        assert_eq!(simpsons.titles.len(), 5);
        assert_eq!(simpsons.main_title, None);

        let problem = reg.get("problem_disc");
        assert!(problem.simulates_failure());
        assert_eq!(problem.fail_at_percent, Some(45));
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        let reg = ProfileRegistry::builtin();
        let p = reg.get("no_such_disc");
        assert_eq!(p.disc_id, "DEFAULTMOVIE");
        assert_eq!(p.titles.len(), 1);
        assert_eq!(p.titles[0].name, "Main Feature");
        assert!(!reg.contains("no_such_disc"));
    }

    #[test]
    fn toml_profiles_extend_builtins() {
        let reg = ProfileRegistry::with_toml(
            r#"
            [profiles.short_film]
            disc_title = "Short Film"
            disc_id = "SHORTFILM"
            main_title = 0

            [[profiles.short_film.titles]]
            index = 0
            name = "Feature"
            duration_secs = 600
            size = 1048576
            filename = "title_t00.mkv"
            "#,
        )
        .unwrap();
        assert!(reg.contains("short_film"));
        assert!(reg.contains("big_buck_bunny"));
        let p = reg.get("short_film");
        assert_eq!(p.titles[0].duration(), Duration::from_secs(600));
        assert!(!p.simulates_failure());
    }
}
