//! Generator tests: transcripts are decoded back with the real parser.

use proptest::prelude::*;
use tempfile::tempdir;

use super::*;
use crate::protocol::DiscParser;

fn run_mkv(registry: &ProfileRegistry, profile: &str, opts: MockOptions) -> (String, RipOutcome) {
    let dir = tempdir().unwrap();
    let mut buf = Vec::new();
    let outcome = MockRipper::new(registry, opts)
        .mkv(profile, &TitleSelection::All, dir.path(), &mut buf)
        .unwrap();
    (String::from_utf8(buf).unwrap(), outcome)
}

fn parse(transcript: &str) -> DiscParser {
    let mut p = DiscParser::new();
    p.feed_str(transcript);
    p
}

#[test]
fn failure_step_handles_large_step_counts() {
    assert_eq!(failure_step(100, 45), 45);
    assert_eq!(failure_step(100, 0), 1);
    assert_eq!(failure_step(100, 100), 100);
    assert_eq!(failure_step(3, 10), 1);
    assert_eq!(failure_step(50_000_000, 45), 22_500_000);
    assert_eq!(failure_step(u32::MAX, 99), (u64::from(u32::MAX) * 99 / 100) as u32);
}

#[test]
fn info_describes_disc() {
    let reg = ProfileRegistry::builtin();
    let mut buf = Vec::new();
    MockRipper::new(&reg, MockOptions::default())
        .info("simpsons_s01d01", &mut buf)
        .unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("MSG:1005,"));
    let p = parse(&text);
    assert_eq!(p.disc().name, "The Simpsons: Season 1: Disc 1");
    assert_eq!(p.disc().id, "SIMPSONS_S1D1");
    assert_eq!(p.disc().title_count, 5);
    assert_eq!(p.disc().titles[3].name, "There's No Disgrace Like Home");
    assert!(!p.is_complete());
}

#[test]
fn big_buck_bunny_rip_completes() {
    let reg = ProfileRegistry::builtin();
    let (text, outcome) = run_mkv(&reg, "big_buck_bunny", MockOptions::default());
    assert!(outcome.is_success());
    assert_eq!(outcome.titles_saved, 3);

    let p = parse(&text);
    assert_eq!(p.disc().title_count, 3);
    assert_eq!(p.disc().titles.len(), 3);
    assert_eq!(p.completion_count(), 1);
    assert!(p.failures().is_empty());
    assert_eq!(p.overall_progress(), 100);
    assert!(text.trim_end().ends_with("\"Copy complete. 3 titles saved.\""));
    // 11 PRGV lines per title
    assert_eq!(text.lines().filter(|l| l.starts_with("PRGV:")).count(), 33);
}

#[test]
fn problem_disc_fails_without_completion() {
    let reg = ProfileRegistry::builtin();
    let (text, outcome) = run_mkv(&reg, "problem_disc", MockOptions::default());
    assert!(!outcome.is_success());
    assert_eq!(outcome.failure.as_deref(), Some("simulated read error at 45%"));

    let p = parse(&text);
    assert_eq!(p.disc().title_count, 1);
    assert_eq!(p.completion_count(), 0);
    assert_eq!(p.failures(), vec!["Copy failed", "Read error at 45%"]);
    assert_eq!(p.last_progress(), Some(45));
}

#[test]
fn selection_limits_titles_and_placeholders() {
    let reg = ProfileRegistry::builtin();
    let dir = tempdir().unwrap();
    let opts = MockOptions {
        materialize: Materialize::Placeholder,
        ..MockOptions::default()
    };
    let mut buf = Vec::new();
    let outcome = MockRipper::new(&reg, opts)
        .mkv(
            "big_buck_bunny",
            &TitleSelection::parse("0,2").unwrap(),
            dir.path(),
            &mut buf,
        )
        .unwrap();
    assert_eq!(outcome.titles_saved, 2);
    assert!(dir.path().join("title_t00.mkv").exists());
    assert!(!dir.path().join("title_t01.mkv").exists());
    assert!(dir.path().join("title_t02.mkv").exists());
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("\"Saving title 2 of 2\""));
}

#[test]
fn title_selection_parse() {
    assert_eq!(TitleSelection::parse("all").unwrap(), TitleSelection::All);
    assert_eq!(TitleSelection::parse("ALL").unwrap(), TitleSelection::All);
    assert_eq!(
        TitleSelection::parse("1, 3").unwrap(),
        TitleSelection::Indices(vec![1, 3])
    );
    assert!(TitleSelection::parse("one").is_err());
}

#[test]
fn unknown_profile_still_produces_transcript() {
    let reg = ProfileRegistry::builtin();
    let (text, outcome) = run_mkv(&reg, "mystery", MockOptions::default());
    assert!(outcome.is_success());
    let p = parse(&text);
    assert_eq!(p.disc().id, "DEFAULTMOVIE");
    assert_eq!(p.completion_count(), 1);
}

fn profile_strategy() -> impl Strategy<Value = DiscProfile> {
    prop::collection::vec(("[A-Za-z][A-Za-z0-9 ]{0,20}", 1u64..20_000, 0u64..(1 << 36)), 1..8)
        .prop_map(|titles| DiscProfile {
            disc_title: "Generated".to_string(),
            disc_id: "GENERATED".to_string(),
            titles: titles
                .into_iter()
                .enumerate()
                .map(|(index, (name, duration_secs, size))| TitleProfile {
                    index,
                    name,
                    duration_secs,
                    size,
                    filename: format!("title_t{:02}.mkv", index),
                })
                .collect(),
            main_title: Some(0),
            fail_at_percent: None,
        })
}

fn registry_with(name: &str, profile: DiscProfile) -> ProfileRegistry {
    ProfileRegistry::builtin().with_profile(name, profile)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_clean_rip_decodes_every_title(profile in profile_strategy()) {
        let n = profile.titles.len();
        let reg = registry_with("generated", profile.clone());
        let (text, outcome) = run_mkv(&reg, "generated", MockOptions::default());
        prop_assert!(outcome.is_success());

        let first = parse(&text);
        prop_assert_eq!(first.disc().titles.len(), n);
        prop_assert_eq!(first.disc().title_count as usize, n);
        prop_assert_eq!(first.completion_count(), 1);
        for (decoded, original) in first.disc().titles.iter().zip(&profile.titles) {
            prop_assert_eq!(&decoded.name, &original.name);
            prop_assert_eq!(decoded.duration, original.duration());
        }

        let second = parse(&text);
        prop_assert_eq!(first.disc(), second.disc());
        prop_assert_eq!(first.messages(), second.messages());
    }

    #[test]
    fn prop_failure_stops_at_or_below_threshold(p in 1u8..=99) {
        let mut profile = ProfileRegistry::builtin().get("problem_disc").clone();
        profile.fail_at_percent = Some(p);
        let reg = registry_with("failing", profile);
        let (text, outcome) = run_mkv(&reg, "failing", MockOptions::default());
        prop_assert!(!outcome.is_success());

        let parsed = parse(&text);
        prop_assert_eq!(parsed.completion_count(), 0);
        prop_assert_eq!(parsed.failures().len(), 2);
        let last = parsed.last_progress().unwrap_or(0);
        prop_assert!(last > 0 && last <= p, "last progress {} for p={}", last, p);
    }
}
