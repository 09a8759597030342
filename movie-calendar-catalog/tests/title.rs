use chrono::NaiveDate;
use movie_calendar_catalog::title::{
    clean_title, identity_key, parse_title, record_id, search_candidates,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn record_id_is_deterministic() {
    let a = record_id("Test Movie", date(2024, 1, 24));
    let b = record_id("Test Movie", date(2024, 1, 24));
    assert_eq!(a, b);
    assert_eq!(a, "testmovie_2024-01-24");
}

#[test]
fn record_id_differs_by_date() {
    assert_ne!(
        record_id("Test Movie", date(2024, 1, 24)),
        record_id("Test Movie", date(2024, 1, 25))
    );
}

#[test]
fn diacritics_are_stripped() {
    assert_eq!(identity_key("Amélie"), "amelie");
    assert_eq!(identity_key("Pokémon Detective Pikachu"), "pokemondetectivepikachu");
    assert_eq!(identity_key("Señor Niño"), "senornino");
}

#[test]
fn underscore_is_retained() {
    assert_eq!(identity_key("Project_X"), "project_x");
}

#[test]
fn trailing_annotation_removed() {
    assert_eq!(clean_title("Dune: Part Two [IMAX]"), "Dune: Part Two");
    assert_eq!(clean_title("Dune: Part Two"), "Dune: Part Two");
}

#[test]
fn parse_title_trims_and_normalizes() {
    let p = parse_title("  Wicked [Limited] ");
    assert_eq!(p.raw, "Wicked [Limited]");
    assert_eq!(p.clean, "Wicked");
    assert_eq!(p.identity, "wicked");
}

#[test]
fn plain_title_has_single_candidate() {
    assert_eq!(search_candidates("Heist"), vec!["Heist"]);
}

#[test]
fn colon_clause_adds_base_candidate() {
    assert_eq!(
        search_candidates("Dune: Part Two"),
        vec!["Dune: Part Two", "Dune"]
    );
}

#[test]
fn dash_clause_adds_base_candidate() {
    assert_eq!(
        search_candidates("Mission - Impossible"),
        vec!["Mission - Impossible", "Mission"]
    );
}

#[test]
fn possessive_prefix_adds_stripped_candidate() {
    assert_eq!(
        search_candidates("Tyler Perry's Madea: Homecoming"),
        vec![
            "Tyler Perry's Madea: Homecoming",
            "Tyler Perry's Madea",
            "Madea",
        ]
    );
}

#[test]
fn curly_apostrophe_possessive_is_stripped() {
    assert_eq!(
        search_candidates("Guillermo del Toro’s Pinocchio"),
        vec!["Guillermo del Toro’s Pinocchio", "Pinocchio"]
    );
}

#[test]
fn numeric_entity_is_stripped() {
    assert_eq!(
        search_candidates("Heist&#8482;"),
        vec!["Heist&#8482;", "Heist"]
    );
}

#[test]
fn empty_title_has_no_candidates() {
    assert!(search_candidates("   ").is_empty());
}
