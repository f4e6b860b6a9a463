use elstat_etl::utils;
use proptest::prelude::*;

#[test]
fn column_names_round_trip() {
    assert_eq!(utils::column_number_to_name(1), "A");
    assert_eq!(utils::column_number_to_name(26), "Z");
    assert_eq!(utils::column_number_to_name(27), "AA");
    assert_eq!(utils::column_number_to_name(40), "AN");
    assert_eq!(utils::column_name_to_number("A"), Some(1));
    assert_eq!(utils::column_name_to_number("an"), Some(40));
    assert_eq!(utils::column_name_to_number(""), None);
    assert_eq!(utils::column_name_to_number("A1"), None);
}

#[test]
fn cell_addresses_read_like_a_spreadsheet() {
    assert_eq!(utils::cell_address(2, 7), "B7");
    assert_eq!(utils::cell_address(28, 3), "AB3");
}

#[test]
fn short_random_ids_use_prefix_and_alphabet() {
    let id = utils::make_short_random_id("run", 8);
    assert!(id.starts_with("run-"));
    assert_eq!(id.len(), "run-".len() + 8);
    assert!(
        id["run-".len()..]
            .chars()
            .all(|c| "23456789abcdefghijkmnpqrstuvwxyz".contains(c))
    );

    let bare = utils::make_short_random_id("", 6);
    assert_eq!(bare.len(), 6);
}

#[test]
fn fingerprint_is_stable_for_unchanged_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.xlsx");
    std::fs::write(&path, b"contents").expect("write");
    let metadata = std::fs::metadata(&path).expect("metadata");

    let first = utils::hash_path_metadata(&path, &metadata);
    let second = utils::hash_path_metadata(&path, &metadata);
    assert_eq!(first, second);
    assert!(first.starts_with("src-"));
}

#[test]
fn forward_slashes_for_windows_paths() {
    assert_eq!(
        utils::path_to_forward_slashes(std::path::Path::new(r"assets\lfs\a.xlsx")),
        "assets/lfs/a.xlsx"
    );
}

proptest! {
    #[test]
    fn column_conversion_round_trips(column in 1u32..=16384) {
        let name = utils::column_number_to_name(column);
        prop_assert_eq!(utils::column_name_to_number(&name), Some(column));
    }
}
