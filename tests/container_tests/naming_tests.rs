//! Tests for physical naming

use fsstore::naming::{
    is_managed, is_temp, physical_name, PhysicalName, DIGEST_HEX_LEN, MANAGED_SUFFIX,
};

#[test]
fn test_physical_name_is_deterministic() {
    assert_eq!(physical_name("a.txt"), physical_name("a.txt"));
    assert_eq!(
        PhysicalName::from_logical("report.pdf"),
        physical_name("report.pdf")
    );
}

#[test]
fn test_physical_name_shape() {
    let name = physical_name("a.txt");
    let s = name.as_str();

    assert_eq!(s.len(), DIGEST_HEX_LEN + MANAGED_SUFFIX.len());
    assert!(s.ends_with(".fs"));

    let digest = &s[..DIGEST_HEX_LEN];
    assert!(digest
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn test_physical_name_known_digest() {
    // sha256("abc")
    assert_eq!(
        physical_name("abc").as_str(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.fs"
    );
}

#[test]
fn test_empty_name_has_physical_name() {
    // sha256("")
    assert_eq!(
        physical_name("").as_str(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.fs"
    );
}

#[test]
fn test_distinct_names_map_apart() {
    assert_ne!(physical_name("a.txt"), physical_name("b.txt"));
    assert_ne!(physical_name("a.txt"), physical_name("A.txt"));
    assert_ne!(physical_name("dir/a.txt"), physical_name("a.txt"));
}

#[test]
fn test_display_matches_as_str() {
    let name = physical_name("a.txt");
    assert_eq!(name.to_string(), name.as_str());
}

#[test]
fn test_temp_file_name() {
    let name = physical_name("a.txt");
    let temp = name.temp_file_name();

    assert_eq!(temp, format!("{}.tmp", name));
    assert!(is_temp(&temp));
    assert!(!is_managed(&temp));
}

#[test]
fn test_is_managed() {
    assert!(is_managed(physical_name("a.txt").as_str()));
    assert!(is_managed("x.fs"));

    assert!(!is_managed(".fs"));
    assert!(!is_managed("a.txt"));
    assert!(!is_managed("a.fs.tmp"));
    assert!(!is_managed("a.FS"));
}

#[test]
fn test_is_temp() {
    assert!(is_temp("x.fs.tmp"));

    assert!(!is_temp(".fs.tmp"));
    assert!(!is_temp("x.tmp"));
    assert!(!is_temp("x.fs"));
}

#[test]
fn test_from_file_name() {
    let physical = physical_name("a.txt");

    assert_eq!(PhysicalName::from_file_name(physical.as_str()), Some(physical));
    assert_eq!(PhysicalName::from_file_name("notes.txt"), None);
    assert_eq!(PhysicalName::from_file_name("x.fs.tmp"), None);
}
