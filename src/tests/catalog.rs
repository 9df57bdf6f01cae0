use std::io::Write;

use crate::catalog::{Catalog, Item};
use crate::selector::parse;

fn glossary() -> Catalog {
    Catalog::from_json(
        r##"[
            {"name": "android", "tags": ["#Science_Fiction", "#robots"]},
            {"name": "dragon", "tags": ["#fantasy"]},
            {"name": "warp drive", "tags": ["#science-fiction", "#physics", "#draft"]},
            {"name": "untagged"}
        ]"##,
    )
    .unwrap()
}

fn names(items: Vec<&Item>) -> Vec<&str> {
    items.into_iter().map(|item| item.name.as_str()).collect()
}

#[test]
fn test_tags_are_normalized_on_load() {
    let catalog = glossary();
    assert_eq!(catalog.items()[0].tags, vec!["#science-fiction", "#robots"]);
    assert!(catalog.items()[3].tags.is_empty());
}

#[test]
fn test_filter_keeps_catalog_order() {
    let catalog = glossary();

    let expr = parse("#science-fiction and not #draft").unwrap();
    assert_eq!(names(catalog.filter(&expr)), vec!["android"]);

    let expr = parse("#fantasy or #physics or #robots").unwrap();
    assert_eq!(names(catalog.filter(&expr)), vec!["android", "dragon", "warp drive"]);

    let expr = parse("not (#fantasy or #science-fiction)").unwrap();
    assert_eq!(names(catalog.filter(&expr)), vec!["untagged"]);
}

#[test]
fn test_known_tags() {
    let catalog = glossary();
    let known: Vec<&str> = catalog.known_tags().into_iter().collect();
    assert_eq!(
        known,
        vec!["#draft", "#fantasy", "#physics", "#robots", "#science-fiction"]
    );
}

#[test]
fn test_load_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let yaml_path = dir.path().join("terms.yaml");
    let mut file = std::fs::File::create(&yaml_path).unwrap();
    writeln!(file, "- name: quark\n  tags: ['#physics']\n- name: elf\n  tags: ['#fantasy']").unwrap();

    let catalog = Catalog::load(&yaml_path).unwrap();
    let expr = parse("#physics").unwrap();
    assert_eq!(names(catalog.filter(&expr)), vec!["quark"]);

    let txt_path = dir.path().join("terms.txt");
    std::fs::write(&txt_path, "quark #physics").unwrap();
    assert!(Catalog::load(&txt_path).is_err());

    assert!(Catalog::load(&dir.path().join("missing.json")).is_err());
}
