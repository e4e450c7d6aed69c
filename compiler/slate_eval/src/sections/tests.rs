use pretty_assertions::assert_eq;

use super::*;

#[test]
fn first_store_sets_content() {
    let mut sections = Sections::new();
    sections.store("title", "Home".into());
    assert_eq!(sections.get("title"), "Home");
}

#[test]
fn missing_section_yields_empty() {
    let sections = Sections::new();
    assert_eq!(sections.get("nope"), "");
    assert!(!sections.contains("nope"));
}

#[test]
fn child_parent_marker_filled_by_layout() {
    // The child closes first; the layout's own content fills `@parent`.
    let mut sections = Sections::new();
    sections.store("s", "CHILD @parent".into());
    sections.store("s", "PARENT".into());
    assert_eq!(sections.get("s"), "CHILD PARENT");
}

#[test]
fn parent_marker_against_earlier_content() {
    let mut sections = Sections::new();
    sections.store("s", "PARENT".into());
    sections.store("s", "CHILD @parent".into());
    assert_eq!(sections.get("s"), "CHILD PARENT");
}

#[test]
fn multi_level_chain() {
    let mut sections = Sections::new();
    sections.store("s", "C @parent".into());
    sections.store("s", "M @parent".into());
    sections.store("s", "T".into());
    assert_eq!(sections.get("s"), "C M T");
}

#[test]
fn first_close_wins_without_marker() {
    let mut sections = Sections::new();
    sections.store("s", "CHILD".into());
    sections.store("s", "PARENT".into());
    assert_eq!(sections.get("s"), "CHILD");
}

#[test]
fn open_stack_is_lifo() {
    let mut sections = Sections::new();
    sections.start("outer");
    sections.start("inner");
    assert_eq!(sections.open_above(1), vec!["inner".to_string()]);
    assert_eq!(sections.end().as_deref(), Some("inner"));
    assert_eq!(sections.end().as_deref(), Some("outer"));
    assert_eq!(sections.end(), None);
}
