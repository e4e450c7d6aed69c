use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::cache::NullCache;

fn engine_with(templates: &[(&str, &str)]) -> (TempDir, Engine) {
    let dir = TempDir::new().unwrap();
    for (name, source) in templates {
        fs::write(dir.path().join(format!("{name}.slate.html")), source).unwrap();
    }
    let engine = Engine::new(EngineConfig::new(dir.path()))
        .unwrap()
        .with_sink(OutputSink::buffer());
    (dir, engine)
}

fn data(pairs: &[(&str, Value)]) -> Map {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

#[test]
fn set_get_unset() {
    let (_dir, mut engine) = engine_with(&[]);
    engine.set("title", "Home").set("count", 3_i64);
    assert_eq!(engine.get("title"), Some(&Value::from("Home")));
    assert_eq!(engine.get("count"), Some(&Value::Int(3)));
    assert_eq!(engine.unset("title"), Some(Value::from("Home")));
    assert_eq!(engine.get("title"), None);
    assert_eq!(engine.unset("title"), None);
}

#[test]
fn set_data_merges_over_existing() {
    let (_dir, mut engine) = engine_with(&[]);
    engine.set("a", 1_i64).set("b", 2_i64);
    engine.set_data(data(&[("b", Value::Int(20)), ("c", Value::Int(30))]));
    let keys: Vec<_> = engine.globals().keys().cloned().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(engine.get("b"), Some(&Value::Int(20)));
}

#[test]
fn append_by_type() {
    let (_dir, mut engine) = engine_with(&[]);
    engine.append("fresh", "x").unwrap();
    assert_eq!(engine.get("fresh"), Some(&Value::from("x")));

    engine.set("items", Value::list(vec![Value::Int(1)]));
    engine.append("items", 2_i64).unwrap();
    assert_eq!(
        engine.get("items"),
        Some(&Value::list(vec![Value::Int(1), Value::Int(2)]))
    );

    engine.set("title", "Blog");
    engine.append("title", " | Archive").unwrap();
    assert_eq!(engine.get("title"), Some(&Value::from("Blog | Archive")));

    engine.set("count", 4_i64);
    engine.append("count", 2_i64).unwrap();
    assert_eq!(engine.get("count"), Some(&Value::from("42")));

    engine.set("map", Value::map(data(&[("0", Value::from("a")), ("x", Value::from("b"))])));
    engine.append("map", "c").unwrap();
    let Some(Value::Map(map)) = engine.get("map") else {
        panic!("map expected");
    };
    assert_eq!(map.get("1"), Some(&Value::from("c")));
}

#[test]
fn append_rejects_unprintable_concat() {
    let (_dir, mut engine) = engine_with(&[]);
    engine.set("title", "Blog");
    let err = engine.append("title", Value::list(vec![])).unwrap_err();
    assert!(matches!(err, RenderError::Eval(_)));
    assert_eq!(engine.get("title"), Some(&Value::from("Blog")));
}

#[test]
fn render_merges_call_data_for_that_render_only() {
    let (_dir, mut engine) = engine_with(&[("hello", "{{ $greeting }}, {{ $name }}!")]);
    engine.set("greeting", "Hello").set("name", "world");

    let local = data(&[("name", Value::from("Ada"))]);
    assert_eq!(engine.render("hello", Some(&local), true).unwrap(), "Hello, Ada!");
    assert_eq!(engine.render("hello", None, true).unwrap(), "Hello, world!");
}

#[test]
fn render_forwards_to_sink_unless_return_only() {
    let (_dir, engine) = engine_with(&[("a", "A")]);
    engine.render("a", None, true).unwrap();
    assert_eq!(engine.sink().output(), "");
    assert_eq!(engine.render("a", None, false).unwrap(), "A");
    assert_eq!(engine.sink().output(), "A");
}

#[test]
fn extensions_run_before_built_in_passes() {
    let (_dir, mut engine) = engine_with(&[("x", "@datetime")]);
    engine.extend(|text| text.replace("@datetime", "{{ 'now' }}"));
    assert_eq!(engine.compile("x").unwrap(), "<% echo 'now'; %>");
    assert_eq!(engine.render("x", None, true).unwrap(), "now");
}

#[test]
fn parsed_programs_are_reused_until_text_changes() {
    let (dir, engine) = engine_with(&[("p", "one")]);
    let engine = engine.with_cache(NullCache);
    let first = engine.program("p").unwrap();
    let again = engine.program("p").unwrap();
    assert!(Rc::ptr_eq(&first, &again));

    fs::write(dir.path().join("p.slate.html"), "two").unwrap();
    let changed = engine.program("p").unwrap();
    assert!(!Rc::ptr_eq(&first, &changed));
    assert_eq!(engine.render("p", None, true).unwrap(), "two");
}

#[test]
fn missing_template_is_a_resolve_error() {
    let (_dir, engine) = engine_with(&[]);
    assert!(matches!(
        engine.render("nope", None, true),
        Err(RenderError::Resolve(_))
    ));
}

#[test]
fn include_failures_name_the_missing_template() {
    let (_dir, engine) = engine_with(&[("page", "@include('ghost')")]);
    let err = engine.render("page", None, true).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ghost"), "{message}");
}

#[test]
fn host_services_fill_undefined_names() {
    struct Site;

    impl HostServices for Site {
        fn lookup(&self, name: &str) -> Option<Value> {
            (name == "site_name").then(|| Value::from("Slate"))
        }
    }

    let (_dir, engine) = engine_with(&[("t", "{{ $site_name }}")]);
    let engine = engine.with_services(Site);
    assert_eq!(engine.render("t", None, true).unwrap(), "Slate");
}
