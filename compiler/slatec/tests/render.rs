// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end rendering: directive source in, text out.

mod common;

use common::{list, render, render_with, Views};
use pretty_assertions::assert_eq;
use slate_eval::EvalErrorKind;
use slatec::{RenderError, Value};

#[test]
fn echo_round_trip() {
    let views = Views::new();
    views.write("sum", "{{ 1 + 1 }}");
    let engine = views.engine();
    assert_eq!(engine.compile("sum").unwrap(), "<% echo 1 + 1; %>");
    assert_eq!(render(&engine, "sum"), "2");
}

#[test]
fn if_else_picks_one_branch() {
    let views = Views::new();
    views.write("branch", "@if($ok)\nyes\n@else\nno\n@endif\n");
    let engine = views.engine();
    assert_eq!(render_with(&engine, "branch", &[("ok", Value::Bool(true))]), "yes\n");
    assert_eq!(render_with(&engine, "branch", &[("ok", Value::Bool(false))]), "no\n");
}

#[test]
fn elseif_chain() {
    let views = Views::new();
    views.write(
        "grade",
        "@if($n >= 90)A@elseif($n >= 80)B@else C@endif",
    );
    let engine = views.engine();
    assert_eq!(render_with(&engine, "grade", &[("n", Value::Int(95))]), "A");
    assert_eq!(render_with(&engine, "grade", &[("n", Value::Int(85))]), "B");
    assert_eq!(render_with(&engine, "grade", &[("n", Value::Int(10))]), " C");
}

#[test]
fn unless_negates() {
    let views = Views::new();
    views.write("guest", "@unless($user)Please sign in.@endunless");
    let engine = views.engine();
    assert_eq!(render_with(&engine, "guest", &[("user", Value::Null)]), "Please sign in.");
    assert_eq!(render_with(&engine, "guest", &[("user", Value::from("ada"))]), "");
}

#[test]
fn forelse_renders_items_or_empty_branch() {
    let views = Views::new();
    views.write(
        "items",
        "@forelse($items as $item)\n<li>{{ $item }}</li>\n@empty\n<p>none</p>\n@endforelse\n",
    );
    let engine = views.engine();

    let full = render_with(&engine, "items", &[("items", list(&["a", "b"]))]);
    assert_eq!(full, "<li>a</li>\n<li>b</li>\n");
    assert!(!full.contains("none"));

    let empty = render_with(&engine, "items", &[("items", list::<&str>(&[]))]);
    assert_eq!(empty, "<p>none</p>\n");
}

#[test]
fn loops() {
    let views = Views::new();
    views.write(
        "loops",
        "@foreach($xs as $i => $x){{ $i }}={{ $x }};@endforeach|\
         @for($i = 0; $i < 3; $i++){{ $i }}@endfor|\
         @while($n > 0){{ $n-- }}@endwhile",
    );
    let engine = views.engine();
    assert_eq!(
        render_with(&engine, "loops", &[("xs", list(&["a", "b"])), ("n", Value::Int(2))]),
        "0=a;1=b;|012|21"
    );
}

#[test]
fn comments_are_not_rendered() {
    let views = Views::new();
    views.write(
        "commented",
        "a{{-- block {{ $missing }} --}}b\n{{-- line comment\nc",
    );
    let engine = views.engine();
    assert_eq!(render(&engine, "commented"), "ab\nc");
}

#[test]
fn comment_on_its_own_line_leaves_no_blank_line() {
    let views = Views::new();
    views.write("list", "<ul>\n{{-- note --}}\n<li>x</li>\n</ul>");
    assert_eq!(render(&views.engine(), "list"), "<ul>\n<li>x</li>\n</ul>");
}

#[test]
fn literal_open_tags_are_plain_text() {
    let views = Views::new();
    views
        .write("stray", "a <% b")
        .write(
            "ejs",
            "<script type=\"text/template\">\n<%= name %>\n</script>\n{{ $name }}",
        );
    let engine = views.engine();
    assert_eq!(render(&engine, "stray"), "a <% b");
    assert_eq!(
        render_with(&engine, "ejs", &[("name", Value::from("Ada"))]),
        "<script type=\"text/template\">\n<%= name %>\n</script>\nAda"
    );
}

#[test]
fn include_shares_data_and_accepts_overrides() {
    let views = Views::new();
    views
        .write("partials/greet", "Hi {{ $name }}.")
        .write("page", "@include('partials/greet') @include('partials/greet', ['name' => 'Bob'])");
    let engine = views.engine();
    assert_eq!(
        render_with(&engine, "page", &[("name", Value::from("Ada"))]),
        "Hi Ada. Hi Bob."
    );
}

#[test]
fn section_parent_marker_is_replaced() {
    let views = Views::new();
    views.write(
        "inherit",
        "@section('s')PARENT@endsection@section('s')CHILD @parent@endsection@yield('s')",
    );
    assert_eq!(render(&views.engine(), "inherit"), "CHILD PARENT");
}

#[test]
fn layout_yields_child_sections() {
    let views = Views::new();
    views
        .write(
            "base",
            "<title>@yield('title')</title>\n<main>@yield('content')</main>\n",
        )
        .write(
            "home",
            "@layout('base')\n@section('title')Home@endsection\n@section('content')\nHello {{ $name }}\n@endsection\n",
        );
    let out = render_with(&views.engine(), "home", &[("name", Value::from("Ada"))]);
    assert_eq!(out, "\n\n<title>Home</title>\n<main>Hello Ada</main>\n");
}

#[test]
fn layout_position_does_not_matter() {
    let views = Views::new();
    views
        .write("base", "<title>@yield('title')</title>")
        .write("first", "@layout('base')\n@section('title')T@endsection\ntrailing\n")
        .write("last", "@section('title')T@endsection\n@layout('base')\ntrailing\n");
    let engine = views.engine();
    let first = render(&engine, "first");
    assert_eq!(first, render(&engine, "last"));
    assert!(first.ends_with("<title>T</title>"), "{first:?}");
}

#[test]
fn layout_parent_sections_extend_child_content() {
    let views = Views::new();
    views
        .write(
            "base",
            "@section('sidebar')Links@endsection@section('sidebar')@parent + More@endsection[@yield('sidebar')]",
        )
        .write("child", "@layout('base')@section('sidebar')Child @parent@endsection");
    // The child's capture is stored first; the layout's own sections then
    // splice into the child's `@parent` marker.
    assert_eq!(render(&views.engine(), "child"), "[Child Links + More]");
}

#[test]
fn yield_section_closes_and_yields() {
    let views = Views::new();
    views.write("nav", "<nav>@section('nav')Home@yield_section</nav>");
    assert_eq!(render(&views.engine(), "nav"), "<nav>Home</nav>");
}

#[test]
fn sections_do_not_leak_between_renders() {
    let views = Views::new();
    views
        .write("define", "@section('s')set@endsection")
        .write("show", "[@yield('s')]");
    let engine = views.engine();
    render(&engine, "define");
    assert_eq!(render(&engine, "show"), "[]");
}

#[test]
fn unclosed_directive_is_a_compile_error() {
    let views = Views::new();
    views.write("broken", "ok\n@if($a\nmore");
    let err = views.engine().render("broken", None, true).unwrap_err();
    assert!(matches!(err, RenderError::Compile { .. }), "{err}");
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn unmatched_endsection_is_an_error() {
    let views = Views::new();
    views.write("stray", "text@endsection");
    let err = views.engine().render("stray", None, true).unwrap_err();
    let RenderError::Eval(err) = err else {
        panic!("expected eval error, got {err}");
    };
    assert!(matches!(err.kind, EvalErrorKind::UnmatchedSectionEnd { .. }));
}

#[test]
fn unclosed_section_is_an_error() {
    let views = Views::new();
    views.write("open", "@section('a')never closed");
    let err = views.engine().render("open", None, true).unwrap_err();
    let RenderError::Eval(err) = err else {
        panic!("expected eval error, got {err}");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::UnclosedSections {
            template: "open".to_string(),
            names: vec!["a".to_string()],
        }
    );
}

#[test]
fn self_include_hits_depth_limit() {
    let views = Views::new();
    views.write("loop", "x@include('loop')");
    let engine = slatec::Engine::new(views.config().with_max_include_depth(5)).unwrap();
    let err = engine.render("loop", None, true).unwrap_err();
    let RenderError::Eval(err) = err else {
        panic!("expected eval error, got {err}");
    };
    let EvalErrorKind::IncludeDepthExceeded { limit, chain } = err.kind else {
        panic!("expected depth error, got {err}");
    };
    assert_eq!(limit, 5);
    assert_eq!(chain.len(), 6);
    assert!(chain.iter().all(|name| name == "loop"));
}

#[test]
fn undefined_variable_fails_the_render() {
    let views = Views::new();
    views.write("missing", "before {{ $nope }} after");
    let err = views.engine().render("missing", None, true).unwrap_err();
    assert!(err.to_string().contains("nope"), "{err}");
}

#[test]
fn isset_and_coalesce_are_lenient() {
    let views = Views::new();
    views.write(
        "lenient",
        "@if(isset($user))known@else anonymous@endif {{ $title ?? 'Untitled' }}",
    );
    assert_eq!(render(&views.engine(), "lenient"), " anonymous Untitled");
}
