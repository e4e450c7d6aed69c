use pretty_assertions::assert_eq;

use super::*;

fn spans(matcher: &DirectiveMatcher, text: &str) -> Vec<(String, String)> {
    matcher
        .find_all(text)
        .unwrap_or_else(|e| panic!("match failed: {e}"))
        .iter()
        .map(|m| (m.indent(text).to_string(), m.args(text).to_string()))
        .collect()
}

#[test]
fn matches_arguments_and_indent() {
    let text = "<ul>\n    @include('row', ['x' => 1])\n</ul>";
    assert_eq!(
        spans(&DirectiveMatcher::new("include"), text),
        vec![("    ".to_string(), "('row', ['x' => 1])".to_string())]
    );
}

#[test]
fn whitespace_before_paren_is_part_of_args() {
    let text = "@if ($a)";
    assert_eq!(
        spans(&DirectiveMatcher::new("if"), text),
        vec![(String::new(), " ($a)".to_string())]
    );
}

#[test]
fn nested_and_quoted_parentheses() {
    let m = DirectiveMatcher::new("if");
    let text = "@if(count($xs) > f(')', \"(\")) yes";
    let found = m.find_all(text).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].inner_args(text), "count($xs) > f(')', \"(\")");
    assert_eq!(&text[found[0].end..], " yes");
}

#[test]
fn arguments_may_span_lines() {
    let text = "@include('card', [\n  'title' => $t,\n])\nafter";
    let found = DirectiveMatcher::new("include")
        .find_all(text)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(found.len(), 1);
    assert_eq!(&text[found[0].end..], "\nafter");
}

#[test]
fn several_on_one_line() {
    let text = "@if($a) A @if($b) B";
    assert_eq!(spans(&DirectiveMatcher::new("if"), text).len(), 2);
}

#[test]
fn name_must_end_at_identifier_boundary() {
    assert!(DirectiveMatcher::new("for")
        .find_all("@foreach($xs as $x) @forelse($ys as $y)")
        .unwrap_or_else(|e| panic!("{e}"))
        .is_empty());
    assert!(DirectiveMatcher::bare("else")
        .find_all("@elseif($x)")
        .unwrap_or_else(|e| panic!("{e}"))
        .is_empty());
    assert!(DirectiveMatcher::bare("endfor")
        .find_all("@endforeach @endforelse")
        .unwrap_or_else(|e| panic!("{e}"))
        .is_empty());
    assert_eq!(
        DirectiveMatcher::bare("endfor")
            .find_all("@endfor\n")
            .unwrap_or_else(|e| panic!("{e}"))
            .len(),
        1
    );
}

#[test]
fn directive_without_arguments_is_ignored() {
    assert!(DirectiveMatcher::new("include")
        .find_all("write @include in prose")
        .unwrap_or_else(|e| panic!("{e}"))
        .is_empty());
}

#[test]
fn unclosed_argument_list_reports_line() {
    let err = DirectiveMatcher::new("if").find_all("ok\nfine\n@if($a && (b)\n");
    assert_eq!(
        err,
        Err(CompileError::UnclosedDirective {
            directive: "if".to_string(),
            line: 3,
        })
    );
}

#[test]
fn replace_all_rewrites_by_position() {
    let text = "@yield('a') @yield('a')";
    let mut n = 0;
    let (out, count) = DirectiveMatcher::new("yield")
        .replace_all(text, |m, text| {
            n += 1;
            format!("{}<{n}>", m.indent(text))
        })
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(out, "<1> <2>");
    assert_eq!(count, 2);
}

#[test]
fn line_of_counts_from_one() {
    assert_eq!(line_of("a\nb\nc", 0), 1);
    assert_eq!(line_of("a\nb\nc", 4), 3);
}
