//! String literal escapes.
//!
//! Double-quoted strings recognise `\n`, `\r`, `\t`, `\\`, `\"`, `\$`, `\0`.
//! Single-quoted strings only recognise `\'` and `\\`. Any other backslash
//! sequence is kept as written (`\q` stays `\q`).

fn double_escape(c: char) -> Option<char> {
    Some(match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        '\\' | '"' | '$' => c,
        _ => return None,
    })
}

fn single_escape(c: char) -> Option<char> {
    matches!(c, '\'' | '\\').then_some(c)
}

fn unescape_with(body: &str, escape: fn(char) -> Option<char>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body.chars();
    while let Some(c) = rest.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match rest.next() {
            Some(next) => match escape(next) {
                Some(resolved) => out.push(resolved),
                None => {
                    out.push('\\');
                    out.push(next);
                }
            },
            None => out.push('\\'),
        }
    }
    out
}

/// Body of a double-quoted literal, quotes already stripped.
pub(crate) fn unescape_double(body: &str) -> String {
    unescape_with(body, double_escape)
}

/// Body of a single-quoted literal, quotes already stripped.
pub(crate) fn unescape_single(body: &str) -> String {
    unescape_with(body, single_escape)
}
