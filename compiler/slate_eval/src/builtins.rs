//! Builtin functions available to templates.
//!
//! Names are matched case-insensitively. Every builtin validates its own
//! argument count and reports type problems as `InvalidArgument`.

use std::rc::Rc;

use crate::errors::{arity_mismatch, integer_overflow, invalid_argument, EvalResult};
use crate::value::{parse_numeric, Map, Number, Value};

type Builtin = fn(&[Value]) -> EvalResult;

/// Largest list `range()` will build.
const MAX_RANGE_LEN: usize = 1_000_000;

/// Characters trimmed by default.
const TRIM_CHARS: &str = " \t\n\r\0\x0B";

/// Call a builtin by name. `None` if no builtin has that name.
pub fn call_builtin(name: &str, args: &[Value]) -> Option<EvalResult> {
    lookup(name).map(|f| f(args))
}

pub fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}

fn lookup(name: &str) -> Option<Builtin> {
    let f: Builtin = match name.to_ascii_lowercase().as_str() {
        "count" => count,
        "strlen" => strlen,
        "strtoupper" => strtoupper,
        "strtolower" => strtolower,
        "ucfirst" => ucfirst,
        "ucwords" => ucwords,
        "trim" => trim,
        "ltrim" => ltrim,
        "rtrim" => rtrim,
        "str_repeat" => str_repeat,
        "str_replace" => str_replace,
        "str_contains" => str_contains,
        "str_starts_with" => str_starts_with,
        "str_ends_with" => str_ends_with,
        "substr" => substr,
        "implode" | "join" => implode,
        "explode" => explode,
        "in_array" => in_array,
        "array_keys" => array_keys,
        "array_values" => array_values,
        "array_merge" => array_merge,
        "range" => range,
        "abs" => abs,
        "round" => round,
        "floor" => floor,
        "ceil" => ceil,
        "min" => min,
        "max" => max,
        "intval" => intval,
        "floatval" => floatval,
        "strval" => strval,
        "number_format" => number_format,
        "json_encode" => json_encode,
        "e" | "htmlspecialchars" => escape_html,
        "nl2br" => nl2br,
        "is_array" => is_array,
        "is_null" => is_null,
        "is_string" => is_string,
        "is_numeric" => is_numeric,
        _ => return None,
    };
    Some(f)
}

// Argument helpers

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> EvalResult<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        return Err(arity_mismatch(name, &expected, args.len()));
    }
    Ok(())
}

fn text(name: &str, value: &Value) -> EvalResult<String> {
    value
        .to_text()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| invalid_argument(name, format!("expected string, got {}", value.type_name())))
}

fn number(name: &str, value: &Value) -> EvalResult<Number> {
    value
        .to_number()
        .ok_or_else(|| invalid_argument(name, format!("expected number, got {}", value.type_name())))
}

fn elements<'a>(
    name: &str,
    value: &'a Value,
) -> EvalResult<Box<dyn Iterator<Item = &'a Value> + 'a>> {
    match value {
        Value::List(items) => Ok(Box::new(items.iter())),
        Value::Map(map) => Ok(Box::new(map.values())),
        other => Err(invalid_argument(
            name,
            format!("expected list or map, got {}", other.type_name()),
        )),
    }
}

fn usize_arg(name: &str, value: &Value) -> EvalResult<usize> {
    usize::try_from(value.to_int())
        .map_err(|_| invalid_argument(name, "expected a non-negative integer"))
}

/// Map key back to the value it was made from: canonical integers become
/// ints, everything else stays a string.
fn key_value(key: &str) -> Value {
    match key.parse::<i64>() {
        Ok(n) if n.to_string() == key => Value::Int(n),
        _ => Value::from(key),
    }
}

// Collections

fn count(args: &[Value]) -> EvalResult {
    arity("count", args, 1, 1)?;
    match &args[0] {
        Value::Null => Ok(Value::Int(0)),
        other => other
            .len()
            .and_then(|n| i64::try_from(n).ok())
            .map(Value::Int)
            .ok_or_else(|| {
                invalid_argument(
                    "count",
                    format!("expected list or map, got {}", other.type_name()),
                )
            }),
    }
}

fn implode(args: &[Value]) -> EvalResult {
    arity("implode", args, 1, 2)?;
    let (sep, list) = match args {
        [list] => (String::new(), list),
        [sep, list] => (text("implode", sep)?, list),
        _ => return Err(arity_mismatch("implode", "1 to 2", args.len())),
    };
    let parts = elements("implode", list)?
        .map(|v| text("implode", v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Str(parts.join(&sep)))
}

fn explode(args: &[Value]) -> EvalResult {
    arity("explode", args, 2, 3)?;
    let sep = text("explode", &args[0])?;
    if sep.is_empty() {
        return Err(invalid_argument("explode", "separator cannot be empty"));
    }
    let subject = text("explode", &args[1])?;
    let limit = args.get(2).map_or(i64::MAX, Value::to_int);
    let parts: Vec<Value> = match limit {
        0 | 1 => vec![Value::from(subject.as_str())],
        n if n > 0 => {
            let n = usize::try_from(n).unwrap_or(usize::MAX);
            subject.splitn(n, sep.as_str()).map(Value::from).collect()
        }
        n => {
            let all: Vec<&str> = subject.split(sep.as_str()).collect();
            let drop = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX);
            let keep = all.len().saturating_sub(drop);
            all[..keep].iter().map(|s| Value::from(*s)).collect()
        }
    };
    Ok(Value::list(parts))
}

fn in_array(args: &[Value]) -> EvalResult {
    arity("in_array", args, 2, 3)?;
    let strict = args.get(2).is_some_and(Value::is_truthy);
    let needle = &args[0];
    let found = elements("in_array", &args[1])?.any(|v| {
        if strict {
            v.strict_eq(needle)
        } else {
            v.loose_eq(needle)
        }
    });
    Ok(Value::Bool(found))
}

fn array_keys(args: &[Value]) -> EvalResult {
    arity("array_keys", args, 1, 1)?;
    match &args[0] {
        Value::List(items) => Ok(Value::list(
            (0..items.len())
                .map(|i| Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
                .collect(),
        )),
        Value::Map(map) => Ok(Value::list(map.keys().map(|k| key_value(k)).collect())),
        other => Err(invalid_argument(
            "array_keys",
            format!("expected list or map, got {}", other.type_name()),
        )),
    }
}

fn array_values(args: &[Value]) -> EvalResult {
    arity("array_values", args, 1, 1)?;
    Ok(Value::list(elements("array_values", &args[0])?.cloned().collect()))
}

fn array_merge(args: &[Value]) -> EvalResult {
    if args.iter().all(|v| matches!(v, Value::List(_))) {
        let mut items = Vec::new();
        for arg in args {
            items.extend(elements("array_merge", arg)?.cloned());
        }
        return Ok(Value::list(items));
    }

    let mut merged = Map::default();
    let mut next_index: i64 = 0;
    for arg in args {
        let entries: Vec<(Option<String>, Value)> = match arg {
            Value::List(items) => items.iter().map(|v| (None, v.clone())).collect(),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| match key_value(k) {
                    Value::Int(_) => (None, v.clone()),
                    _ => (Some(k.clone()), v.clone()),
                })
                .collect(),
            other => {
                return Err(invalid_argument(
                    "array_merge",
                    format!("expected list or map, got {}", other.type_name()),
                ))
            }
        };
        for (key, value) in entries {
            match key {
                Some(key) => {
                    merged.insert(key, value);
                }
                None => {
                    merged.insert(next_index.to_string(), value);
                    next_index += 1;
                }
            }
        }
    }
    Ok(Value::Map(Rc::new(merged)))
}

fn range(args: &[Value]) -> EvalResult {
    arity("range", args, 2, 3)?;
    let (start, end) = (args[0].to_int(), args[1].to_int());
    let step = args.get(2).map_or(1, Value::to_int).checked_abs().unwrap_or(0);
    if step == 0 {
        return Err(invalid_argument("range", "step must not be zero"));
    }
    let span = start.abs_diff(end) / step.unsigned_abs();
    if usize::try_from(span).map_or(true, |n| n >= MAX_RANGE_LEN) {
        return Err(invalid_argument("range", "range is too large"));
    }
    let mut items = Vec::new();
    let mut current = start;
    loop {
        items.push(Value::Int(current));
        let next = if start <= end {
            current.checked_add(step)
        } else {
            current.checked_sub(step)
        };
        match next {
            Some(n) if (start <= end && n <= end) || (start > end && n >= end) => current = n,
            _ => break,
        }
    }
    Ok(Value::list(items))
}

// Strings

fn strlen(args: &[Value]) -> EvalResult {
    arity("strlen", args, 1, 1)?;
    let chars = text("strlen", &args[0])?.chars().count();
    Ok(Value::Int(i64::try_from(chars).unwrap_or(i64::MAX)))
}

fn strtoupper(args: &[Value]) -> EvalResult {
    arity("strtoupper", args, 1, 1)?;
    Ok(Value::Str(text("strtoupper", &args[0])?.to_ascii_uppercase()))
}

fn strtolower(args: &[Value]) -> EvalResult {
    arity("strtolower", args, 1, 1)?;
    Ok(Value::Str(text("strtolower", &args[0])?.to_ascii_lowercase()))
}

fn ucfirst(args: &[Value]) -> EvalResult {
    arity("ucfirst", args, 1, 1)?;
    let mut s = text("ucfirst", &args[0])?;
    if let Some(first) = s.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    Ok(Value::Str(s))
}

fn ucwords(args: &[Value]) -> EvalResult {
    arity("ucwords", args, 1, 1)?;
    let s = text("ucwords", &args[0])?;
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        out.push(if at_word_start { c.to_ascii_uppercase() } else { c });
        at_word_start = c.is_whitespace();
    }
    Ok(Value::Str(out))
}

fn trim_with(name: &str, args: &[Value], left: bool, right: bool) -> EvalResult {
    arity(name, args, 1, 2)?;
    let s = text(name, &args[0])?;
    let chars = match args.get(1) {
        Some(v) => text(name, v)?,
        None => TRIM_CHARS.to_string(),
    };
    let pattern = |c: char| chars.contains(c);
    let out = match (left, right) {
        (true, true) => s.trim_matches(pattern),
        (true, false) => s.trim_start_matches(pattern),
        _ => s.trim_end_matches(pattern),
    };
    Ok(Value::from(out))
}

fn trim(args: &[Value]) -> EvalResult {
    trim_with("trim", args, true, true)
}

fn ltrim(args: &[Value]) -> EvalResult {
    trim_with("ltrim", args, true, false)
}

fn rtrim(args: &[Value]) -> EvalResult {
    trim_with("rtrim", args, false, true)
}

fn str_repeat(args: &[Value]) -> EvalResult {
    arity("str_repeat", args, 2, 2)?;
    let s = text("str_repeat", &args[0])?;
    let times = usize_arg("str_repeat", &args[1])?;
    if s.len().saturating_mul(times) > MAX_RANGE_LEN * 16 {
        return Err(invalid_argument("str_repeat", "result is too large"));
    }
    Ok(Value::Str(s.repeat(times)))
}

fn str_replace(args: &[Value]) -> EvalResult {
    arity("str_replace", args, 3, 3)?;
    let mut subject = text("str_replace", &args[2])?;
    let pairs: Vec<(String, String)> = match (&args[0], &args[1]) {
        (search @ (Value::List(_) | Value::Map(_)), replace) => {
            let searches = elements("str_replace", search)?
                .map(|v| text("str_replace", v))
                .collect::<Result<Vec<_>, _>>()?;
            let replacements: Vec<String> = match replace {
                Value::List(_) | Value::Map(_) => elements("str_replace", replace)?
                    .map(|v| text("str_replace", v))
                    .collect::<Result<_, _>>()?,
                single => vec![text("str_replace", single)?; searches.len()],
            };
            searches
                .into_iter()
                .enumerate()
                .map(|(i, s)| (s, replacements.get(i).cloned().unwrap_or_default()))
                .collect()
        }
        (search, replace) => vec![(text("str_replace", search)?, text("str_replace", replace)?)],
    };
    for (search, replace) in pairs {
        if !search.is_empty() {
            subject = subject.replace(&search, &replace);
        }
    }
    Ok(Value::Str(subject))
}

fn str_contains(args: &[Value]) -> EvalResult {
    arity("str_contains", args, 2, 2)?;
    let (haystack, needle) = (text("str_contains", &args[0])?, text("str_contains", &args[1])?);
    Ok(Value::Bool(haystack.contains(&needle)))
}

fn str_starts_with(args: &[Value]) -> EvalResult {
    arity("str_starts_with", args, 2, 2)?;
    let (haystack, needle) = (text("str_starts_with", &args[0])?, text("str_starts_with", &args[1])?);
    Ok(Value::Bool(haystack.starts_with(&needle)))
}

fn str_ends_with(args: &[Value]) -> EvalResult {
    arity("str_ends_with", args, 2, 2)?;
    let (haystack, needle) = (text("str_ends_with", &args[0])?, text("str_ends_with", &args[1])?);
    Ok(Value::Bool(haystack.ends_with(&needle)))
}

/// Character-based `substr` with negative start/length counting from the
/// end.
fn substr(args: &[Value]) -> EvalResult {
    arity("substr", args, 2, 3)?;
    let chars: Vec<char> = text("substr", &args[0])?.chars().collect();
    let len = i64::try_from(chars.len()).unwrap_or(i64::MAX);
    let mut start = args[1].to_int();
    if start < 0 {
        start = (len + start).max(0);
    }
    let start = start.min(len);
    let end = match args.get(2).filter(|v| !v.is_null()) {
        None => len,
        Some(v) => {
            let n = v.to_int();
            if n < 0 {
                (len + n).max(start)
            } else {
                start.saturating_add(n).min(len)
            }
        }
    };
    let (start, end) = (
        usize::try_from(start).unwrap_or(0),
        usize::try_from(end).unwrap_or(0),
    );
    Ok(Value::Str(chars[start..end.max(start)].iter().collect()))
}

fn escape_html(args: &[Value]) -> EvalResult {
    arity("e", args, 1, 1)?;
    let s = text("e", &args[0])?;
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    Ok(Value::Str(out))
}

fn nl2br(args: &[Value]) -> EvalResult {
    arity("nl2br", args, 1, 1)?;
    let s = text("nl2br", &args[0])?;
    Ok(Value::Str(s.replace('\n', "<br />\n")))
}

// Numbers

fn abs(args: &[Value]) -> EvalResult {
    arity("abs", args, 1, 1)?;
    match number("abs", &args[0])? {
        Number::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("abs")),
        Number::Float(f) => Ok(Value::Float(f.abs())),
    }
}

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

fn round(args: &[Value]) -> EvalResult {
    arity("round", args, 1, 2)?;
    let value = number("round", &args[0])?.as_f64();
    let precision = args
        .get(1)
        .map_or(0, |p| i32::try_from(p.to_int()).unwrap_or(0));
    Ok(Value::Float(round_to(value, precision)))
}

fn floor(args: &[Value]) -> EvalResult {
    arity("floor", args, 1, 1)?;
    Ok(Value::Float(number("floor", &args[0])?.as_f64().floor()))
}

fn ceil(args: &[Value]) -> EvalResult {
    arity("ceil", args, 1, 1)?;
    Ok(Value::Float(number("ceil", &args[0])?.as_f64().ceil()))
}

fn extreme(name: &str, args: &[Value], want: std::cmp::Ordering) -> EvalResult {
    let candidates: Vec<&Value> = match args {
        [] => return Err(arity_mismatch(name, "at least 1", 0)),
        [single @ (Value::List(_) | Value::Map(_))] => elements(name, single)?.collect(),
        many => many.iter().collect(),
    };
    let mut best: Option<&Value> = None;
    for candidate in candidates {
        best = match best {
            Some(current) if candidate.compare(current) != Some(want) => Some(current),
            _ => Some(candidate),
        };
    }
    best.cloned()
        .ok_or_else(|| invalid_argument(name, "expected a non-empty list"))
}

fn min(args: &[Value]) -> EvalResult {
    extreme("min", args, std::cmp::Ordering::Less)
}

fn max(args: &[Value]) -> EvalResult {
    extreme("max", args, std::cmp::Ordering::Greater)
}

fn intval(args: &[Value]) -> EvalResult {
    arity("intval", args, 1, 1)?;
    Ok(Value::Int(match &args[0] {
        // Leading-numeric strings keep their numeric prefix.
        Value::Str(s) => leading_int(s),
        other => other.to_int(),
    }))
}

fn leading_int(s: &str) -> i64 {
    let t = s.trim_start();
    let end = t
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    t[..end].parse().unwrap_or(0)
}

fn floatval(args: &[Value]) -> EvalResult {
    arity("floatval", args, 1, 1)?;
    Ok(Value::Float(args[0].to_number().map_or(0.0, Number::as_f64)))
}

fn strval(args: &[Value]) -> EvalResult {
    arity("strval", args, 1, 1)?;
    Ok(Value::Str(text("strval", &args[0])?))
}

fn number_format(args: &[Value]) -> EvalResult {
    arity("number_format", args, 1, 4)?;
    let value = number("number_format", &args[0])?.as_f64();
    let decimals = args.get(1).map_or(Ok(0), |v| usize_arg("number_format", v))?;
    let point = args.get(2).map_or(Ok(".".to_string()), |v| text("number_format", v))?;
    let sep = args.get(3).map_or(Ok(",".to_string()), |v| text("number_format", v))?;

    let rounded = round_to(value, i32::try_from(decimals).unwrap_or(0));
    let formatted = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, ""));

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push_str(&sep);
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if decimals > 0 {
        out.push_str(&point);
        out.push_str(frac_part);
    }
    Ok(Value::Str(out))
}

fn json_encode(args: &[Value]) -> EvalResult {
    arity("json_encode", args, 1, 1)?;
    let json = serde_json::Value::from(&args[0]);
    serde_json::to_string(&json)
        .map(Value::Str)
        .map_err(|e| invalid_argument("json_encode", e.to_string()))
}

// Type checks

fn is_array(args: &[Value]) -> EvalResult {
    arity("is_array", args, 1, 1)?;
    Ok(Value::Bool(args[0].is_collection()))
}

fn is_null(args: &[Value]) -> EvalResult {
    arity("is_null", args, 1, 1)?;
    Ok(Value::Bool(args[0].is_null()))
}

fn is_string(args: &[Value]) -> EvalResult {
    arity("is_string", args, 1, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Str(_))))
}

fn is_numeric(args: &[Value]) -> EvalResult {
    arity("is_numeric", args, 1, 1)?;
    Ok(Value::Bool(match &args[0] {
        Value::Int(_) | Value::Float(_) => true,
        Value::Str(s) => parse_numeric(s).is_some(),
        _ => false,
    }))
}
