//! Moment-style date formatting for artifact names.
//!
//! Supports the common tokens (`YYYY`, `MM`, `DD`, `HH`, `mm`, `ss`, `SSS`,
//! ...) and `[literal]` escapes. Everything else is copied verbatim. Tokens are
//! translated to a strftime pattern and rendered by chrono in one pass.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use std::fmt;

/// Tokens in match order: longer tokens must precede their prefixes.
const TOKENS: &[(&str, Token)] = &[
    ("YYYY", Token::Spec("%Y")),
    ("YY", Token::Spec("%y")),
    ("Q", Token::Quarter),
    ("MMMM", Token::Spec("%B")),
    ("MMM", Token::Spec("%b")),
    ("MM", Token::Spec("%m")),
    ("M", Token::Spec("%-m")),
    ("DDDD", Token::Spec("%j")),
    ("DDD", Token::Spec("%-j")),
    ("DD", Token::Spec("%d")),
    ("D", Token::Spec("%-d")),
    ("dddd", Token::Spec("%A")),
    ("ddd", Token::Spec("%a")),
    ("d", Token::Spec("%w")),
    ("HH", Token::Spec("%H")),
    ("H", Token::Spec("%-H")),
    ("hh", Token::Spec("%I")),
    ("h", Token::Spec("%-I")),
    ("mm", Token::Spec("%M")),
    ("m", Token::Spec("%-M")),
    ("ss", Token::Spec("%S")),
    ("s", Token::Spec("%-S")),
    ("SSS", Token::Spec("%3f")),
    ("A", Token::Spec("%p")),
    ("a", Token::LowerMeridiem),
    ("ZZ", Token::Spec("%z")),
    ("Z", Token::Spec("%:z")),
    ("X", Token::Spec("%s")),
    ("x", Token::UnixMillis),
];

#[derive(Clone, Copy)]
enum Token {
    /// Rendered by chrono.
    Spec(&'static str),
    Quarter,
    LowerMeridiem,
    UnixMillis,
}

/// Renders `at` with a moment-style `format`.
pub fn render<Tz>(format: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let pattern = to_strftime(format, at);
    at.format(&pattern).to_string()
}

fn to_strftime<Tz: TimeZone>(format: &str, at: &DateTime<Tz>) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'scan: while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                push_literal(&mut out, &rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        for (name, token) in TOKENS {
            if let Some(tail) = rest.strip_prefix(name) {
                match token {
                    Token::Spec(spec) => out.push_str(spec),
                    Token::Quarter => out.push_str(&(at.month0() / 3 + 1).to_string()),
                    Token::LowerMeridiem => {
                        out.push_str(if at.hour() < 12 { "am" } else { "pm" });
                    },
                    Token::UnixMillis => out.push_str(&at.timestamp_millis().to_string()),
                }
                rest = tail;
                continue 'scan;
            }
        }

        let mut buf = [0u8; 4];
        push_literal(&mut out, c.encode_utf8(&mut buf));
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}
