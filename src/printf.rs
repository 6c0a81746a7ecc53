//! Positional arguments and runtime printf-style formatting.
//!
//! Clients that log through the adapter hand over a format string that is
//! only known at runtime together with values of mixed types. [`Arg`] carries
//! those values and [`sprintf`] substitutes them using the usual verbs
//! (`%v %s %d %q %t %f %g %x %%`), with width, precision and the `-`, `0`
//! and `+` flags. Mismatches never fail: they render inline markers such as
//! `%!d(MISSING)` or `%!(EXTRA string=x)`.

use serde_json::Value;
use std::fmt::{self, Write as _};

/// One heterogeneous positional value.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Json(Value),
}

/// Build a `&[Arg]` from mixed values.
///
/// ```
/// use tracing_log_facade::{args, printf::sprintf};
/// assert_eq!(sprintf("%s has %d items", args!["cart", 3]), "cart has 3 items");
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        &[$($crate::printf::Arg::from($arg)),*] as &[$crate::printf::Arg]
    };
}

impl Arg {
    pub fn is_string(&self) -> bool {
        matches!(self, Arg::Str(_))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Arg::Nil => "<nil>",
            Arg::Bool(_) => "bool",
            Arg::Int(_) => "int",
            Arg::Uint(_) => "uint",
            Arg::Float(_) => "float64",
            Arg::Str(_) => "string",
            Arg::Bytes(_) => "[]uint8",
            Arg::Json(_) => "json",
        }
    }

    /// Convert into a JSON value for structured fields.
    pub fn to_json(&self) -> Value {
        match self {
            Arg::Nil => Value::Null,
            Arg::Bool(b) => Value::from(*b),
            Arg::Int(i) => Value::from(*i),
            Arg::Uint(u) => Value::from(*u),
            Arg::Float(f) => Value::from(*f),
            Arg::Str(s) => Value::from(s.as_str()),
            Arg::Bytes(b) => Value::from(String::from_utf8_lossy(b).into_owned()),
            Arg::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Nil => f.write_str("<nil>"),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Int(i) => write!(f, "{}", i),
            Arg::Uint(u) => write!(f, "{}", u),
            Arg::Float(x) => write!(f, "{}", x),
            Arg::Str(s) => f.write_str(s),
            Arg::Bytes(bytes) => {
                f.write_char('[')?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{}", b)?;
                }
                f.write_char(']')
            }
            Arg::Json(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Arg::$variant(v as $target)
            }
        })*
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64, u16, u32, u64, usize);

impl From<u8> for Arg {
    fn from(v: u8) -> Self {
        Arg::Uint(v as u64)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float(v as f64)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v)
    }
}

impl From<&String> for Arg {
    fn from(v: &String) -> Self {
        Arg::Str(v.clone())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        Arg::Bytes(v)
    }
}

impl From<&[u8]> for Arg {
    fn from(v: &[u8]) -> Self {
        Arg::Bytes(v.to_vec())
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Json(v)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map_or(Arg::Nil, Into::into)
    }
}

/// Concatenate values, inserting a space between two operands when neither
/// of them is a string.
pub fn sprint(args: &[Arg]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !arg.is_string() && !args[i - 1].is_string() {
            out.push(' ');
        }
        let _ = write!(out, "{}", arg);
    }
    out
}

#[derive(Default)]
struct Spec {
    minus: bool,
    plus: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Substitute `args` into `format`.
pub fn sprintf(format: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut chars = format.chars().peekable();
    let mut next_arg = 0usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '0' => spec.zero = true,
                '#' | ' ' => {}
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if spec.width.is_some_and(too_large) {
            out.push_str("%!(BADWIDTH)");
            spec.width = None;
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            let precision = take_number(&mut chars).unwrap_or(0);
            if too_large(precision) {
                out.push_str("%!(BADPREC)");
            } else {
                spec.precision = Some(precision);
            }
        }

        let verb = match chars.next() {
            Some(v) => v,
            None => {
                out.push_str("%!(NOVERB)");
                break;
            }
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                let rendered = render(verb, arg, &spec);
                pad(&mut out, &rendered, &spec, is_numeric(arg));
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }

    if next_arg < args.len() {
        out.push_str("%!(EXTRA ");
        for (i, arg) in args[next_arg..].iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}={}", arg.type_name(), arg);
        }
        out.push(')');
    }

    out
}

/// Widths and precisions above this are rejected rather than allocated.
const MAX_WIDTH: usize = 1_000_000;

fn too_large(n: usize) -> bool {
    n > MAX_WIDTH
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
        chars.next();
    }
    value
}

fn is_numeric(arg: &Arg) -> bool {
    matches!(arg, Arg::Int(_) | Arg::Uint(_) | Arg::Float(_))
}

fn bad_verb(verb: char, arg: &Arg) -> String {
    match arg {
        Arg::Nil => format!("%!{}(<nil>)", verb),
        _ => format!("%!{}({}={})", verb, arg.type_name(), arg),
    }
}

fn signed(value: String, negative: bool, spec: &Spec) -> String {
    if spec.plus && !negative {
        format!("+{}", value)
    } else {
        value
    }
}

fn render(verb: char, arg: &Arg, spec: &Spec) -> String {
    match (verb, arg) {
        ('v', Arg::Float(x)) | ('g', Arg::Float(x)) => signed(x.to_string(), *x < 0.0, spec),
        ('v', Arg::Int(i)) | ('d', Arg::Int(i)) => signed(i.to_string(), *i < 0, spec),
        ('v', Arg::Uint(u)) | ('d', Arg::Uint(u)) => signed(u.to_string(), false, spec),
        ('v', other) => truncate(other.to_string(), spec.precision),
        ('s', Arg::Str(s)) => truncate(s.clone(), spec.precision),
        ('s', Arg::Bytes(b)) => truncate(String::from_utf8_lossy(b).into_owned(), spec.precision),
        ('s', Arg::Json(v)) => truncate(v.to_string(), spec.precision),
        ('q', Arg::Str(s)) => format!("{:?}", s),
        ('q', Arg::Bytes(b)) => format!("{:?}", String::from_utf8_lossy(b)),
        ('t', Arg::Bool(b)) => b.to_string(),
        ('f', Arg::Float(x)) | ('e', Arg::Float(x)) => {
            let precision = spec.precision.unwrap_or(6);
            let text = if verb == 'e' {
                format!("{:.*e}", precision, x)
            } else {
                format!("{:.*}", precision, x)
            };
            signed(text, *x < 0.0, spec)
        }
        ('x', Arg::Int(i)) => {
            if *i < 0 {
                format!("-{:x}", i.unsigned_abs())
            } else {
                format!("{:x}", i)
            }
        }
        ('x', Arg::Uint(u)) => format!("{:x}", u),
        ('x', Arg::Str(s)) => hex(s.as_bytes()),
        ('x', Arg::Bytes(b)) => hex(b),
        (verb, arg) => bad_verb(verb, arg),
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

fn truncate(s: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if s.chars().count() > p => s.chars().take(p).collect(),
        _ => s,
    }
}

fn pad(out: &mut String, rendered: &str, spec: &Spec, numeric: bool) {
    let len = rendered.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        out.push_str(rendered);
        return;
    }
    let fill = width - len;
    if spec.minus {
        out.push_str(rendered);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero && numeric {
        let (sign, digits) = match rendered.chars().next() {
            Some(c @ ('-' | '+')) => (Some(c), &rendered[1..]),
            _ => (None, rendered),
        };
        if let Some(sign) = sign {
            out.push(sign);
        }
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn substitutes_common_verbs() {
        assert_eq!(
            sprintf("%s %d %t %v", args!["GET", 200, true, 1.5]),
            "GET 200 true 1.5"
        );
        assert_eq!(sprintf("%q", args!["a\"b"]), "\"a\\\"b\"");
        assert_eq!(sprintf("100%%", args![]), "100%");
        assert_eq!(sprintf("%x", args![255]), "ff");
        assert_eq!(sprintf("%.2f", args![3.14159]), "3.14");
    }

    #[test]
    fn applies_width_and_flags() {
        assert_eq!(sprintf("[%5s]", args!["ab"]), "[   ab]");
        assert_eq!(sprintf("[%-5s]", args!["ab"]), "[ab   ]");
        assert_eq!(sprintf("[%05d]", args![-42]), "[-0042]");
        assert_eq!(sprintf("[%+d]", args![7]), "[+7]");
        assert_eq!(sprintf("[%.3s]", args!["abcdef"]), "[abc]");
    }

    #[test]
    fn reports_missing_and_extra_arguments_inline() {
        assert_eq!(sprintf("%s and %s", args!["one"]), "one and %!s(MISSING)");
        assert_eq!(sprintf("%s", args!["a", 2, "c"]), "a%!(EXTRA int=2, string=c)");
        assert_eq!(sprintf("%d", args!["x"]), "%!d(string=x)");
        assert_eq!(sprintf("%d", args![None::<i32>]), "%!d(<nil>)");
        assert_eq!(sprintf("tail %", args![]), "tail %!(NOVERB)");
    }

    #[test]
    fn rejects_oversized_width_and_precision() {
        assert_eq!(sprintf("%18446744073709551615d", args![1]), "%!(BADWIDTH)1");
        assert_eq!(sprintf("[%99999999999s]", args!["a"]), "[%!(BADWIDTH)a]");
        assert_eq!(sprintf("%.99999999999f", args![1.5]), "%!(BADPREC)1.500000");
        assert_eq!(sprintf("%1000000d|", args![7]).len(), 1_000_001);
    }

    #[test]
    fn renders_bytes_like_a_byte_list_under_v() {
        assert_eq!(sprintf("%v", args![vec![1u8, 2, 3]]), "[1 2 3]");
        assert_eq!(sprintf("%s", args![b"hi".to_vec()]), "hi");
    }

    #[test]
    fn sprint_spaces_only_between_non_strings() {
        assert_eq!(sprint(args!["a", "b"]), "ab");
        assert_eq!(sprint(args![1, 2]), "1 2");
        assert_eq!(sprint(args!["n=", 1, 2, "!"]), "n=1 2!");
    }
}
