//! Runtime printf-style formatting of a template with loosely typed arguments.
//!
//! Formatting never fails. Problems are rendered inline in the output:
//!
//! | Problem                | Output                      |
//! |------------------------|-----------------------------|
//! | wrong argument type    | `%!d(string=abc)`           |
//! | missing argument       | `%!d(MISSING)`              |
//! | unknown verb           | `%!z(int=5)`                |
//! | `%` at end of template | `%!(NOVERB)`                |
//! | unused arguments       | `%!(EXTRA int=5, string=x)` |
//! | width over 1000000     | `%!(BADWIDTH)`              |
//! | precision over 1000000 | `%!(BADPREC)`               |
//!
//! A bad width or precision is dropped and the verb is still rendered with its argument.
//!
//! `Value::Char` is a character, not a number: `%v`, `%c` and `%q` print the character and
//! `%d` prints its code point.
//!
//! ```
//! use sevlog::template::{format, Value};
//!
//! assert_eq!(format("x=%d", &[Value::from(5)]), "x=5");
//! assert_eq!(format("%s and %s", &[Value::from("a")]), "a and %!s(MISSING)");
//! ```
use regex::Regex;
use std::fmt::{self, Write};

lazy_static! {
    // flags, width, precision, verb. The verb is optional so a lone trailing `%` still matches.
    static ref VERB: Regex = Regex::new(r"(?s)%([-+# 0]*)(\d+)?(?:\.(\d*))?(.)?").unwrap();
}

// Largest accepted width or precision.
const MAX_WIDTH: usize = 1_000_000;

/// A template argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
        }
    }

    /// Type a command line argument by its shape: integer, finite float, boolean, or string.
    pub fn sniff(arg: &str) -> Value {
        if let Ok(int) = arg.parse::<i64>() {
            return Value::Int(int);
        }
        if let Ok(uint) = arg.parse::<u64>() {
            return Value::Uint(uint);
        }
        match arg.parse::<f64>() {
            Ok(float) if float.is_finite() => return Value::Float(float),
            _ => {}
        }
        match arg {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Str(arg.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(float) => write!(f, "{}", shortest_float(*float, false)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )+
    };
}

value_from!(Int, i64, i8, i16, i32, i64, isize);
value_from!(Uint, u64, u8, u16, u32, u64, usize);
value_from!(Float, f64, f32, f64);

#[derive(Debug, Default, PartialEq)]
struct Spec {
    minus: bool,
    plus: bool,
    sharp: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    bad_width: bool,
    bad_precision: bool,
}

impl Spec {
    fn parse(flags: &str, width: Option<&str>, precision: Option<&str>) -> Self {
        let mut spec = Spec::default();
        for flag in flags.chars() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '#' => spec.sharp = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                _ => {}
            }
        }
        if let Some(width) = width {
            match bounded(width) {
                Some(width) => spec.width = Some(width),
                None => spec.bad_width = true,
            }
        }
        match precision {
            // `%.f` means precision zero
            Some("") => spec.precision = Some(0),
            Some(precision) => match bounded(precision) {
                Some(precision) => spec.precision = Some(precision),
                None => spec.bad_precision = true,
            },
            None => {}
        }
        spec
    }

    /// Render one argument, or `None` when the verb does not apply to it.
    fn render(&self, verb: char, value: &Value) -> Option<String> {
        let body = match (verb, value) {
            ('T', value) => value.type_name().to_string(),
            ('v', Value::Str(s)) | ('s', Value::Str(s)) => self.truncate(s),
            ('v', Value::Char(c)) | ('c', Value::Char(c)) => c.to_string(),
            ('v', Value::Bool(b)) | ('t', Value::Bool(b)) => b.to_string(),
            ('v', Value::Float(f)) => match self.precision {
                Some(precision) => self.signed(fixed_float(*f, precision)),
                None => self.signed(shortest_float(*f, false)),
            },
            ('v', Value::Int(_)) | ('v', Value::Uint(_)) => self.integer('d', value)?,
            ('d', Value::Int(_))
            | ('d', Value::Uint(_))
            | ('d', Value::Char(_))
            | ('x', Value::Int(_))
            | ('x', Value::Uint(_))
            | ('X', Value::Int(_))
            | ('X', Value::Uint(_))
            | ('o', Value::Int(_))
            | ('o', Value::Uint(_))
            | ('b', Value::Int(_))
            | ('b', Value::Uint(_)) => self.integer(verb, value)?,
            ('x', Value::Str(s)) => hex_bytes(s, false),
            ('X', Value::Str(s)) => hex_bytes(s, true),
            ('c', Value::Int(i)) => code_point(u32::try_from(*i).ok()),
            ('c', Value::Uint(u)) => code_point(u32::try_from(*u).ok()),
            ('q', Value::Str(s)) => format!("{:?}", self.truncate(s)),
            ('q', Value::Char(c)) => format!("{:?}", c),
            ('f', Value::Float(f)) | ('F', Value::Float(f)) => {
                self.signed(fixed_float(*f, self.precision.unwrap_or(6)))
            }
            ('e', Value::Float(f)) | ('E', Value::Float(f)) => {
                self.signed(exponent_float(*f, self.precision.unwrap_or(6), verb == 'E'))
            }
            ('g', Value::Float(f)) | ('G', Value::Float(f)) => match self.precision {
                Some(precision) => self.signed(fixed_float(*f, precision)),
                None => self.signed(shortest_float(*f, verb == 'G')),
            },
            _ => return None,
        };
        Some(self.pad(body, is_numeric(value) && verb != 'T' && verb != 'c'))
    }

    fn integer(&self, verb: char, value: &Value) -> Option<String> {
        let (negative, magnitude) = match value {
            Value::Int(i) => (*i < 0, i.unsigned_abs()),
            Value::Uint(u) => (false, *u),
            Value::Char(c) => (false, u64::from(u32::from(*c))),
            _ => return None,
        };
        let digits = match verb {
            'd' => magnitude.to_string(),
            'x' => format!("{}{:x}", if self.sharp { "0x" } else { "" }, magnitude),
            'X' => format!("{}{:X}", if self.sharp { "0X" } else { "" }, magnitude),
            'o' => format!("{}{:o}", if self.sharp { "0" } else { "" }, magnitude),
            'b' => format!("{:b}", magnitude),
            _ => return None,
        };
        if negative {
            Some(format!("-{}", digits))
        } else {
            Some(self.signed(digits))
        }
    }

    // Prefix a non-negative number with `+` or a space when asked to.
    fn signed(&self, number: String) -> String {
        if number.starts_with('-') || number.starts_with('+') {
            number
        } else if self.plus {
            format!("+{}", number)
        } else if self.space {
            format!(" {}", number)
        } else {
            number
        }
    }

    fn truncate(&self, s: &str) -> String {
        match self.precision {
            Some(precision) => s.chars().take(precision).collect(),
            None => s.to_string(),
        }
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let width = match self.width {
            Some(width) => width,
            None => return body,
        };
        let length = body.chars().count();
        if length >= width {
            return body;
        }
        let fill = width - length;
        if self.minus {
            format!("{}{}", body, " ".repeat(fill))
        } else if self.zero && numeric {
            let sign_length = if body.starts_with(&['-', '+', ' '][..]) { 1 } else { 0 };
            let (sign, digits) = body.split_at(sign_length);
            format!("{}{}{}", sign, "0".repeat(fill), digits)
        } else {
            format!("{}{}", " ".repeat(fill), body)
        }
    }
}

/// Substitute `args` into `template`, one argument per verb in order.
pub fn format(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    let mut next = 0;
    for captures in VERB.captures_iter(template) {
        let whole = match captures.get(0) {
            Some(whole) => whole,
            None => continue,
        };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let verb = match captures.get(4).and_then(|verb| verb.as_str().chars().next()) {
            Some(verb) => verb,
            None => {
                out.push_str("%!(NOVERB)");
                continue;
            }
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let spec = Spec::parse(
            captures.get(1).map_or("", |m| m.as_str()),
            captures.get(2).map(|m| m.as_str()),
            captures.get(3).map(|m| m.as_str()),
        );
        if spec.bad_width {
            out.push_str("%!(BADWIDTH)");
        }
        if spec.bad_precision {
            out.push_str("%!(BADPREC)");
        }
        match args.get(next) {
            Some(value) => {
                next += 1;
                match spec.render(verb, value) {
                    Some(rendered) => out.push_str(&rendered),
                    None => {
                        let _ = write!(out, "%!{}({}={})", verb, value.type_name(), value);
                    }
                }
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }
    out.push_str(&template[last..]);

    if next < args.len() {
        let extra = args[next..]
            .iter()
            .map(|value| format!("{}={}", value.type_name(), value))
            .collect::<Vec<String>>()
            .join(", ");
        let _ = write!(out, "%!(EXTRA {})", extra);
    }
    out
}

fn bounded(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|number| *number <= MAX_WIDTH)
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Uint(_) | Value::Float(_))
}

fn hex_bytes(s: &str, upper: bool) -> String {
    s.bytes()
        .map(|byte| {
            if upper {
                format!("{:02X}", byte)
            } else {
                format!("{:02x}", byte)
            }
        })
        .collect()
}

fn code_point(value: Option<u32>) -> String {
    value
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "+Inf" } else { "-Inf" }.to_string())
    } else {
        None
    }
}

// Every f64 is exact within this many fractional digits, later digits are zeros.
const EXACT_DIGITS: usize = 1100;

fn fixed_float(value: f64, precision: usize) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }
    let exact = precision.min(EXACT_DIGITS);
    let mut text = format!("{:.*}", exact, value);
    text.push_str(&"0".repeat(precision - exact));
    text
}

fn exponent_float(value: f64, precision: usize, upper: bool) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }
    let exact = precision.min(EXACT_DIGITS);
    let raw = format!("{:.*e}", exact, value);
    let raw = match raw.split_once('e') {
        Some((mantissa, exponent)) => format!(
            "{}{}e{}",
            mantissa,
            "0".repeat(precision - exact),
            exponent
        ),
        None => raw,
    };
    two_digit_exponent(&raw, upper)
}

// Shortest representation, switching to exponent notation for very large and very small
// magnitudes: 1e+21, 1.5e-07.
fn shortest_float(value: f64, upper: bool) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e21).contains(&magnitude) {
        two_digit_exponent(&format!("{:e}", value), upper)
    } else {
        format!("{}", value)
    }
}

// Rust renders `1.5e-7`; records show `1.5e-07`.
fn two_digit_exponent(raw: &str, upper: bool) -> String {
    let (mantissa, exponent) = match raw.split_once('e') {
        Some(parts) => parts,
        None => return raw.to_string(),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}
