//! InfluxDB line protocol encoding.
//!
//! ```text
//! teamspeak_server,id=1,port=9987 online=true,v_clients=4u,avg_ping=12.5
//! ```

use std::fmt::Write;

use crate::error::{Error, Result};
use crate::measurement::{FieldValue, Measurement};

/// Encode a measurement as a single newline-terminated line.
///
/// Tags with empty values are left out since the protocol cannot carry them,
/// and so are non-finite floats. A measurement left without any field is an
/// error.
pub fn encode(measurement: &Measurement) -> Result<String> {
    if measurement.name.is_empty() {
        return Err(Error::Measurement("empty measurement name".to_string()));
    }

    let mut line = String::with_capacity(256);
    escape_into(&mut line, &measurement.name, &[',', ' ']);

    for (key, value) in &measurement.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    let mut written = 0;
    for (key, value) in &measurement.fields {
        if key.is_empty() || !is_encodable(value) {
            continue;
        }
        line.push(if written == 0 { ' ' } else { ',' });
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        write_value(&mut line, value);
        written += 1;
    }

    if written == 0 {
        return Err(Error::Measurement(format!(
            "measurement '{}' has no encodable fields",
            measurement.name
        )));
    }

    line.push('\n');
    Ok(line)
}

fn is_encodable(value: &FieldValue) -> bool {
    match value {
        FieldValue::Float32(v) => v.is_finite(),
        FieldValue::Float64(v) => v.is_finite(),
        _ => true,
    }
}

fn write_value(out: &mut String, value: &FieldValue) {
    // Writing into a String cannot fail.
    let _ = match value {
        FieldValue::UInt16(v) => write!(out, "{}u", v),
        FieldValue::UInt64(v) => write!(out, "{}u", v),
        FieldValue::Int64(v) => write!(out, "{}i", v),
        FieldValue::Float32(v) => write!(out, "{}", v),
        FieldValue::Float64(v) => write!(out, "{}", v),
        FieldValue::Boolean(v) => write!(out, "{}", v),
        FieldValue::Text(s) => {
            out.push('"');
            for c in s.chars() {
                match c {
                    '"' | '\\' => {
                        out.push('\\');
                        out.push(c);
                    }
                    '\n' => out.push_str("\\n"),
                    _ => out.push(c),
                }
            }
            out.push('"');
            Ok(())
        }
    };
}

/// Escape identifiers (names, keys, tag values). Newlines would end the
/// line, so they are written as a literal `\n`. A backslash that would
/// otherwise escape the following separator is doubled.
fn escape_into(out: &mut String, s: &str, special: &[char]) {
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => out.push_str("\\n"),
            '\\' => {
                let escapes_next = match chars.peek() {
                    None => true,
                    Some(next) => special.contains(next) || *next == '\n',
                };
                out.push('\\');
                if escapes_next {
                    out.push('\\');
                }
            }
            _ => {
                if special.contains(&c) {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
}
