//! Gateway JSON encoding of response records
//!
//! The gateway signs a response over the text its own JSON encoder produces
//! after decoding the body into a generic map: keys sorted, no whitespace,
//! `<`, `>`, `&`, U+2028 and U+2029 escaped as `\uXXXX`, and every number
//! written back as a float64 in shortest form (`1.0` becomes `1`).

use crate::types::ResponseRecord;
use crate::{AllinpayError, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// Compact formatter reproducing the gateway's string and number output
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayFormatter;

impl GatewayFormatter {
    fn write_number<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }
}

impl Formatter for GatewayFormatter {
    fn write_i64<W>(&mut self, writer: &mut W, value: i64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_number(writer, value as f64)
    }

    fn write_u64<W>(&mut self, writer: &mut W, value: u64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_number(writer, value as f64)
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_number(writer, value)
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..index].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Shortest float64 text: plain digits, exponent form below 1e-6 or from 1e21
fn format_float(value: f64) -> String {
    let abs = value.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let text = format!("{:e}", value);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        format!("{}", value)
    }
}

/// Serialize a response record the way the gateway signs it
pub fn marshal_record(record: &ResponseRecord) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, GatewayFormatter);
    record.serialize(&mut serializer).map_err(|e| {
        AllinpayError::verification(format!("Failed to re-serialize response: {}", e))
    })?;
    String::from_utf8(out)
        .map_err(|_| AllinpayError::verification("Re-serialized response is not UTF-8"))
}
