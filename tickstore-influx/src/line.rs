//! Line-protocol encoding for `/write` requests.

use std::fmt::Write as _;

use tickstore_core::{FieldValue, Point, TickstoreError};

/// Encode `point` as one line of InfluxDB line protocol.
///
/// The timestamp is omitted when the point has none, so the server stamps the
/// point with its own write time.
///
/// # Errors
/// Returns `InvalidArg` when the point has an empty measurement, an empty tag
/// value, no fields, or a non-finite float field.
pub fn encode(point: &Point) -> Result<String, TickstoreError> {
    if point.measurement.is_empty() {
        return Err(TickstoreError::InvalidArg("point has no measurement".into()));
    }
    if point.fields.is_empty() {
        return Err(TickstoreError::InvalidArg(format!(
            "point {:?} has no fields",
            point.measurement
        )));
    }

    let mut line = escape(&point.measurement, &[',', ' ']);
    for (k, v) in &point.tags {
        if v.is_empty() {
            return Err(TickstoreError::InvalidArg(format!("tag {k:?} has an empty value")));
        }
        let _ = write!(
            line,
            ",{}={}",
            escape(k, &[',', ' ', '=']),
            escape(v, &[',', ' ', '='])
        );
    }

    let mut sep = ' ';
    for (k, v) in &point.fields {
        let _ = write!(line, "{sep}{}={}", escape(k, &[',', ' ', '=']), field(k, v)?);
        sep = ',';
    }

    if let Some(ts) = point.timestamp {
        let nanos = ts.timestamp_nanos_opt().ok_or_else(|| {
            TickstoreError::InvalidArg(format!("timestamp {ts} out of range"))
        })?;
        let _ = write!(line, " {nanos}");
    }
    Ok(line)
}

fn field(key: &str, value: &FieldValue) -> Result<String, TickstoreError> {
    Ok(match value {
        FieldValue::Float(f) if f.is_finite() => {
            // Integral floats must keep a decimal point, or they are stored as integers.
            if f.fract() == 0.0 {
                format!("{f}.0")
            } else {
                f.to_string()
            }
        }
        FieldValue::Float(f) => {
            return Err(TickstoreError::InvalidArg(format!(
                "field {key:?} is not finite: {f}"
            )));
        }
        FieldValue::Integer(i) => format!("{i}i"),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Text(s) => format!("\"{}\"", escape(s, &['"'])),
    })
}

fn escape(raw: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
