use std::io::{self, Write};

use serde::Serialize;
use serde_json::{json, Value};

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &Value) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(event: Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, &event)
}

/// `{"event": <name>, <key>: <payload>}`
pub fn tagged<T: Serialize>(event: &str, key: &str, payload: &T) -> Value {
    let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
    let mut object = json!({ "event": event });
    object[key] = payload;
    object
}
