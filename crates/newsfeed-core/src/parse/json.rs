//! JSON input: `{"type": .., "data": {..}}` or `{"records": [..]}`.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use snafu::ResultExt as _;
use tracing::debug;

use super::{
    Decoded, Fields, InvalidFormatSnafu, JsonSnafu, LOG_TARGET, ParseResult, ReadSnafu,
    build_record, shape_error,
};
use crate::record::{MalformedRecordSnafu, Record, RecordResult};

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: Option<String>,
    data: Map<String, Value>,
}

impl Fields for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

pub fn decode(bytes: &[u8]) -> ParseResult<Decoded> {
    let value: Value = serde_json::from_slice(bytes)
        .context(JsonSnafu)
        .context(InvalidFormatSnafu)?;

    let Value::Object(mut top) = value else {
        return Err(shape_error("expected a JSON object at the top level"));
    };

    if let Some(records) = top.remove("records") {
        let Value::Array(records) = records else {
            return Err(shape_error("'records' must be an array"));
        };
        debug!(target: LOG_TARGET, count = records.len(), "Decoding JSON record collection");
        return Ok(records.into_iter().map(decode_envelope).collect());
    }

    if top.contains_key("type") && top.contains_key("data") {
        debug!(target: LOG_TARGET, "Decoding single JSON record");
        return Ok(std::iter::once(decode_envelope(Value::Object(top))).collect());
    }

    Err(shape_error(
        "expected a 'records' array or a single record with 'type' and 'data'",
    ))
}

pub fn decode_file(path: impl AsRef<Path>) -> ParseResult<Decoded> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).context(ReadSnafu {
        path: path.to_owned(),
    })?;
    decode(&bytes)
}

fn decode_envelope(value: Value) -> RecordResult<Record> {
    let envelope: Envelope = serde_json::from_value(value).map_err(|err| {
        MalformedRecordSnafu {
            reason: err.to_string(),
        }
        .build()
    })?;
    build_record(envelope.tag.as_deref(), &envelope.data)
}
