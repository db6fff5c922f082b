//! Top-level call envelopes.
//!
//! A [`Request`] carries the arguments of one dynamic call and is only ever
//! written. A [`Response`] carries its results and is only ever read.
//! Both are a mapping from field id to [`Value`], laid out on the wire as a
//! single struct.

use std::collections::BTreeMap;
use std::io::Cursor;

use bytes::Bytes;
use dynthrift_protocol::{
    BinaryProtocolReader, BinaryProtocolWriter, ProtocolConfig, ProtocolReader, ProtocolWriter,
};

use crate::container::read_fields;
use crate::error::{CodecError, Result, ResultExt};
use crate::value::Value;

/// Struct name passed to `write_struct_begin` for request arguments.
pub const REQUEST_STRUCT_NAME: &str = "simple_args";

/// Placeholder field name for request arguments. Field names never reach
/// the binary wire.
pub const ARG_FIELD_NAME: &str = "arg";

/// Arguments of one dynamic call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    values: BTreeMap<i16, Value>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from `(id, value)` pairs. A repeated id keeps the last value.
    pub fn from_values(values: impl IntoIterator<Item = (i16, Value)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Set argument `id`, replacing any previous value.
    pub fn add(&mut self, id: i16, value: Value) -> &mut Self {
        self.values.insert(id, value);
        self
    }

    pub fn values(&self) -> &BTreeMap<i16, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write the arguments struct, fields in ascending id order.
    pub fn write<P: ProtocolWriter + ?Sized>(&self, writer: &mut P) -> Result<()> {
        writer
            .write_struct_begin(REQUEST_STRUCT_NAME)
            .context(|| "write request begin")?;
        for (&id, value) in &self.values {
            value
                .write_field(writer, id, ARG_FIELD_NAME)
                .context(|| format!("write request argument {id}"))?;
        }
        writer.write_field_stop().context(|| "write request stop")?;
        writer.write_struct_end().context(|| "write request end")
    }

    /// Requests are never decoded; this always fails.
    pub fn read<P: ProtocolReader + ?Sized>(_reader: &mut P) -> Result<Request> {
        tracing::error!("request envelopes are write-only; refusing to read one");
        Err(CodecError::ReadUnsupported("request"))
    }

    /// Encode with the binary protocol into a standalone buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        self.to_bytes_with_config(ProtocolConfig::default())
    }

    pub fn to_bytes_with_config(&self, config: ProtocolConfig) -> Result<Bytes> {
        let mut writer = BinaryProtocolWriter::with_config(Vec::new(), config);
        self.write(&mut writer)?;
        let buf = writer.finish().context(|| "flush request")?;
        Ok(Bytes::from(buf))
    }
}

impl FromIterator<(i16, Value)> for Request {
    fn from_iter<I: IntoIterator<Item = (i16, Value)>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

/// Results of one dynamic call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    values: BTreeMap<i16, Value>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set result `id`, replacing any previous value.
    pub fn add(&mut self, id: i16, value: Value) -> &mut Self {
        self.values.insert(id, value);
        self
    }

    pub fn values(&self) -> &BTreeMap<i16, Value> {
        &self.values
    }

    pub fn get(&self, id: i16) -> Option<&Value> {
        self.values.get(&id)
    }

    pub fn into_values(self) -> BTreeMap<i16, Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decode a result struct. Fields of unsupported wire types are skipped;
    /// a repeated id keeps the last value.
    pub fn read<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<Response> {
        let mut response = Response::new();
        read_fields(reader, |header, value| {
            response.values.insert(header.id, value);
        })
        .context(|| "read response")?;
        Ok(response)
    }

    /// Decode a binary protocol buffer holding exactly one result struct.
    pub fn from_bytes(bytes: &[u8]) -> Result<Response> {
        Self::from_bytes_with_config(bytes, ProtocolConfig::default())
    }

    pub fn from_bytes_with_config(bytes: &[u8], config: ProtocolConfig) -> Result<Response> {
        let mut reader = BinaryProtocolReader::with_config(Cursor::new(bytes), config);
        Self::read(&mut reader)
    }

    /// Writes an empty struct. Responses are produced by servers, not by this
    /// codec, so the values are not serialized.
    pub fn write<P: ProtocolWriter + ?Sized>(&self, writer: &mut P) -> Result<()> {
        writer.write_struct_begin("").context(|| "write response begin")?;
        writer.write_field_stop().context(|| "write response stop")?;
        writer.write_struct_end().context(|| "write response end")
    }
}

impl FromIterator<(i16, Value)> for Response {
    fn from_iter<I: IntoIterator<Item = (i16, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use dynthrift_protocol::{ProtocolError, TType};

    use crate::error::ErrorKind;
    use crate::value::{FieldKey, StructValue};

    use super::*;

    /// Plays the server: decodes the arguments and answers the way the
    /// echo test service does.
    fn serve(request: &[u8]) -> Vec<u8> {
        let args = Response::from_bytes(request).unwrap();
        let reply = match args.get(1) {
            Some(Value::String(id)) => Value::String(format!("Success: {id}")),
            Some(other) => other.clone(),
            None => Value::Bool(false),
        };
        let result = StructValue::new().with_field(0, "success", reply);

        let mut writer = BinaryProtocolWriter::new(Vec::new());
        crate::container::write_struct(&mut writer, &result).unwrap();
        writer.finish().unwrap()
    }

    fn key_map() -> Value {
        Value::map(
            TType::String,
            TType::Bool,
            [
                (Value::from("key 1"), Value::Bool(true)),
                (Value::from("key 2"), Value::Bool(false)),
            ],
        )
    }

    #[test]
    fn request_layout() {
        let mut request = Request::new();
        request.add(1, Value::from("ID"));
        let bytes = request.to_bytes().unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[11, 0, 1, 0, 0, 0, 2, b'I', b'D', 0]
        );
    }

    #[test]
    fn request_writes_ascending_ids() {
        let request: Request = [
            (3, Value::Enum(3)),
            (1, Value::Enum(1)),
            (2, Value::Enum(2)),
        ]
        .into_iter()
        .collect();
        let bytes = request.to_bytes().unwrap();
        let ids: Vec<u8> = bytes[..21].chunks(7).map(|field| field[2]).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(bytes.len(), 22);
    }

    #[test]
    fn request_add_replaces() {
        let mut request = Request::new();
        request.add(1, Value::Bool(true)).add(1, Value::Bool(false));
        assert_eq!(request.len(), 1);
        assert_eq!(request.values().get(&1), Some(&Value::Bool(false)));
    }

    #[test]
    fn request_read_is_unsupported() {
        let bytes = Request::new().to_bytes().unwrap();
        let mut reader = BinaryProtocolReader::new(Cursor::new(bytes.to_vec()));
        let err = Request::read(&mut reader).unwrap_err();
        assert!(matches!(err, CodecError::ReadUnsupported("request")));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn echo_call_roundtrip() {
        let mut request = Request::new();
        request.add(1, Value::from("ID"));

        let reply = serve(&request.to_bytes().unwrap());
        let response = Response::from_bytes(&reply).unwrap();

        let expected: BTreeMap<i16, Value> = [(0, Value::from("Success: ID"))].into();
        assert_eq!(response.values(), &expected);
    }

    #[test]
    fn map_argument_roundtrip() {
        let request = Request::from_values([(1, key_map())]);

        let reply = serve(&request.to_bytes().unwrap());
        let response = Response::from_bytes(&reply).unwrap();

        assert_eq!(response.get(0), Some(&key_map()));
    }

    #[test]
    fn nested_struct_roundtrip() {
        let leaf = Value::structure([
            (FieldKey::unnamed(1), Value::from("leaf")),
            (FieldKey::unnamed(2), Value::Enum(7)),
        ]);
        let middle = Value::map(TType::String, TType::Struct, [(Value::from("inner"), leaf)]);
        let root = Value::structure([
            (FieldKey::unnamed(1), middle),
            (FieldKey::unnamed(2), Value::Bool(true)),
        ]);
        let request = Request::from_values([(1, root.clone())]);

        let response = Response::from_bytes(&serve(&request.to_bytes().unwrap())).unwrap();
        assert_eq!(response.get(0), Some(&root));
    }

    #[test]
    fn response_skips_unknown_fields() {
        let mut writer = BinaryProtocolWriter::new(Vec::new());
        writer.write_struct_begin("").unwrap();
        writer.write_field_begin("", TType::Double, 5).unwrap();
        writer.write_double(0.25).unwrap();
        writer.write_field_end().unwrap();
        writer.write_field_begin("", TType::List, 0).unwrap();
        writer.write_list_begin(TType::String, 1).unwrap();
        writer.write_string("ok").unwrap();
        writer.write_list_end().unwrap();
        writer.write_field_end().unwrap();
        writer.write_field_stop().unwrap();
        writer.write_struct_end().unwrap();
        let bytes = writer.finish().unwrap();

        let response = Response::from_bytes(&bytes).unwrap();
        assert_eq!(response.len(), 1);
        assert_eq!(
            response.get(0),
            Some(&Value::list(TType::String, [Value::from("ok")]))
        );
    }

    #[test]
    fn truncated_response_fails_whole_decode() {
        let mut bytes = Request::from_values([(1, key_map()), (2, Value::from("tail"))])
            .to_bytes()
            .unwrap()
            .to_vec();
        bytes.pop();

        let err = Response::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(matches!(
            err.protocol_error(),
            Some(ProtocolError::UnexpectedEof)
        ));
        assert!(err.to_string().starts_with("read response: "));
    }

    #[test]
    fn response_write_is_empty_struct() {
        let mut response = Response::new();
        response.add(0, Value::from("ignored"));

        let mut writer = BinaryProtocolWriter::new(Vec::new());
        response.write(&mut writer).unwrap();
        assert_eq!(writer.finish().unwrap(), vec![0]);
    }

    #[test]
    fn response_into_values() {
        let response: Response = [(0, Value::Enum(1)), (4, Value::Bool(true))]
            .into_iter()
            .collect();
        let values = response.into_values();
        assert_eq!(values.keys().copied().collect::<Vec<_>>(), vec![0, 4]);
    }
}
