//! Record emission boundary.
//!
//! Writes Singer-style JSON-line messages: one `SCHEMA` message per stream,
//! then one `RECORD` message per validated record, in iteration order. The
//! sink's acknowledgement is not part of this crate's contract; a write
//! failure simply terminates the enclosing iteration.

use std::io;

use serde_json::{json, Value};

use crate::{catalog::StreamDefinition, error::Error};

/// Destination for validated records and their schema announcements.
pub trait RecordSink {
    /// Announces a stream's schema before any of its records.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the message cannot be written.
    fn write_schema(
        &mut self,
        definition: &StreamDefinition,
        schema: &Value,
    ) -> Result<(), Error>;

    /// Hands one validated record onward.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the message cannot be written.
    fn write_record(&mut self, stream: &str, record: &Value) -> Result<(), Error>;
}

/// JSON-lines message writer over any [`io::Write`] destination.
pub struct MessageWriter<W> {
    writer: W,
}

impl<W> MessageWriter<W>
where
    W: io::Write,
{
    /// Wraps the provided writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_message(&mut self, message: &Value) -> Result<(), Error> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer
            .write_all(b"\n")
            .map_err(|source| Error::Emit { source })?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> RecordSink for MessageWriter<W>
where
    W: io::Write,
{
    fn write_schema(
        &mut self,
        definition: &StreamDefinition,
        schema: &Value,
    ) -> Result<(), Error> {
        let mut message = json!({
            "type": "SCHEMA",
            "stream": definition.name,
            "schema": schema,
            "key_properties": definition.primary_keys,
        });
        if let Some(replication_key) = definition.replication_key {
            message["bookmark_properties"] = json!([replication_key]);
        }
        self.write_message(&message)
    }

    fn write_record(&mut self, stream: &str, record: &Value) -> Result<(), Error> {
        let message = json!({
            "type": "RECORD",
            "stream": stream,
            "record": record,
        });
        self.write_message(&message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{MessageWriter, RecordSink};
    use crate::catalog::find_stream;

    fn written_lines(buffer: Vec<u8>) -> Vec<Value> {
        String::from_utf8(buffer)
            .expect("invalid UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("invalid message JSON"))
            .collect()
    }

    #[test]
    fn schema_message_carries_key_properties() {
        let definition = find_stream("selections").expect("selections is defined");
        let schema = json!({"type": "object"});
        let mut writer = MessageWriter::new(Vec::new());

        writer
            .write_schema(definition, &schema)
            .expect("write failed");

        let messages = written_lines(writer.into_inner());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], json!("SCHEMA"));
        assert_eq!(messages[0]["stream"], json!("selections"));
        assert_eq!(
            messages[0]["key_properties"],
            json!(["manager_id", "gameweek"])
        );
        assert!(messages[0].get("bookmark_properties").is_none());
    }

    #[test]
    fn schema_message_declares_bookmark_for_replication_key() {
        let definition = find_stream("standings").expect("standings is defined");
        let schema = json!({"type": "object"});
        let mut writer = MessageWriter::new(Vec::new());

        writer
            .write_schema(definition, &schema)
            .expect("write failed");

        let messages = written_lines(writer.into_inner());
        assert_eq!(
            messages[0]["bookmark_properties"],
            json!(["last_updated_data"])
        );
    }

    #[test]
    fn record_messages_are_newline_separated() {
        let mut writer = MessageWriter::new(Vec::new());

        writer
            .write_record("teams", &json!({"id": 1}))
            .expect("write failed");
        writer
            .write_record("teams", &json!({"id": 2}))
            .expect("write failed");

        let messages = written_lines(writer.into_inner());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["type"], json!("RECORD"));
        assert_eq!(messages[0]["record"], json!({"id": 1}));
        assert_eq!(messages[1]["record"], json!({"id": 2}));
    }
}
