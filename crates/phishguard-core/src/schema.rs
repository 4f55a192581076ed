/// Arrow schema definitions for the two-column message tables.
pub mod messages {
    use std::sync::Arc;

    use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

    pub const LABEL: &str = "label";
    pub const MESSAGE: &str = "message";

    /// Schema shared by the feedback store, the verified corpus, and the
    /// training corpus preview. Both columns are nullable so that rows with a
    /// missing field survive decoding and can be dropped explicitly.
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new(LABEL, DataType::Utf8, true),
            Field::new(MESSAGE, DataType::Utf8, true),
        ])
    }

    pub fn schema_ref() -> SchemaRef {
        Arc::new(schema())
    }
}

#[cfg(test)]
mod tests {
    use super::messages;

    #[test]
    fn message_schema_has_label_then_message() {
        let schema = messages::schema();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.field(0).name(), messages::LABEL);
        assert_eq!(schema.field(1).name(), messages::MESSAGE);
        assert!(schema.field(1).is_nullable());
    }
}
