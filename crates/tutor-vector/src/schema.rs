use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow schema for the passages table. The vector width follows the
/// embedder in use; page -1 encodes an unknown page.
pub fn build_arrow_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("page", DataType::Int32, false),
        Field::new("topic", DataType::Utf8, false),
        Field::new("token_count", DataType::Int32, false),
        Field::new("start_offset", DataType::Int32, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
