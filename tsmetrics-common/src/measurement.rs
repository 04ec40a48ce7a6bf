use std::collections::BTreeMap;

/// A named, tagged set of typed fields written to a metrics sink.
///
/// Tags are kept sorted by key (the order the line protocol prefers);
/// fields keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Measurement name (e.g., "teamspeak_server").
    pub name: String,

    /// Indexing labels (e.g., port, id).
    pub tags: BTreeMap<String, String>,

    /// Measured values.
    pub fields: Vec<(String, FieldValue)>,
}

impl Measurement {
    /// Create an empty measurement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    /// Add a tag to this measurement.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field to this measurement, replacing any field with the same key.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Look up a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Look up a field value.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Typed field value.
///
/// Integer widths are part of the downstream contract, so each width the
/// bridges emit has its own variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Unsigned 16-bit integer.
    UInt16(u16),

    /// Unsigned 64-bit integer.
    UInt64(u64),

    /// Signed 64-bit integer.
    Int64(i64),

    /// Single-precision float.
    Float32(f32),

    /// Double-precision float.
    Float64(f64),

    /// Boolean value.
    Boolean(bool),

    /// Text value.
    Text(String),
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        FieldValue::UInt16(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt64(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int64(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float32(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float64(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_creation() {
        let m = Measurement::new("teamspeak_server")
            .with_tag("port", "9987")
            .with_field("online", true)
            .with_field("bytes_in", 1024u64);

        assert_eq!(m.name, "teamspeak_server");
        assert_eq!(m.tag("port"), Some("9987"));
        assert_eq!(m.field("online"), Some(&FieldValue::Boolean(true)));
        assert_eq!(m.field("bytes_in"), Some(&FieldValue::UInt64(1024)));
        assert_eq!(m.field("missing"), None);
    }

    #[test]
    fn test_field_replaced_in_place() {
        let m = Measurement::new("m")
            .with_field("a", 1u64)
            .with_field("b", 2u64)
            .with_field("a", 3u64);

        let keys: Vec<&str> = m.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(m.field("a"), Some(&FieldValue::UInt64(3)));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(FieldValue::from(7u16), FieldValue::UInt16(7));
        assert_eq!(FieldValue::from(-7i64), FieldValue::Int64(-7));
        assert_eq!(FieldValue::from(0.5f32), FieldValue::Float32(0.5));
        assert_eq!(FieldValue::from(0.25), FieldValue::Float64(0.25));
        assert_eq!(
            FieldValue::from("text"),
            FieldValue::Text("text".to_string())
        );
    }
}
