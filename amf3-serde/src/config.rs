use std::collections::HashSet;

/// How struct field names are written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldCase {
    /// The first character of every field name is lowercased, so `UserId` goes out as `userId`.
    #[default]
    LowerFirst,
    /// Field names are written as declared.
    Preserve,
}

/// What happens to an object key that matches no field of the destination struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFields {
    /// Decoding fails with `Error::UnknownField`.
    #[default]
    Deny,
    /// The key and its value are dropped.
    Ignore,
}

/// Fields whose wire name is taken literally, identified by record and serialized field name.
/// For struct variants the record is the name of the enum.
pub type LiteralFields = HashSet<(&'static str, &'static str)>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncoderConfig {
    pub field_case: FieldCase,
    pub literal_fields: LiteralFields,
}

impl EncoderConfig {
    pub fn with_field_case(mut self, field_case: FieldCase) -> Self {
        self.field_case = field_case;
        self
    }

    /// Writes `field` of `record` exactly as serde names it, regardless of `field_case`. Use this
    /// for fields carrying a `#[serde(rename)]`.
    pub fn with_literal_field(mut self, record: &'static str, field: &'static str) -> Self {
        self.literal_fields.insert((record, field));
        self
    }

    pub fn is_literal(&self, record: &'static str, field: &'static str) -> bool {
        self.literal_fields.contains(&(record, field))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    pub unknown_fields: UnknownFields,
    pub literal_fields: LiteralFields,
}

impl DecoderConfig {
    pub fn with_unknown_fields(mut self, unknown_fields: UnknownFields) -> Self {
        self.unknown_fields = unknown_fields;
        self
    }

    /// Binds `field` of `record` only to a wire key equal to its serde name, without normalizing
    /// the case of the first letter.
    pub fn with_literal_field(mut self, record: &'static str, field: &'static str) -> Self {
        self.literal_fields.insert((record, field));
        self
    }

    pub fn is_literal(&self, record: &'static str, field: &'static str) -> bool {
        self.literal_fields.contains(&(record, field))
    }
}
