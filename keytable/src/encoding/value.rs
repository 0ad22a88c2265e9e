//! Typed property values accepted by the sort-key encoder.

/// A typed value to be turned into a sort column.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::disallowed_methods)] // Values are cloned into test fixtures
pub enum PropValue {
    Null,
    Boolean(bool),
    Short(i16),
    Long(i32),
    LongLong(i64),
    /// Fixed-point currency, scaled by 10 000.
    Currency(i64),
    /// 100-nanosecond intervals since 1601-01-01 UTC.
    SystemTime(u64),
    Float(f32),
    Double(f64),
    /// OLE automation date.
    AppTime(f64),
    String(String),
    Binary(Vec<u8>),
    Guid([u8; 16]),
    /// An error code stored in place of a value.
    Error(u32),
    /// A multi-valued property. Callers expand these into one row per value.
    MultiValue(Vec<PropValue>),
}

/// Discriminant of a [`PropValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    Null,
    Boolean,
    Short,
    Long,
    LongLong,
    Currency,
    SystemTime,
    Float,
    Double,
    AppTime,
    String,
    Binary,
    Guid,
    Error,
    MultiValue,
}

impl PropValue {
    /// Get the type discriminant.
    #[must_use]
    pub const fn prop_type(&self) -> PropType {
        match self {
            Self::Null => PropType::Null,
            Self::Boolean(_) => PropType::Boolean,
            Self::Short(_) => PropType::Short,
            Self::Long(_) => PropType::Long,
            Self::LongLong(_) => PropType::LongLong,
            Self::Currency(_) => PropType::Currency,
            Self::SystemTime(_) => PropType::SystemTime,
            Self::Float(_) => PropType::Float,
            Self::Double(_) => PropType::Double,
            Self::AppTime(_) => PropType::AppTime,
            Self::String(_) => PropType::String,
            Self::Binary(_) => PropType::Binary,
            Self::Guid(_) => PropType::Guid,
            Self::Error(_) => PropType::Error,
            Self::MultiValue(_) => PropType::MultiValue,
        }
    }
}
