//! Column type grammar: primitives, and the recursive composite forms
//! ClickHouse supports (Nullable, Array, Tuple, Map, Nested, LowCardinality,
//! and the parametric scalar types).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Float32,
    Float64,
    String,
    Bool,
    Date,
    Date32,
    DateTime { timezone: Option<String> },
    Uuid,
    IPv4,
    IPv6,
    Point,
    Ring,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Int8 => write!(f, "Int8"),
            PrimitiveType::Int16 => write!(f, "Int16"),
            PrimitiveType::Int32 => write!(f, "Int32"),
            PrimitiveType::Int64 => write!(f, "Int64"),
            PrimitiveType::Int128 => write!(f, "Int128"),
            PrimitiveType::Int256 => write!(f, "Int256"),
            PrimitiveType::UInt8 => write!(f, "UInt8"),
            PrimitiveType::UInt16 => write!(f, "UInt16"),
            PrimitiveType::UInt32 => write!(f, "UInt32"),
            PrimitiveType::UInt64 => write!(f, "UInt64"),
            PrimitiveType::UInt128 => write!(f, "UInt128"),
            PrimitiveType::UInt256 => write!(f, "UInt256"),
            PrimitiveType::Float32 => write!(f, "Float32"),
            PrimitiveType::Float64 => write!(f, "Float64"),
            PrimitiveType::String => write!(f, "String"),
            PrimitiveType::Bool => write!(f, "Bool"),
            PrimitiveType::Date => write!(f, "Date"),
            PrimitiveType::Date32 => write!(f, "Date32"),
            PrimitiveType::DateTime { timezone: Some(tz) } => write!(f, "DateTime('{tz}')"),
            PrimitiveType::DateTime { timezone: None } => write!(f, "DateTime"),
            PrimitiveType::Uuid => write!(f, "UUID"),
            PrimitiveType::IPv4 => write!(f, "IPv4"),
            PrimitiveType::IPv6 => write!(f, "IPv6"),
            PrimitiveType::Point => write!(f, "Point"),
            PrimitiveType::Ring => write!(f, "Ring"),
            PrimitiveType::LineString => write!(f, "LineString"),
            PrimitiveType::MultiLineString => write!(f, "MultiLineString"),
            PrimitiveType::Polygon => write!(f, "Polygon"),
            PrimitiveType::MultiPolygon => write!(f, "MultiPolygon"),
        }
    }
}

/// One field of a `Tuple(...)` type. ClickHouse tuples may name some,
/// all, or none of their elements.
#[derive(Debug, Clone)]
pub struct TupleField {
    pub name: Option<String>,
    pub ty: ColumnType,
}

impl PartialEq for TupleField {
    fn eq(&self, other: &Self) -> bool {
        // Names are only significant when both sides bothered to name the
        // position; otherwise two tuples that agree positionally on type
        // are the same type (spec.md §3: "ignoring tuple element naming
        // unless both sides name a position").
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => a == b && self.ty == other.ty,
            _ => self.ty == other.ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedField {
    pub name: String,
    pub ty: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumWidth {
    Enum8,
    Enum16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Primitive(PrimitiveType),
    Nullable(Box<ColumnType>),
    LowCardinality(Box<ColumnType>),
    Array(Box<ColumnType>),
    Tuple(Vec<TupleField>),
    Map(Box<ColumnType>, Box<ColumnType>),
    Nested(Vec<NestedField>),
    FixedString(u32),
    Decimal { precision: u8, scale: u8 },
    DateTime64 { precision: u8, timezone: Option<String> },
    Enum { width: EnumWidth, members: Vec<EnumMember> },
    /// Fallback for a type spelled `Name(arg, arg, ...)` this grammar does
    /// not model explicitly (e.g. `AggregateFunction(sum, UInt64)`).
    Parametric { name: String, raw_params: String },
}

impl ColumnType {
    pub fn is_nullable(&self) -> bool {
        matches!(self, ColumnType::Nullable(_))
    }

    /// Strips one layer of `Nullable`/`LowCardinality` wrapping, the way
    /// callers usually want to inspect "the real type underneath".
    pub fn innermost(&self) -> &ColumnType {
        match self {
            ColumnType::Nullable(inner) | ColumnType::LowCardinality(inner) => inner.innermost(),
            other => other,
        }
    }
}
