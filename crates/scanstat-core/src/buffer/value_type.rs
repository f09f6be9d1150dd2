use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Element encoding declared by a sub-channel's format descriptor.
///
/// The set is closed: every variant fixes both the element width and the
/// decoding rule. Serialized with the vendor format names (`BYTE`, `WORD`,
/// `DWORD`, `INT`, `FLOAT`, `RGB2`).
///
/// # Examples
/// ```
/// use scanstat_core::ValueType;
///
/// let value_type: ValueType = "RGB2".parse().unwrap();
/// assert_eq!(value_type, ValueType::PackedRgb32);
/// assert_eq!(value_type.element_size(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// 8-bit unsigned integer.
    #[serde(rename = "BYTE")]
    Byte8,
    /// 16-bit unsigned integer.
    #[serde(rename = "WORD")]
    Word16,
    /// 32-bit unsigned integer.
    #[serde(rename = "DWORD")]
    DWord32,
    /// 32-bit signed integer.
    #[serde(rename = "INT")]
    Int32,
    /// 32-bit IEEE-754 float.
    #[serde(rename = "FLOAT")]
    Float32,
    /// 32-bit word holding `[B G R pad]`, most significant byte first.
    #[serde(rename = "RGB2")]
    PackedRgb32,
}

impl ValueType {
    /// Size in bytes of a single sample.
    pub fn element_size(self) -> usize {
        match self {
            ValueType::Byte8 => 1,
            ValueType::Word16 => 2,
            ValueType::DWord32
            | ValueType::Int32
            | ValueType::Float32
            | ValueType::PackedRgb32 => 4,
        }
    }

    /// Vendor format name of the value type.
    pub fn format_name(self) -> &'static str {
        match self {
            ValueType::Byte8 => "BYTE",
            ValueType::Word16 => "WORD",
            ValueType::DWord32 => "DWORD",
            ValueType::Int32 => "INT",
            ValueType::Float32 => "FLOAT",
            ValueType::PackedRgb32 => "RGB2",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_name())
    }
}

/// Error returned when a format name is outside the closed value-type set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValueType(pub String);

impl fmt::Display for UnknownValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value type '{}'", self.0)
    }
}

impl std::error::Error for UnknownValueType {}

impl FromStr for ValueType {
    type Err = UnknownValueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BYTE" => Ok(ValueType::Byte8),
            "WORD" => Ok(ValueType::Word16),
            "DWORD" => Ok(ValueType::DWord32),
            "INT" => Ok(ValueType::Int32),
            "FLOAT" => Ok(ValueType::Float32),
            "RGB2" => Ok(ValueType::PackedRgb32),
            other => Err(UnknownValueType(other.to_string())),
        }
    }
}
