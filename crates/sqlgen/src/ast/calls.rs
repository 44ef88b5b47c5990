//! Descriptors for host-library calls the upstream lowering embeds in the
//! tree. The set is closed: every call the translators know how to handle
//! (or know how to refuse) is a variant here, keyed by declaring domain,
//! operation, and argument shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HostCall {
    DateTime(DateTimeCall),
    Str(StringCall),
    Math(MathCall),
    Convert(ConvertCall),
    Guid(GuidCall),
    Bytes(BytesCall),
}

impl HostCall {
    /// A short diagnostic name for error messages.
    pub fn describe(&self) -> String {
        match self {
            HostCall::DateTime(c) => format!("DateTime.{c:?}"),
            HostCall::Str(c) => format!("String.{c:?}"),
            HostCall::Math(c) => format!("Math.{c:?}"),
            HostCall::Convert(c) => format!("Convert.{c:?}"),
            HostCall::Guid(c) => format!("Guid.{c:?}"),
            HostCall::Bytes(c) => format!("Bytes.{c:?}"),
        }
    }
}

/// Calendar units for date arithmetic and extraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DatePart {
    Year,
    Quarter,
    Month,
    DayOfYear,
    Day,
    Weekday,
    Week,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl DatePart {
    /// The engine's date-part code string, or `None` for units the engine
    /// cannot represent.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DatePart::Year => Some("yyyy"),
            DatePart::Quarter => Some("q"),
            DatePart::Month => Some("m"),
            DatePart::DayOfYear => Some("y"),
            DatePart::Day => Some("d"),
            DatePart::Weekday => Some("w"),
            DatePart::Week => Some("ww"),
            DatePart::Hour => Some("h"),
            DatePart::Minute => Some("n"),
            DatePart::Second => Some("s"),
            DatePart::Millisecond => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DateTimeCall {
    /// `AddYears`, `AddDays`, ... — args: [base, amount].
    Add(DatePart),
    /// `Year`, `Month`, ... — args: [base].
    Part(DatePart),
    Now,
    Today,
}

/// Host-side string comparison modes. Only ordinal comparison matches the
/// engine's text semantics; the culture-sensitive modes have no translation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StringComparison {
    Ordinal,
    OrdinalIgnoreCase,
    CurrentCulture,
    CurrentCultureIgnoreCase,
    InvariantCulture,
    InvariantCultureIgnoreCase,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StringCall {
    /// args: [haystack, pattern].
    Contains { comparison: Option<StringComparison> },
    /// args: [haystack, prefix].
    StartsWith { comparison: Option<StringComparison> },
    /// args: [haystack, suffix].
    EndsWith { comparison: Option<StringComparison> },
    /// args: [haystack, needle].
    IndexOf { comparison: Option<StringComparison> },
    /// args: [text, start] or [text, start, length].
    Substring { with_length: bool },
    ToLower,
    ToUpper,
    Trim,
    TrimStart,
    TrimEnd,
    /// Trim overloads taking an explicit character set; the engine's trim
    /// built-ins are whitespace-only.
    TrimChars,
    TrimStartChars,
    TrimEndChars,
    /// args: [text, find, replacement].
    Replace,
    Length,
    /// args: any number of operands to concatenate.
    Concat,
    IsNullOrEmpty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MathCall {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceiling,
    Cos,
    Exp,
    Floor,
    Log,
    /// args: [value, base].
    LogBase,
    Log10,
    /// args: [value, exponent].
    Pow,
    Round,
    /// args: [value, digits].
    RoundDigits,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Truncate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConvertCall {
    ToBoolean,
    ToByte,
    ToInt16,
    ToInt32,
    ToInt64,
    ToSingle,
    ToDouble,
    ToDecimal,
    ToDateTime,
    ToText,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GuidCall {
    NewGuid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BytesCall {
    /// args: [bytes, index].
    ElementAt,
    Length,
}
