use crate::statics;
use serde::{Deserialize, Serialize};

/// Semantic type of a stored property, identified on the wire by a small integer code.
/// Code 0 is the "undefined" sentinel used when the user picks no type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PropertyType {
    #[default]
    Undefined,
    String,
    Binary,
    Long,
    Double,
    Date,
    Boolean,
    Name,
    Path,
    Reference,
    WeakReference,
    Uri,
    Decimal,
}

impl PropertyType {
    /// Catalogue order defines the type codes.
    pub const ALL: [PropertyType; 13] = [
        PropertyType::Undefined,
        PropertyType::String,
        PropertyType::Binary,
        PropertyType::Long,
        PropertyType::Double,
        PropertyType::Date,
        PropertyType::Boolean,
        PropertyType::Name,
        PropertyType::Path,
        PropertyType::Reference,
        PropertyType::WeakReference,
        PropertyType::Uri,
        PropertyType::Decimal,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Undefined => statics::TYPE_UNDEFINED,
            PropertyType::String => statics::TYPE_STRING,
            PropertyType::Binary => statics::TYPE_BINARY,
            PropertyType::Long => statics::TYPE_LONG,
            PropertyType::Double => statics::TYPE_DOUBLE,
            PropertyType::Date => statics::TYPE_DATE,
            PropertyType::Boolean => statics::TYPE_BOOLEAN,
            PropertyType::Name => statics::TYPE_NAME,
            PropertyType::Path => statics::TYPE_PATH,
            PropertyType::Reference => statics::TYPE_REFERENCE,
            PropertyType::WeakReference => statics::TYPE_WEAK_REFERENCE,
            PropertyType::Uri => statics::TYPE_URI,
            PropertyType::Decimal => statics::TYPE_DECIMAL,
        }
    }
}

impl From<PropertyType> for u8 {
    fn from(ty: PropertyType) -> u8 {
        ty.code()
    }
}

impl TryFrom<u8> for PropertyType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        PropertyType::from_code(code).ok_or_else(|| format!("unknown property type code {code}"))
    }
}

/// Type name for a raw type code. Codes outside the catalogue are not validated
/// by the repository, so they render as the "undefined" sentinel.
pub fn name_of(code: u8) -> &'static str {
    PropertyType::from_code(code).unwrap_or_default().name()
}
