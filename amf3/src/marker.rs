//! Every AMF3 value starts with a marker byte naming its type. The format defines thirteen of them;
//! this crate implements the subset needed for dynamic data: `undefined`, `null`, the booleans,
//! `integer`, `double`, `string`, `array` and `object`. Any other marker is rejected on decode.

use std::convert::TryFrom;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Undefined = 0x00,
    Null = 0x01,
    False = 0x02,
    True = 0x03,
    Integer = 0x04,
    Double = 0x05,
    String = 0x06,
    XmlDoc = 0x07,
    Date = 0x08,
    Array = 0x09,
    Object = 0x0a,
    Xml = 0x0b,
    ByteArray = 0x0c,
}

/// U29 object header for an inline, anonymous, dynamic object without sealed members: bit 0 marks
/// the object as inline, bit 1 marks its traits as inline, bit 3 flags it as dynamic and the
/// remaining bits carry a sealed member count of zero. It is the only object header we produce
/// or accept.
pub const DYNAMIC_TRAITS: u32 = 0x0b;

impl Marker {

    /// Returns the mnemonic of the marker. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            Marker::Undefined => "undefined",
            Marker::Null      => "null",
            Marker::False     => "false",
            Marker::True      => "true",
            Marker::Integer   => "integer",
            Marker::Double    => "double",
            Marker::String    => "string",
            Marker::XmlDoc    => "xml-document",
            Marker::Date      => "date",
            Marker::Array     => "array",
            Marker::Object    => "object",
            Marker::Xml       => "xml",
            Marker::ByteArray => "byte-array",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(*self, Marker::XmlDoc | Marker::Date | Marker::Xml | Marker::ByteArray)
    }

}

impl TryFrom<u8> for Marker {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0x00 => Ok(Marker::Undefined),
            0x01 => Ok(Marker::Null),
            0x02 => Ok(Marker::False),
            0x03 => Ok(Marker::True),
            0x04 => Ok(Marker::Integer),
            0x05 => Ok(Marker::Double),
            0x06 => Ok(Marker::String),
            0x07 => Ok(Marker::XmlDoc),
            0x08 => Ok(Marker::Date),
            0x09 => Ok(Marker::Array),
            0x0a => Ok(Marker::Object),
            0x0b => Ok(Marker::Xml),
            0x0c => Ok(Marker::ByteArray),
            x => Err(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Marker;
    use std::convert::TryFrom;

    #[test]
    fn byte_values() {
        for b in 0..=0x0cu8 {
            assert_eq!(Marker::try_from(b).unwrap() as u8, b);
        }
        assert_eq!(Marker::try_from(0x0d), Err(0x0d));
        assert_eq!(Marker::try_from(0xff), Err(0xff));
    }

    #[test]
    fn supported_subset() {
        let supported = (0..=0x0cu8)
            .filter_map(|b| Marker::try_from(b).ok())
            .filter(Marker::is_supported)
            .map(|m| m.name())
            .collect::<Vec<_>>();
        assert_eq!(supported, ["undefined", "null", "false", "true", "integer", "double", "string", "array", "object"]);
    }
}
