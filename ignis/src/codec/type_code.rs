use super::DecodeError;

macro_rules! type_codes {
    ($($(#[$doc:meta])* $name:ident = $code:literal,)*) => {
        /// One byte type discriminator preceding every tagged value.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum TypeCode {
            $($(#[$doc])* $name = $code,)*
        }

        impl TypeCode {
            /// Human readable name of the type.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }

        impl TryFrom<u8> for TypeCode {
            type Error = DecodeError;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$name),)*
                    _ => Err(DecodeError::UnknownType(code)),
                }
            }
        }
    };
}

type_codes! {
    /// `i8`
    Byte = 1,
    /// `i16`
    Short = 2,
    /// `i32`
    Int = 3,
    /// `i64`
    Long = 4,
    /// `f32`
    Float = 5,
    /// `f64`
    Double = 6,
    /// utf16 code unit
    Char = 7,
    Bool = 8,
    String = 9,
    Uuid = 10,
    /// milliseconds since unix epoch
    Date = 11,
    ByteArray = 12,
    ShortArray = 13,
    IntArray = 14,
    LongArray = 15,
    FloatArray = 16,
    DoubleArray = 17,
    CharArray = 18,
    BoolArray = 19,
    StringArray = 20,
    UuidArray = 21,
    DateArray = 22,
    /// milliseconds since unix epoch plus nanosecond remainder
    Timestamp = 33,
    TimestampArray = 34,
    /// milliseconds since midnight
    Time = 36,
    TimeArray = 37,
    Null = 101,
    /// named field record
    Complex = 103,
}

impl TypeCode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}
