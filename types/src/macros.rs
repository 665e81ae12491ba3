/// Implements the common constructors, hex parsing and formatting for a
/// public fixed-size byte newtype.
macro_rules! fixed_bytes {
    ($name:ident, $len:expr) => {
        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from a byte slice of exactly the right length.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, $crate::ParseError> {
                let arr: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| $crate::ParseError::WrongLength {
                            expected: $len,
                            actual: bytes.len(),
                        })?;
                Ok(Self(arr))
            }

            pub fn from_hex(s: &str) -> Result<Self, $crate::ParseError> {
                let bytes =
                    hex::decode(s).map_err(|e| $crate::ParseError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}\u{2026})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }
    };
}

pub(crate) use fixed_bytes;
