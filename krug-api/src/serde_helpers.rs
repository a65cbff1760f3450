//! Serde helpers for the Go-flavoured JSON the compiler service speaks.

use serde::{Deserialize, Deserializer};

/// Deserialize a value that the peer may send as `null`, falling back to its default.
///
/// Pair with `#[serde(default)]` so a missing key behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Byte strings encoded as standard, padded base64.
///
/// This is how `encoding/json` renders a `[]byte`, and a `null` there means an
/// empty slice.
pub mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
