//! Conversions between store byte strings and typed values.
//!
//! Writes go through [`Encode`]; reads go through a caller-supplied cast
//! function applied to the UTF-8 text of the stored bytes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Error, Result};
use std::fmt::Display;

/// A value that can be written to the store as a byte string.
///
/// Numbers are written as their decimal text so that the store's own
/// arithmetic (`INCR`) and ordering keep working on them.
pub trait Encode {
    fn encode(&self) -> Vec<u8>;
}

impl Encode for str {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Encode for String {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Encode for [u8] {
    fn encode(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Vec<u8> {
        self.clone()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Vec<u8> {
        (**self).encode()
    }
}

macro_rules! encode_as_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self) -> Vec<u8> {
                    self.to_string().into_bytes()
                }
            }
        )*
    };
}

encode_as_text!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool);

/// Ready-made cast functions.
pub mod cast {
    use std::convert::Infallible;
    use std::num::ParseIntError;
    use std::str::FromStr;

    pub fn int(raw: &str) -> Result<i64, ParseIntError> {
        raw.parse()
    }

    pub fn text(raw: &str) -> Result<String, Infallible> {
        Ok(raw.to_string())
    }

    pub fn parse<T: FromStr>(raw: &str) -> Result<T, T::Err> {
        raw.parse()
    }
}

/// Decode one stored value with `cast`.
pub fn decode_one<T, F, E>(key: &str, raw: &[u8], cast: &F) -> Result<T>
where
    F: Fn(&str) -> std::result::Result<T, E>,
    E: Display,
{
    let text = std::str::from_utf8(raw).map_err(|e| Error::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    cast(text).map_err(|e| Error::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a sequence of stored values, keeping the store's order.
pub fn decode_many<T, F, E>(key: &str, raw: Vec<Vec<u8>>, cast: &F) -> Result<Vec<T>>
where
    F: Fn(&str) -> std::result::Result<T, E>,
    E: Display,
{
    raw.iter().map(|item| decode_one(key, item, cast)).collect()
}

/// Self-describing binary encoding used for opaque objects.
pub fn serialize_object<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| Error::Serialization(e.to_string()))
}

pub fn deserialize_object<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    rmp_serde::from_slice(data).map_err(|e| Error::Deserialization(e.to_string()))
}
