//! Serde support, so [`Compression`] can live in configuration files as its
//! short name (`"deflate"`, `"stored"`, ...).

use crate::Compression;
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Formatter, Result as FmtResult};

impl Serialize for Compression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct CompressionVisitor;

impl Visitor<'_> for CompressionVisitor {
    type Value = Compression;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("a compression method name such as \"deflate\" or \"stored\"")
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(|e: crate::error::Error| E::custom(&*e))
    }
}

impl<'de> Deserialize<'de> for Compression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(CompressionVisitor)
    }
}
