//! Serialization of extracted metadata.

pub mod csv;
