//! Data model shared between the FluidFill gateway and consumers of its JSON API.
//!
//! Every type here is a plain serde structure: the JSON shapes are a boundary
//! concern, the gateway works with these typed values internally.

pub mod model;
pub mod requests;
