//! Assets module - investable asset identities.

mod assets_model;

#[cfg(test)]
mod assets_model_tests;

pub use assets_model::{Asset, NewAsset};
