//! Asset resolution boundary.
//!
//! Catalog entries carry opaque image refs; a resolver maps them to whatever
//! location the connected UI can display. The round core never looks inside.

pub trait AssetResolver: Send + Sync {
    fn resolve(&self, image_ref: &str) -> String;
}

/// Passes refs through untouched; clients resolve their own assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAssets;

impl AssetResolver for PassthroughAssets {
    fn resolve(&self, image_ref: &str) -> String {
        image_ref.to_string()
    }
}

/// Prefixes every ref with a base location (directory or URL).
#[derive(Debug, Clone)]
pub struct BasePathAssets {
    base: String,
}

impl BasePathAssets {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl AssetResolver for BasePathAssets {
    fn resolve(&self, image_ref: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), image_ref)
    }
}
