use crate::{
    filter::contract::SoftFilter,
    filters::vertical3x4,
    foundation::format::SimdMask,
};

/// Built-in filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Vertical letterbox padding to a 16:9 frame height.
    Vertical3x4,
}

impl FilterKind {
    /// Every built-in filter, in listing order.
    pub const ALL: [FilterKind; 1] = [FilterKind::Vertical3x4];

    /// Human readable name.
    pub fn ident(self) -> &'static str {
        self.implementation(SimdMask::default()).descriptor().ident
    }

    /// Short machine identifier.
    pub fn short_ident(self) -> &'static str {
        self.implementation(SimdMask::default())
            .descriptor()
            .short_ident
    }

    /// Look up a filter by short identifier, ignoring ASCII case and surrounding whitespace.
    pub fn from_short_ident(s: &str) -> Option<FilterKind> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.short_ident().eq_ignore_ascii_case(s))
    }

    /// Implementation for the given CPU capabilities.
    pub fn implementation(self, simd: SimdMask) -> &'static dyn SoftFilter {
        match self {
            Self::Vertical3x4 => vertical3x4::get_implementation(simd),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/registry.rs"]
mod tests;
