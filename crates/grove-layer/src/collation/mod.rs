//! Locale-aware string comparison.
//!
//! [`ComparatorCache`] resolves scheme names to shared [`CollationRecipe`]s
//! and hands each caller its own [`Collator`].

mod cache;
mod collator;
mod scheme;

pub use cache::ComparatorCache;
pub use collator::{CollationRecipe, Collator};
pub use scheme::{CollationScheme, Language, Strength};
