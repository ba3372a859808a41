//! Locale-aware string comparison for titles.
//!
//! Titles are ordered with the CLDR root collation at its default strength.
//! A byte-wise `str::cmp` is not equivalent: it puts every uppercase letter
//! before every lowercase one and accented letters after `z`.

use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;

thread_local! {
    static ROOT_COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Compare two strings with root-locale collation.
///
/// Falls back to code point order only if the compiled collation data
/// cannot be loaded.
pub fn compare(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    })
}
