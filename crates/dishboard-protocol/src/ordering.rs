//! Display ordering of dishes by name.
//!
//! Names are collated in levels, the way a root-locale collator does:
//! base letters first (accents and case ignored), then accents, then case
//! with lowercase first. "Éclair" therefore sorts between "Crème Brûlée" and
//! "Fondue" rather than after every ASCII name. The raw text and then the
//! identifier break any remaining tie, which keeps the order total.

use crate::Dish;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Compare two dishes for display order.
pub fn compare_by_name(a: &Dish, b: &Dish) -> Ordering {
    compare_names(&a.dish_name, &b.dish_name).then_with(|| a.dish_id.cmp(&b.dish_id))
}

/// Collate two names: base letters, then accents, then case, then raw text.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| case_pattern(a).cmp(case_pattern(b)))
        .then_with(|| a.cmp(b))
}

/// Sort dishes in place by display order.
pub fn sort_by_name(dishes: &mut [Dish]) {
    dishes.sort_by(compare_by_name);
}

/// Decomposed, lowercased characters; accents survive as combining marks.
fn folded(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    folded(name).filter(|c| !is_combining_mark(*c))
}

/// Uppercase flag per base letter; `false` sorts first.
fn case_pattern(name: &str) -> impl Iterator<Item = bool> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
}
