// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Proptest strategies.
//!
//! These are only available when using the `proptest` feature flag.

use ::proptest::collection::{vec, SizeRange};
use ::proptest::prelude::*;

use crate::WeightedOrdMap;

/// A strategy for a [`WeightedOrdMap`] with keys drawn from `key` and
/// weights uniform in `[0, 100)`.
///
/// The size range bounds the number of inserted pairs; duplicate keys
/// collapse into updates, so the resulting map can be smaller.
///
/// # Examples
///
/// ```rust,no_run
/// use proptest::prelude::*;
/// use weighted_ordmap::proptest::weighted_ord_map;
///
/// proptest! {
///     #[test]
///     fn stays_small(ref map in weighted_ord_map(any::<u32>(), 10..100)) {
///         assert!(map.len() < 100);
///     }
/// }
/// # fn main() {}
/// ```
pub fn weighted_ord_map<K>(
    key: K,
    size: impl Into<SizeRange>,
) -> impl Strategy<Value = WeightedOrdMap<K::Value>>
where
    K: Strategy + 'static,
    K::Value: Ord + Clone + std::fmt::Debug,
{
    vec((key, 0.0..100.0f64), size).prop_map(|pairs| pairs.into_iter().collect())
}
