// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::WeightedOrdMap;
use ::quickcheck::{Arbitrary, Gen};
use std::iter::FromIterator;

impl<K: Ord + Clone + Arbitrary + Sync> Arbitrary for WeightedOrdMap<K> {
    fn arbitrary(g: &mut Gen) -> Self {
        WeightedOrdMap::from_iter(Vec::<(K, f64)>::arbitrary(g).into_iter().map(
            |(key, weight)| {
                let weight = if weight.is_finite() { weight.abs() } else { 0.0 };
                (key, weight)
            },
        ))
    }
}
