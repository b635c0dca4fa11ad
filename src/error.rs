// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// The failure conditions of a [`WeightedOrdMap`][crate::WeightedOrdMap].
///
/// All of these are synchronous, caller-recoverable precondition errors: a
/// failed operation has mutated nothing. Internal invariant violations are
/// not represented here; they are bugs and surface as panics from
/// [`check_invariants`][crate::WeightedOrdMap::check_invariants].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// `get`, `remove` or `pop` was called with a key that is not in the map.
    #[error("key not found")]
    KeyNotFound,
    /// `insert` was called with a weight that is negative, NaN or infinite.
    /// Weights are defined only for finite values >= 0.
    #[error("invalid weight {0}: weights must be finite and non-negative")]
    InvalidWeight(f64),
    /// `sample` was called on a map with no elements, or one whose total
    /// weight is zero, so no key has a defined sampling probability.
    #[error("cannot sample from an empty or zero-weight map")]
    EmptyContainer,
}
