// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An ordered map with O(log n) weighted random sampling.
//!
//! [`WeightedOrdMap`] maps totally ordered keys to non-negative `f64`
//! weights, and its [`sample`][WeightedOrdMap::sample] operation draws a
//! random key with probability proportional to its weight. Insertion,
//! update, lookup, deletion and sampling are all O(log n) worst case;
//! [`len`][WeightedOrdMap::len] and
//! [`total_weight`][WeightedOrdMap::total_weight] are O(1). Iteration
//! yields keys in ascending order.
//!
//! The backing structure is a red-black tree whose leaves hold the elements
//! and whose internal nodes hold routing summaries over their subtree: the
//! minimum key, the total weight and the leaf count. Sampling is a single
//! randomized descent that at each internal node goes left with probability
//! `left.weight / weight`.
//!
//! Randomness is always supplied by the caller as a
//! [`rand_core::RngCore`], so sampling is deterministic under a seeded
//! generator and this crate never touches global state.
//!
//! # Examples
//!
//! ```
//! # #[macro_use] extern crate weighted_ordmap;
//! use rand_xoshiro::rand_core::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! # fn main() {
//! let mut zoo = weighted_ordmap! {
//!     "dog" => 38.2,
//!     "cat" => 201.7,
//!     "cow" => 222.3,
//! };
//! zoo.insert("wolf", 128.1).unwrap();
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
//! let lucky = zoo.sample(&mut rng).unwrap();
//! assert!(zoo.contains_key(lucky));
//!
//! let keys: Vec<&str> = zoo.keys().copied().collect();
//! assert_eq!(keys, vec!["cat", "cow", "dog", "wolf"]);
//! # }
//! ```
//!
//! The map is single-threaded: share it across threads behind external
//! synchronization if you must, like any `&mut`-mutated structure.

#[macro_use]
mod util;

mod error;
mod nodes;
pub mod weighted_map;

pub use crate::error::Error;
pub use crate::weighted_map::WeightedOrdMap;

// Proptest strategies, for property tests here and downstream.
#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

#[cfg(feature = "quickcheck")]
mod quickcheck;
