// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An ordered map with weighted random sampling.
//!
//! A [`WeightedOrdMap`] associates totally ordered keys with non-negative
//! `f64` weights and can draw a random key with probability proportional to
//! its weight in O(log n), alongside the usual map operations (also
//! O(log n), with `len` O(1)).
//!
//! It is backed by a red-black tree whose leaves hold the elements and whose
//! internal nodes hold routing summaries: the minimum key, the total weight
//! and the leaf count of their subtree.

use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::iter::{FromIterator, FusedIterator};

use rand_core::RngCore;

use crate::error::Error;
use crate::nodes::rbtree::{IntoLeafIter, LeafIter, Tree};

/// Construct a map from a sequence of key/weight pairs.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate weighted_ordmap;
/// # use weighted_ordmap::WeightedOrdMap;
/// # fn main() {
/// let map = weighted_ordmap! {"a" => 1.0, "b" => 2.0};
/// assert_eq!(map.len(), 2);
/// # }
/// ```
#[macro_export]
macro_rules! weighted_ordmap {
    () => { $crate::weighted_map::WeightedOrdMap::new() };

    ( $( $key:expr => $weight:expr ),* $(,)? ) => {{
        let mut map = $crate::weighted_map::WeightedOrdMap::new();
        $(
            map.insert($key, $weight).expect("invalid weight");
        )*
        map
    }};
}

/// An ordered map from keys to non-negative weights, with O(log n) weighted
/// random sampling of keys.
///
/// Keys only need an [`Ord`][std::cmp::Ord] instance (plus `Clone`, since
/// internal nodes keep a copy of their subtree's minimum key for routing).
/// Iteration always yields keys in ascending order.
///
/// # Examples
///
/// ```
/// # use weighted_ordmap::WeightedOrdMap;
/// use rand_xoshiro::rand_core::SeedableRng;
/// use rand_xoshiro::Xoshiro256PlusPlus;
///
/// let mut map = WeightedOrdMap::new();
/// map.insert("heads", 1.0).unwrap();
/// map.insert("tails", 3.0).unwrap();
///
/// let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
/// // "tails" comes up three times as often as "heads".
/// let side = map.sample(&mut rng).unwrap();
/// assert!(side == &"heads" || side == &"tails");
/// ```
pub struct WeightedOrdMap<K> {
    tree: Tree<K>,
}

impl<K> WeightedOrdMap<K> {
    /// Construct an empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        WeightedOrdMap { tree: Tree::new() }
    }

    /// Test whether the map is empty.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of elements in the map.
    ///
    /// Time: O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate weighted_ordmap;
    /// assert_eq!(3, weighted_ordmap! {1 => 1.0, 2 => 2.0, 3 => 3.0}.len());
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Get the sum of all weights in the map.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.tree.total_weight()
    }

    /// Discard all elements from the map.
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K> WeightedOrdMap<K>
where
    K: Ord + Clone,
{
    /// Insert a key with the given weight, or update the weight of an
    /// existing key. Returns the previous weight when updating.
    ///
    /// The weight must be finite and non-negative; anything else is rejected
    /// with [`Error::InvalidWeight`] before any mutation. An update keeps the
    /// previously stored key.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # use weighted_ordmap::WeightedOrdMap;
    /// let mut map = WeightedOrdMap::new();
    /// assert_eq!(map.insert("cow", 222.3), Ok(None));
    /// assert_eq!(map.insert("cow", 31.5), Ok(Some(222.3)));
    /// assert!(map.insert("cow", -1.0).is_err());
    /// assert_eq!(map.get(&"cow"), Ok(31.5));
    /// ```
    pub fn insert(&mut self, key: K, weight: f64) -> Result<Option<f64>, Error> {
        // This also rejects NaN.
        if !(weight >= 0.0) || !weight.is_finite() {
            return Err(Error::InvalidWeight(weight));
        }
        Ok(self.tree.insert(key, weight))
    }

    /// Get the weight associated with a key.
    ///
    /// Fails with [`Error::KeyNotFound`] when the key is absent.
    ///
    /// Time: O(log n)
    pub fn get<BK>(&self, key: &BK) -> Result<f64, Error>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.tree.get(key).ok_or(Error::KeyNotFound)
    }

    /// Test whether the map contains a key.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate weighted_ordmap;
    /// let map = weighted_ordmap! {"dog" => 38.2};
    /// assert!(map.contains_key(&"dog"));
    /// assert!(!map.contains_key(&"cat"));
    /// ```
    #[must_use]
    pub fn contains_key<BK>(&self, key: &BK) -> bool
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.tree.get(key).is_some()
    }

    /// Remove a key from the map.
    ///
    /// Fails with [`Error::KeyNotFound`] when the key is absent, in which
    /// case the map is untouched.
    ///
    /// Time: O(log n)
    pub fn remove<BK>(&mut self, key: &BK) -> Result<(), Error>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.pop(key).map(|_| ())
    }

    /// Remove a key from the map, returning its weight.
    ///
    /// Fails with [`Error::KeyNotFound`] when the key is absent, in which
    /// case the map is untouched.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate weighted_ordmap;
    /// let mut map = weighted_ordmap! {"cat" => 201.7};
    /// assert_eq!(map.pop(&"cat"), Ok(201.7));
    /// assert!(map.is_empty());
    /// ```
    pub fn pop<BK>(&mut self, key: &BK) -> Result<f64, Error>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.tree.remove(key).ok_or(Error::KeyNotFound)
    }

    /// Draw a random key with probability `weight / total_weight`, using the
    /// given randomness source.
    ///
    /// Fails with [`Error::EmptyContainer`] when the map is empty or its
    /// total weight is zero, since no key has a defined sampling probability
    /// in that case. Elements with weight zero are never drawn.
    ///
    /// Time: O(log n)
    pub fn sample<R>(&self, rng: &mut R) -> Result<&K, Error>
    where
        R: RngCore + ?Sized,
    {
        self.tree.sample(rng).ok_or(Error::EmptyContainer)
    }

    /// Get the smallest key in the map.
    ///
    /// Time: O(1) (it is the root's routing summary)
    #[must_use]
    pub fn get_min(&self) -> Option<&K> {
        self.tree.min_key()
    }

    /// Get the largest key in the map.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_max(&self) -> Option<&K> {
        self.tree.max_key()
    }

    /// Create an iterator over the key/weight pairs, in ascending key order.
    ///
    /// The iterator is lazy; each call starts a fresh traversal. Advancing is
    /// O(log n) amortized, with an O(log n) traversal stack.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            it: self.tree.iter(),
        }
    }

    /// Create an iterator over the keys, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate weighted_ordmap;
    /// let map = weighted_ordmap! {3 => 1.0, 1 => 2.0, 2 => 0.5};
    /// let keys: Vec<i32> = map.keys().copied().collect();
    /// assert_eq!(keys, vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            it: self.tree.iter(),
        }
    }

    /// Draw the tree shape as ASCII art, one leaf per column: `o` is a red
    /// node, `*` a black one. Purely diagnostic; the exact format is not part
    /// of the crate's contract.
    #[must_use]
    pub fn debug_render(&self) -> String {
        self.tree.render()
    }

    /// Verify every structural invariant of the backing tree, panicking with
    /// a description of the first violation found.
    ///
    /// A violation is an implementation bug, not a recoverable condition;
    /// this is meant for tests and debugging sessions.
    pub fn check_invariants(&self) {
        self.tree.check();
    }
}

// Core traits

impl<K> Default for WeightedOrdMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Clone for WeightedOrdMap<K> {
    fn clone(&self) -> Self {
        WeightedOrdMap {
            tree: self.tree.clone(),
        }
    }
}

impl<K> PartialEq for WeightedOrdMap<K>
where
    K: Ord + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((k1, w1), (k2, w2))| k1 == k2 && w1 == w2)
    }
}

impl<K> Debug for WeightedOrdMap<K>
where
    K: Ord + Clone + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K> FromIterator<(K, f64)> for WeightedOrdMap<K>
where
    K: Ord + Clone,
{
    /// Build a map from key/weight pairs. Later duplicates update earlier
    /// ones.
    ///
    /// # Panics
    ///
    /// Panics if any weight is negative, NaN or infinite; use
    /// [`insert`][WeightedOrdMap::insert] to handle invalid weights
    /// gracefully.
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut map = Self::new();
        for (key, weight) in iter {
            if let Err(err) = map.insert(key, weight) {
                panic!("{}", err);
            }
        }
        map
    }
}

impl<K> Extend<(K, f64)> for WeightedOrdMap<K>
where
    K: Ord + Clone,
{
    /// See [`FromIterator`] for the panic behavior on invalid weights.
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        for (key, weight) in iter {
            if let Err(err) = self.insert(key, weight) {
                panic!("{}", err);
            }
        }
    }
}

// Iterators

/// An iterator over the key/weight pairs of a map, in ascending key order.
#[derive(Debug, Clone)]
pub struct Iter<'a, K> {
    it: LeafIter<'a, K>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K> ExactSizeIterator for Iter<'a, K> {}
impl<'a, K> FusedIterator for Iter<'a, K> {}

/// An iterator over the keys of a map, in ascending order.
#[derive(Debug, Clone)]
pub struct Keys<'a, K> {
    it: LeafIter<'a, K>,
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K> ExactSizeIterator for Keys<'a, K> {}
impl<'a, K> FusedIterator for Keys<'a, K> {}

/// A consuming iterator over the key/weight pairs of a map, in ascending key
/// order.
#[derive(Debug)]
pub struct ConsumingIter<K> {
    it: IntoLeafIter<K>,
}

impl<K: Clone> Iterator for ConsumingIter<K> {
    type Item = (K, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K: Clone> ExactSizeIterator for ConsumingIter<K> {}
impl<K: Clone> FusedIterator for ConsumingIter<K> {}

impl<'a, K> IntoIterator for &'a WeightedOrdMap<K>
where
    K: Ord + Clone,
{
    type Item = (&'a K, f64);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K> IntoIterator for WeightedOrdMap<K>
where
    K: Ord + Clone,
{
    type Item = (K, f64);
    type IntoIter = ConsumingIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        ConsumingIter {
            it: self.tree.into_leaves(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::proptest::*;
    use ::proptest::collection::vec;
    use ::proptest::prelude::any;
    use ::proptest::proptest;
    use pretty_assertions::assert_eq;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use std::collections::BTreeMap;

    assert_impl_all!(WeightedOrdMap<i32>: Send, Sync, Clone);
    assert_not_impl_any!(WeightedOrdMap<*const i32>: Send, Sync);
    assert_covariant!(WeightedOrdMap<T> in T);

    const LETTERS: &str = "bcdefghijklmnopqrstuvwxyz";

    fn letter_map() -> (WeightedOrdMap<char>, BTreeMap<char, f64>) {
        let reference: BTreeMap<char, f64> = LETTERS
            .chars()
            .zip((1..).map(f64::from))
            .collect();
        let map = reference.iter().map(|(&k, &w)| (k, w)).collect();
        (map, reference)
    }

    #[test]
    fn example_scenario() {
        let mut map = WeightedOrdMap::new();
        map.insert("dog", 38.2).unwrap();
        map.insert("cat", 201.7).unwrap();
        map.insert("cow", 222.3).unwrap();
        map.insert("ostrich", 0.0).unwrap();
        // Change the weight for cow.
        assert_eq!(map.insert("cow", 31.5), Ok(Some(222.3)));
        map.insert("unicorn", 0.01).unwrap();
        map.insert("wolf", 128.1).unwrap();
        map.insert("bear", 12.1).unwrap();
        map.insert("aardvark", 9.1).unwrap();
        map.check_invariants();

        assert_eq!(map.get(&"dog"), Ok(38.2));
        assert_eq!(map.pop(&"cat"), Ok(201.7));
        map.check_invariants();

        let keys: Vec<&str> = map.keys().copied().collect();
        assert_eq!(
            keys,
            vec!["aardvark", "bear", "cow", "dog", "ostrich", "unicorn", "wolf"]
        );
        assert_eq!(map.len(), 7);
        let expected_total = 9.1 + 12.1 + 31.5 + 38.2 + 0.0 + 0.01 + 128.1;
        assert!((map.total_weight() - expected_total).abs() < 1e-9);
    }

    #[test]
    fn empty_map_boundaries() {
        let map = WeightedOrdMap::<i32>::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.total_weight(), 0.0);
        assert_eq!(map.sample(&mut rng), Err(Error::EmptyContainer));
        assert_eq!(map.get(&1), Err(Error::KeyNotFound));
        assert_eq!(map.get_min(), None);
        assert_eq!(map.get_max(), None);
        assert_eq!(map.keys().next(), None);

        let mut map = map;
        assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
        assert_eq!(map.pop(&1), Err(Error::KeyNotFound));
        map.check_invariants();
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let mut map = weighted_ordmap! {"a" => 1.0};
        assert_eq!(map.insert("b", -1.0), Err(Error::InvalidWeight(-1.0)));
        assert!(matches!(
            map.insert("b", f64::NAN),
            Err(Error::InvalidWeight(_))
        ));
        assert!(matches!(
            map.insert("b", f64::INFINITY),
            Err(Error::InvalidWeight(_))
        ));
        // A rejected insert mutates nothing.
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&"b"));
        map.check_invariants();
    }

    #[test]
    fn zero_total_weight_cannot_be_sampled() {
        let mut map = weighted_ordmap! {"a" => 0.0, "b" => 0.0};
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(map.sample(&mut rng), Err(Error::EmptyContainer));

        map.insert("c", 1.0).unwrap();
        for _ in 0..100 {
            // Zero-weight keys are never drawn.
            assert_eq!(map.sample(&mut rng), Ok(&"c"));
        }
    }

    #[test]
    fn update_is_idempotent_on_shape() {
        let (mut map, _) = letter_map();
        let weight = map.get(&'m').unwrap();
        let before = map.debug_render();
        assert_eq!(map.insert('m', weight), Ok(Some(weight)));
        assert_eq!(map.debug_render(), before);
        assert_eq!(map.get(&'m'), Ok(weight));
        map.check_invariants();
    }

    #[test]
    fn insert_then_remove_round_trips() {
        let (mut map, _) = letter_map();
        let keys_before: Vec<char> = map.keys().copied().collect();
        let total_before = map.total_weight();

        assert!(!map.contains_key(&'a'));
        map.insert('a', 5.5).unwrap();
        map.check_invariants();
        assert_eq!(map.remove(&'a'), Ok(()));
        map.check_invariants();

        let keys_after: Vec<char> = map.keys().copied().collect();
        assert_eq!(keys_after, keys_before);
        assert!((map.total_weight() - total_before).abs() < 1e-9);
    }

    #[test]
    fn iteration_is_sorted_and_restartable() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut keys: Vec<u32> = (0..100).collect();
        keys.shuffle(&mut rng);
        let map: WeightedOrdMap<u32> = keys.iter().map(|&k| (k, 1.0)).collect();

        let first: Vec<u32> = map.keys().copied().collect();
        let second: Vec<u32> = map.keys().copied().collect();
        assert_eq!(first, (0..100).collect::<Vec<_>>());
        assert_eq!(first, second);
        assert_eq!(map.iter().len(), 100);

        let consumed: Vec<(u32, f64)> = map.clone().into_iter().collect();
        assert_eq!(consumed.len(), 100);
        assert!(consumed.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn min_and_max_keys() {
        let (map, _) = letter_map();
        assert_eq!(map.get_min(), Some(&'b'));
        assert_eq!(map.get_max(), Some(&'z'));
    }

    #[test]
    fn match_strings_with_string_slices() {
        let mut map: WeightedOrdMap<String> =
            vec![("foo".to_string(), 1.0), ("bar".to_string(), 2.0)]
                .into_iter()
                .collect();
        assert_eq!(map.get("bar"), Ok(2.0));
        map.remove("bar").unwrap();
        assert!(!map.contains_key("bar"));
        assert_eq!(map.pop("foo"), Ok(1.0));
        assert!(map.is_empty());
    }

    #[test]
    fn clones_and_macro_maps_compare_equal() {
        let map = weighted_ordmap! {"a" => 1.0, "b" => 2.0};
        let collected: WeightedOrdMap<&str> =
            vec![("b", 2.0), ("a", 1.0)].into_iter().collect();
        assert_eq!(map, collected);
        assert_eq!(map, map.clone());

        let mut other = map.clone();
        other.insert("b", 3.0).unwrap();
        assert_ne!(map, other);

        assert_eq!(
            format!("{:?}", map),
            "{\"a\": 1.0, \"b\": 2.0}"
        );
    }

    #[test]
    fn sampling_follows_the_weight_distribution() {
        let (map, reference) = letter_map();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let draws = 10_000;

        let mut tallies: BTreeMap<char, i64> = BTreeMap::new();
        for _ in 0..draws {
            *tallies.entry(*map.sample(&mut rng).unwrap()).or_insert(0) += 1;
        }
        // Every key has enough weight to show up in 10k draws.
        assert_eq!(tallies.len(), reference.len());

        let den: f64 = reference.values().sum();
        let mut deviation = 0;
        for (key, weight) in &reference {
            let expected = (draws as f64 * (weight / den)) as i64;
            deviation += (tallies[key] - expected).abs();
        }
        // Aggregate absolute deviation stays below 10% of the sample count.
        assert!(
            (deviation as f64) < draws as f64 * 0.10,
            "deviation {} over {} draws",
            deviation,
            draws
        );
    }

    #[test]
    fn soak_against_reference_map() {
        let letters: Vec<char> = LETTERS.chars().collect();
        let weight_of = |key: char| (key as u32 - 'a' as u32) as f64;
        let mut rng = SmallRng::seed_from_u64(42);
        let mut map = WeightedOrdMap::new();
        let mut reference = BTreeMap::new();
        for &key in &letters {
            map.insert(key, weight_of(key)).unwrap();
            reference.insert(key, weight_of(key));
        }

        let check = |map: &WeightedOrdMap<char>, reference: &BTreeMap<char, f64>| {
            map.check_invariants();
            let keys: Vec<char> = map.keys().copied().collect();
            let expected: Vec<char> = reference.keys().copied().collect();
            assert_eq!(keys, expected);
            for (key, weight) in reference {
                assert!((map.get(key).unwrap() - weight).abs() < 1e-9);
            }
        };

        for round in 0..3000 {
            let toggle = letters[rng.random_range(0..letters.len())];
            if reference.contains_key(&toggle) {
                let expected = reference.remove(&toggle).unwrap();
                assert!((map.pop(&toggle).unwrap() - expected).abs() < 1e-9);
            } else {
                reference.insert(toggle, weight_of(toggle));
                map.insert(toggle, weight_of(toggle)).unwrap();
            }
            check(&map, &reference);

            // Periodically drain the whole map in random order.
            if round % 1000 == 0 {
                let mut keys: Vec<char> = map.keys().copied().collect();
                keys.shuffle(&mut rng);
                for key in keys {
                    reference.remove(&key).unwrap();
                    map.pop(&key).unwrap();
                    check(&map, &reference);
                }
                assert!(map.is_empty());
            }
        }
    }

    proptest! {
        #[test]
        fn random_ops_match_reference(
            ops in vec((0u8..32, 0.0f64..100.0, any::<bool>()), 1..300)
        ) {
            let mut map = WeightedOrdMap::new();
            let mut reference: BTreeMap<u8, f64> = BTreeMap::new();
            for (key, weight, removal) in ops {
                if removal && reference.contains_key(&key) {
                    let expected = reference.remove(&key).unwrap();
                    let got = map.pop(&key).unwrap();
                    assert!((got - expected).abs() < 1e-9);
                } else {
                    reference.insert(key, weight);
                    map.insert(key, weight).unwrap();
                }
                map.check_invariants();
                let keys: Vec<u8> = map.keys().copied().collect();
                let expected_keys: Vec<u8> = reference.keys().copied().collect();
                assert_eq!(keys, expected_keys);
            }
            for (key, weight) in &reference {
                assert!((map.get(key).unwrap() - weight).abs() < 1e-9);
            }
        }

        #[test]
        fn strategy_builds_valid_maps(ref map in weighted_ord_map(any::<u32>(), 1..64)) {
            map.check_invariants();
            assert!(map.len() < 64);
            let keys: Vec<u32> = map.keys().copied().collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
