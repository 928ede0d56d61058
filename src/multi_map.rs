use crate::{
	arena::{Arena, Incoming, Record, Records, Staged},
	link::{link, unlink, Undo},
	order, Error,
};
use core::fmt;
use raw_btree::RawBTree;
use std::{borrow::Borrow, cmp::Ordering, iter::FusedIterator, mem};
use tracing::{debug, trace};

/// Multimap ordered both by value and by key.
///
/// Every `(key, value)` pair is stored once in an arena and referenced by
/// two B-tree indexes: the value index, ordered by value then key, gives
/// the extremal entries in `O(1)`; the key index, ordered by key then value,
/// serves key lookups and [`Self::change_value`]. Equal pairs share the same
/// record.
///
/// Keys and values only need [`PartialOrd`], and only `<` is ever called.
/// Two keys (or values) are considered equal when neither is less than the
/// other, so the `<` relation must be a strict weak order.
///
/// Every failing operation leaves the map unchanged, including when a
/// comparison panics while a new record is inserted in the indexes.
#[derive(Clone)]
pub struct DualIndexMultiMap<K, V> {
	records: Arena<K, V>,
	by_value: RawBTree<usize>,
	by_key: RawBTree<usize>,
	len: usize,
}

impl<K, V> Default for DualIndexMultiMap<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> DualIndexMultiMap<K, V> {
	pub fn new() -> Self {
		Self {
			records: Arena::new(),
			by_value: RawBTree::new(),
			by_key: RawBTree::new(),
			len: 0,
		}
	}

	/// Number of entries, counting duplicates.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn first_id(&self) -> Option<usize> {
		self.by_value.first().copied()
	}

	fn last_id(&self) -> Option<usize> {
		self.by_value.last().copied()
	}

	fn entry(&self, id: usize) -> (&K, &V) {
		let record = self.records.record(id);
		(&record.key, &record.value)
	}

	/// Entry with the smallest value, ties broken by the smallest key.
	pub fn min(&self) -> Option<(&K, &V)> {
		self.first_id().map(|id| self.entry(id))
	}

	/// Entry with the greatest value, ties broken by the greatest key.
	pub fn max(&self) -> Option<(&K, &V)> {
		self.last_id().map(|id| self.entry(id))
	}

	pub fn min_value(&self) -> Result<&V, Error> {
		self.min().map(|(_, v)| v).ok_or(Error::EmptyCollection)
	}

	pub fn max_value(&self) -> Result<&V, Error> {
		self.max().map(|(_, v)| v).ok_or(Error::EmptyCollection)
	}

	/// Key of the [minimum](Self::min) entry.
	pub fn min_key(&self) -> Result<&K, Error> {
		self.min().map(|(k, _)| k).ok_or(Error::EmptyCollection)
	}

	/// Key of the [maximum](Self::max) entry.
	pub fn max_key(&self) -> Result<&K, Error> {
		self.max().map(|(k, _)| k).ok_or(Error::EmptyCollection)
	}

	pub fn contains_key<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + PartialOrd,
	{
		self.get(key).is_some()
	}

	/// Returns one of the values associated to `key`.
	///
	/// Which one is unspecified when there are several, but it is the one
	/// [`Self::change_value`] would replace.
	pub fn get<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: ?Sized + PartialOrd,
	{
		self.by_key
			.get(order::key_query_cmp::<Q, _>(&self.records), key)
			.map(|&id| &self.records.record(id).value)
	}

	/// Exchanges the content of two maps, without comparing nor copying
	/// anything.
	pub fn swap(&mut self, other: &mut Self) {
		mem::swap(self, other)
	}

	pub fn clear(&mut self) {
		self.by_value = RawBTree::new();
		self.by_key = RawBTree::new();
		self.records.clear();
		self.len = 0
	}

	/// Iterates over the entries in value order.
	pub fn iter(&self) -> Iter<K, V> {
		Iter::new(&self.records, &self.by_value, self.len)
	}

	/// Iterates over the entries in key order.
	pub fn iter_by_key(&self) -> Iter<K, V> {
		Iter::new(&self.records, &self.by_key, self.len)
	}

	/// Keys, in value order.
	pub fn keys(&self) -> Keys<K, V> {
		Keys(self.iter())
	}

	/// Values, in increasing order.
	pub fn values(&self) -> Values<K, V> {
		Values(self.iter())
	}
}

impl<K: PartialOrd, V: PartialOrd> DualIndexMultiMap<K, V> {
	/// Adds the entry `(key, value)`.
	///
	/// If an equal pair is already present, its record is shared instead of
	/// allocating a new one.
	pub fn insert(&mut self, key: K, value: V) {
		self.insert_record(Record::new(key, value));
	}

	/// Adds one entry for `record`, and returns the handle of the record
	/// now holding it.
	fn insert_record(&mut self, record: Record<K, V>) -> usize {
		let id = match self
			.by_value
			.get(order::value_record_cmp(&self.records), &record)
			.copied()
		{
			Some(id) => {
				let shared = self.records.get_mut(id);
				shared.count += 1;
				trace!(id, count = shared.count, "shared record");
				id
			}
			None => {
				let id = self.records.next_id();
				let staged = Staged {
					arena: &self.records,
					id,
					record: &record,
				};
				link(&staged, &mut self.by_value, &mut self.by_key, id);

				let stored = self.records.insert(record);
				debug_assert_eq!(stored, id);
				trace!(id, "created record");
				id
			}
		};

		self.len += 1;
		id
	}

	/// Takes back one entry of the record `id`, without comparing anything.
	fn retract(&mut self, id: usize) {
		let record = self.records.get_mut(id);
		record.count -= 1;
		if record.count == 0 {
			unlink(&mut self.by_value, id);
			unlink(&mut self.by_key, id);
			self.records.remove(id);
		}

		self.len -= 1;
		trace!(id, "retracted entry");
	}

	/// Removes one entry referencing the record `id`.
	///
	/// Returns the record when this was the last entry referencing it.
	fn release(&mut self, id: usize) -> Option<Record<K, V>> {
		let record = self.records.get_mut(id);
		if record.count > 1 {
			record.count -= 1;
			self.len -= 1;
			return None;
		}

		let value_addr = self.by_value.address_of(order::value_cmp(&self.records), &id);
		let key_addr = self.by_key.address_of(order::key_cmp(&self.records), &id);

		match (value_addr, key_addr) {
			(Ok(value_addr), Ok(key_addr)) => unsafe {
				// SAFETY: neither index has been modified since we found the
				//         addresses.
				let removed = self.by_value.remove_at(value_addr);
				debug_assert!(removed.is_some());
				let removed = self.by_key.remove_at(key_addr);
				debug_assert!(removed.is_some());
			},
			_ => panic!("record {id} is missing from an index"),
		}

		self.len -= 1;
		trace!(id, "released record");
		Some(self.records.remove(id))
	}

	/// Removes the entry with the smallest value.
	///
	/// Does nothing if the map is empty.
	pub fn delete_min(&mut self) {
		if let Some(id) = self.first_id() {
			self.release(id);
		}
	}

	/// Removes the entry with the greatest value.
	///
	/// Does nothing if the map is empty.
	pub fn delete_max(&mut self) {
		if let Some(id) = self.last_id() {
			self.release(id);
		}
	}

	fn take(&mut self, id: usize) -> (K, V)
	where
		K: Clone,
		V: Clone,
	{
		match self.release(id) {
			Some(record) => (record.key, record.value),
			None => {
				let record = self.records.record(id);
				(record.key.clone(), record.value.clone())
			}
		}
	}

	/// Removes and returns the entry with the smallest value.
	///
	/// The pair is cloned only if another entry still shares its record.
	pub fn pop_min(&mut self) -> Option<(K, V)>
	where
		K: Clone,
		V: Clone,
	{
		self.first_id().map(|id| self.take(id))
	}

	/// Removes and returns the entry with the greatest value.
	///
	/// The pair is cloned only if another entry still shares its record.
	pub fn pop_max(&mut self) -> Option<(K, V)>
	where
		K: Clone,
		V: Clone,
	{
		self.last_id().map(|id| self.take(id))
	}

	/// Replaces one entry with key `key` by `(key, value)`.
	///
	/// When several entries share the key, which one is replaced is
	/// unspecified. The new entry is fully inserted before the old one is
	/// removed, and taken back if the removal unwinds.
	pub fn change_value(&mut self, key: K, value: V) -> Result<(), Error> {
		let old = self
			.by_key
			.get(order::key_query_cmp::<K, _>(&self.records), &key)
			.copied()
			.ok_or(Error::KeyNotFound)?;

		let record = Record::new(key, value);
		if order::cmp_by_value(self.records.record(old), &record).is_eq() {
			return Ok(());
		}

		trace!(old, "changing value");
		let new = self.insert_record(record);
		let mut undo = Undo::new(self, move |map: &mut Self| map.retract(new));
		undo.target().release(old);
		undo.disarm();
		Ok(())
	}

	/// Moves every entry of `other` into `self`, leaving `other` empty.
	///
	/// An entry of `other` equal to an entry already in `self` is absorbed by
	/// the present record rather than added a second time. Records of
	/// `other` are first folded into copies of `self`'s indexes; `self` and
	/// `other` are only modified once the fold succeeded.
	pub fn merge(&mut self, other: &mut Self) {
		if other.is_empty() {
			return;
		}

		let mut absorbed = 0;
		let mut handles = Vec::new();
		for &j in other.by_value.iter() {
			let incoming = other.records.record(j);
			match self
				.by_value
				.get(order::value_record_cmp(&self.records), incoming)
			{
				Some(_) => absorbed += incoming.count,
				None => handles.push(j),
			}
		}

		let mut by_value = self.by_value.clone();
		let mut by_key = self.by_key.clone();
		let base = self.records.end();
		let staged = Incoming {
			arena: &self.records,
			other: &other.records,
			handles: &handles,
		};
		for offset in 0..handles.len() {
			link(&staged, &mut by_value, &mut by_key, base + offset);
		}

		let mut moved = 0;
		for j in handles {
			let record = other.records.remove(j);
			moved += record.count;
			self.records.push(record);
		}

		mem::swap(&mut self.by_value, &mut by_value);
		mem::swap(&mut self.by_key, &mut by_key);
		self.len += moved;
		other.clear();

		debug!(moved, absorbed, len = self.len, "merged maps");
	}
}

impl<K: PartialOrd, V: PartialOrd> DualIndexMultiMap<K, V> {
	fn ordering(&self, other: &Self) -> Ordering {
		if self.lt(other) {
			Ordering::Less
		} else if other.lt(self) {
			Ordering::Greater
		} else {
			Ordering::Equal
		}
	}
}

impl<'a, K, V> IntoIterator for &'a DualIndexMultiMap<K, V> {
	type IntoIter = Iter<'a, K, V>;
	type Item = (&'a K, &'a V);

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Entries are compared pairwise in value order.
impl<K: PartialOrd, V: PartialOrd> PartialEq for DualIndexMultiMap<K, V> {
	fn eq(&self, other: &Self) -> bool {
		self.len == other.len
			&& self.iter().zip(other.iter()).all(|((ak, av), (bk, bv))| {
				order::compare(av, bv).is_eq() && order::compare(ak, bk).is_eq()
			})
	}
}

impl<K: Ord, V: Ord> Eq for DualIndexMultiMap<K, V> {}

/// Lexicographic order over the entries in key order.
impl<K: PartialOrd, V: PartialOrd> PartialOrd for DualIndexMultiMap<K, V> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.ordering(other))
	}

	fn lt(&self, other: &Self) -> bool {
		order::lexicographic_lt(self.iter_by_key(), other.iter_by_key())
	}

	fn le(&self, other: &Self) -> bool {
		!other.lt(self)
	}

	fn gt(&self, other: &Self) -> bool {
		other.lt(self)
	}

	fn ge(&self, other: &Self) -> bool {
		!self.lt(other)
	}
}

impl<K: Ord, V: Ord> Ord for DualIndexMultiMap<K, V> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.ordering(other)
	}
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DualIndexMultiMap<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

impl<K: PartialOrd, V: PartialOrd> Extend<(K, V)> for DualIndexMultiMap<K, V> {
	fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl<K: PartialOrd, V: PartialOrd> FromIterator<(K, V)> for DualIndexMultiMap<K, V> {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut result = Self::new();
		result.extend(iter);
		result
	}
}

/// Pending occurrences of a record at one end of an iteration.
type Run = Option<(usize, usize)>;

fn next_in_run(run: &mut Run) -> Option<usize> {
	match run {
		Some((id, remaining)) if *remaining > 0 => {
			*remaining -= 1;
			Some(*id)
		}
		_ => None,
	}
}

/// Iterator over the entries of a map, along one of its indexes.
///
/// Entries sharing a record are yielded once per occurrence.
pub struct Iter<'a, K, V> {
	records: &'a Arena<K, V>,
	inner: raw_btree::Iter<'a, usize>,
	front: Run,
	back: Run,
	len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
	fn new(records: &'a Arena<K, V>, index: &'a RawBTree<usize>, len: usize) -> Self {
		Self {
			records,
			inner: index.iter(),
			front: None,
			back: None,
			len,
		}
	}

	fn yield_entry(&mut self, id: usize) -> (&'a K, &'a V) {
		self.len -= 1;
		let record = self.records.record(id);
		(&record.key, &record.value)
	}
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
	type Item = (&'a K, &'a V);

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.len, Some(self.len))
	}

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(id) = next_in_run(&mut self.front) {
				return Some(self.yield_entry(id));
			}

			match self.inner.next() {
				Some(&id) => self.front = Some((id, self.records.record(id).count)),
				None => {
					let id = next_in_run(&mut self.back)?;
					return Some(self.yield_entry(id));
				}
			}
		}
	}
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(id) = next_in_run(&mut self.back) {
				return Some(self.yield_entry(id));
			}

			match self.inner.next_back() {
				Some(&id) => self.back = Some((id, self.records.record(id).count)),
				None => {
					let id = next_in_run(&mut self.front)?;
					return Some(self.yield_entry(id));
				}
			}
		}
	}
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
	type Item = &'a K;

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(k, _)| k)
	}
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		self.0.next_back().map(|(k, _)| k)
	}
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}

pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
	type Item = &'a V;

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(_, v)| v)
	}
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		self.0.next_back().map(|(_, v)| v)
	}
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

impl<'a, K, V> FusedIterator for Values<'a, K, V> {}
