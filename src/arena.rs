//! Backing store of the pair records shared by both indexes.
use std::mem;

/// Immutable `(key, value)` pair, referenced once by each index.
///
/// `count` is the number of logical entries sharing the record.
#[derive(Clone, Debug)]
pub(crate) struct Record<K, V> {
	pub key: K,
	pub value: V,
	pub count: usize,
}

impl<K, V> Record<K, V> {
	pub fn new(key: K, value: V) -> Self {
		Self {
			key,
			value,
			count: 1,
		}
	}
}

/// Resolves index handles to records.
pub(crate) trait Records {
	type Key;
	type Value;

	fn record(&self, id: usize) -> &Record<Self::Key, Self::Value>;
}

#[derive(Clone)]
enum Slot<K, V> {
	Occupied(Record<K, V>),
	Vacant(Option<usize>),
}

/// Slot arena with a free list. Handles stay valid until their record is
/// removed.
#[derive(Clone)]
pub(crate) struct Arena<K, V> {
	slots: Vec<Slot<K, V>>,
	free: Option<usize>,
}

impl<K, V> Default for Arena<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> Arena<K, V> {
	pub fn new() -> Self {
		Self {
			slots: Vec::new(),
			free: None,
		}
	}

	/// Handle the next call to [`Self::insert`] will return.
	pub fn next_id(&self) -> usize {
		self.free.unwrap_or(self.slots.len())
	}

	/// First handle past every slot, used by [`Self::push`].
	pub fn end(&self) -> usize {
		self.slots.len()
	}

	pub fn insert(&mut self, record: Record<K, V>) -> usize {
		match self.free {
			Some(id) => {
				match mem::replace(&mut self.slots[id], Slot::Occupied(record)) {
					Slot::Vacant(next) => self.free = next,
					Slot::Occupied(_) => panic!("free list points to occupied slot {id}"),
				}
				id
			}
			None => self.push(record),
		}
	}

	/// Appends a record after every slot, ignoring the free list.
	pub fn push(&mut self, record: Record<K, V>) -> usize {
		let id = self.slots.len();
		self.slots.push(Slot::Occupied(record));
		id
	}

	pub fn get_mut(&mut self, id: usize) -> &mut Record<K, V> {
		match &mut self.slots[id] {
			Slot::Occupied(record) => record,
			Slot::Vacant(_) => panic!("dangling record handle {id}"),
		}
	}

	pub fn remove(&mut self, id: usize) -> Record<K, V> {
		match mem::replace(&mut self.slots[id], Slot::Vacant(self.free)) {
			Slot::Occupied(record) => {
				self.free = Some(id);
				record
			}
			Slot::Vacant(next) => {
				self.slots[id] = Slot::Vacant(next);
				panic!("dangling record handle {id}")
			}
		}
	}

	pub fn clear(&mut self) {
		self.slots.clear();
		self.free = None;
	}
}

impl<K, V> Records for Arena<K, V> {
	type Key = K;
	type Value = V;

	fn record(&self, id: usize) -> &Record<K, V> {
		match &self.slots[id] {
			Slot::Occupied(record) => record,
			Slot::Vacant(_) => panic!("dangling record handle {id}"),
		}
	}
}

/// Arena view with one record staged at [`Arena::next_id`], not yet stored.
pub(crate) struct Staged<'a, K, V> {
	pub arena: &'a Arena<K, V>,
	pub id: usize,
	pub record: &'a Record<K, V>,
}

impl<'a, K, V> Records for Staged<'a, K, V> {
	type Key = K;
	type Value = V;

	fn record(&self, id: usize) -> &Record<K, V> {
		if id == self.id {
			self.record
		} else {
			self.arena.record(id)
		}
	}
}

/// Arena view where the records of another arena are staged past
/// [`Arena::end`], in the order of `handles`.
pub(crate) struct Incoming<'a, K, V> {
	pub arena: &'a Arena<K, V>,
	pub other: &'a Arena<K, V>,
	pub handles: &'a [usize],
}

impl<'a, K, V> Records for Incoming<'a, K, V> {
	type Key = K;
	type Value = V;

	fn record(&self, id: usize) -> &Record<K, V> {
		match id.checked_sub(self.arena.end()) {
			Some(offset) => self.other.record(self.handles[offset]),
			None => self.arena.record(id),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn removed_slots_are_reused() {
		let mut arena = Arena::new();
		let a = arena.insert(Record::new("a", 1));
		let b = arena.insert(Record::new("b", 2));
		assert_eq!(arena.next_id(), 2);

		arena.remove(a);
		assert_eq!(arena.next_id(), a);
		assert_eq!(arena.insert(Record::new("c", 3)), a);
		assert_eq!(arena.record(b).key, "b");
		assert_eq!(arena.record(a).key, "c");
	}

	#[test]
	fn push_ignores_free_list() {
		let mut arena = Arena::new();
		let a = arena.insert(Record::new(0, 0));
		arena.insert(Record::new(1, 1));
		arena.remove(a);

		assert_eq!(arena.push(Record::new(2, 2)), 2);
		assert_eq!(arena.next_id(), a);
	}

	#[test]
	fn staged_views_resolve_pending_records() {
		let mut arena = Arena::new();
		arena.insert(Record::new(0, 'a'));

		let pending = Record::new(1, 'b');
		let staged = Staged {
			arena: &arena,
			id: arena.next_id(),
			record: &pending,
		};
		assert_eq!(staged.record(0).value, 'a');
		assert_eq!(staged.record(1).value, 'b');

		let mut other = Arena::new();
		other.insert(Record::new(7, 'x'));
		other.insert(Record::new(8, 'y'));
		let handles = [1, 0];
		let incoming = Incoming {
			arena: &arena,
			other: &other,
			handles: &handles,
		};
		assert_eq!(incoming.record(0).value, 'a');
		assert_eq!(incoming.record(1).value, 'y');
		assert_eq!(incoming.record(2).value, 'x');
	}

	#[test]
	#[should_panic]
	fn dangling_handles_panic() {
		let mut arena = Arena::new();
		let a = arena.insert(Record::new((), ()));
		arena.remove(a);
		arena.record(a);
	}
}
