//! Commit-or-rollback insertion across the two indexes.
use crate::{arena::Records, order};
use raw_btree::RawBTree;
use std::cmp::Ordering;

/// Runs its closure on `target` when dropped, unless disarmed first.
pub(crate) struct Undo<'a, T: ?Sized, F: FnOnce(&mut T)> {
	target: &'a mut T,
	f: Option<F>,
}

impl<'a, T: ?Sized, F: FnOnce(&mut T)> Undo<'a, T, F> {
	pub fn new(target: &'a mut T, f: F) -> Self {
		Self { target, f: Some(f) }
	}

	pub fn target(&mut self) -> &mut T {
		self.target
	}

	pub fn disarm(mut self) {
		self.f = None;
	}
}

impl<T: ?Sized, F: FnOnce(&mut T)> Drop for Undo<'_, T, F> {
	fn drop(&mut self) {
		if let Some(f) = self.f.take() {
			f(&mut *self.target)
		}
	}
}

/// Inserts the handle `id` in the value index, then in the key index.
///
/// If the key index insertion unwinds, `id` is taken out of the value index
/// again before the panic resumes, so either both indexes hold `id` or
/// neither does. A failing value index insertion leaves it untouched, since
/// every comparison happens before the tree is modified.
///
/// `id` must resolve through `records` and must not be in either index.
pub(crate) fn link<R>(
	records: &R,
	by_value: &mut RawBTree<usize>,
	by_key: &mut RawBTree<usize>,
	id: usize,
) where
	R: ?Sized + Records,
	R::Key: PartialOrd,
	R::Value: PartialOrd,
{
	by_value.insert(order::value_cmp(records), id);
	let undo = Undo::new(by_value, move |index| unlink(index, id));
	by_key.insert(order::key_cmp(records), id);
	undo.disarm()
}

/// Rebuilds `index` without the handle `id`.
///
/// No record is compared: handles are re-inserted in their current order,
/// each one after all those already present. Locating `id` by comparison
/// could unwind a second time, leaving `id` behind.
pub(crate) fn unlink(index: &mut RawBTree<usize>, id: usize) {
	let mut rebuilt = RawBTree::new();
	for &i in index.iter() {
		if i != id {
			rebuilt.insert(|_, _| Ordering::Less, i);
		}
	}

	debug_assert_eq!(rebuilt.len() + 1, index.len());
	*index = rebuilt
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		arena::{Arena, Record},
		order::value_cmp,
	};
	use std::{
		cell::Cell,
		cmp::Ordering,
		panic::{catch_unwind, AssertUnwindSafe},
	};

	thread_local! {
		static ARMED: Cell<bool> = const { Cell::new(false) };
	}

	#[derive(Debug, PartialEq)]
	struct Fragile(u32);

	impl PartialOrd for Fragile {
		fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
			if ARMED.get() {
				panic!("induced comparison failure")
			}
			self.0.partial_cmp(&other.0)
		}
	}

	#[test]
	fn links_in_both_indexes() {
		let mut arena = Arena::new();
		let mut by_value = RawBTree::new();
		let mut by_key = RawBTree::new();

		for (k, v) in [(3, 'a'), (1, 'c'), (2, 'b')] {
			let id = arena.insert(Record::new(k, v));
			link(&arena, &mut by_value, &mut by_key, id);
		}

		let values: Vec<_> = by_value.iter().map(|&i| arena.record(i).value).collect();
		let keys: Vec<_> = by_key.iter().map(|&i| arena.record(i).key).collect();
		assert_eq!(values, ['a', 'b', 'c']);
		assert_eq!(keys, [1, 2, 3]);
	}

	#[test]
	fn unwinding_key_insertion_rolls_back() {
		let mut arena = Arena::new();
		let mut by_value = RawBTree::new();
		let mut by_key = RawBTree::new();

		let id = arena.insert(Record::new(Fragile(1), 10));
		link(&arena, &mut by_value, &mut by_key, id);
		let id = arena.insert(Record::new(Fragile(2), 20));

		// Distinct values: only the key index compares keys.
		let result = catch_unwind(AssertUnwindSafe(|| {
			ARMED.set(true);
			link(&arena, &mut by_value, &mut by_key, id);
		}));
		ARMED.set(false);

		assert!(result.is_err());
		assert_eq!(by_value.iter().count(), 1);
		assert_eq!(by_key.iter().count(), 1);
	}

	#[test]
	fn unlink_keeps_the_order_of_other_handles() {
		let mut arena = Arena::new();
		let mut by_value = RawBTree::new();
		let mut by_key = RawBTree::new();

		let ids: Vec<_> = [(5, 'e'), (1, 'a'), (3, 'c'), (2, 'b'), (4, 'd')]
			.into_iter()
			.map(|(k, v)| {
				let id = arena.insert(Record::new(k, v));
				link(&arena, &mut by_value, &mut by_key, id);
				id
			})
			.collect();

		unlink(&mut by_value, ids[2]);

		let values: Vec<_> = by_value.iter().map(|&i| arena.record(i).value).collect();
		assert_eq!(values, ['a', 'b', 'd', 'e']);
		assert!(by_value.get(value_cmp(&arena), &ids[4]).is_some());
		assert!(by_value.get(value_cmp(&arena), &ids[2]).is_none());
	}
}
