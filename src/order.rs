//! Orderings of the two indexes.
//!
//! Only `<` is ever called on keys and values. Two items are equivalent
//! when neither is less than the other.
use crate::arena::{Record, Records};
use std::{borrow::Borrow, cmp::Ordering};

/// Derives an [`Ordering`] from the strict `<` relation.
pub(crate) fn compare<T>(a: &T, b: &T) -> Ordering
where
	T: ?Sized + PartialOrd,
{
	if a < b {
		Ordering::Less
	} else if b < a {
		Ordering::Greater
	} else {
		Ordering::Equal
	}
}

/// Compares two records by value, then by key.
pub(crate) fn cmp_by_value<K, V>(a: &Record<K, V>, b: &Record<K, V>) -> Ordering
where
	K: PartialOrd,
	V: PartialOrd,
{
	compare(&a.value, &b.value).then_with(|| compare(&a.key, &b.key))
}

/// Compares two records by key, then by value.
pub(crate) fn cmp_by_key<K, V>(a: &Record<K, V>, b: &Record<K, V>) -> Ordering
where
	K: PartialOrd,
	V: PartialOrd,
{
	compare(&a.key, &b.key).then_with(|| compare(&a.value, &b.value))
}

/// Value index ordering between two handles.
pub(crate) fn value_cmp<R>(records: &R) -> impl use<'_, R> + Fn(&usize, &usize) -> Ordering
where
	R: ?Sized + Records,
	R::Key: PartialOrd,
	R::Value: PartialOrd,
{
	|&i, &j| cmp_by_value(records.record(i), records.record(j))
}

/// Key index ordering between two handles.
pub(crate) fn key_cmp<R>(records: &R) -> impl use<'_, R> + Fn(&usize, &usize) -> Ordering
where
	R: ?Sized + Records,
	R::Key: PartialOrd,
	R::Value: PartialOrd,
{
	|&i, &j| cmp_by_key(records.record(i), records.record(j))
}

/// Value index ordering between a handle and a free-standing record.
pub(crate) fn value_record_cmp<R>(
	records: &R,
) -> impl use<'_, R> + Fn(&usize, &Record<R::Key, R::Value>) -> Ordering
where
	R: ?Sized + Records,
	R::Key: PartialOrd,
	R::Value: PartialOrd,
{
	|&i, r| cmp_by_value(records.record(i), r)
}

/// Key index ordering between a handle and a borrowed key, ignoring values.
pub(crate) fn key_query_cmp<Q, R>(records: &R) -> impl use<'_, Q, R> + Fn(&usize, &Q) -> Ordering
where
	Q: ?Sized + PartialOrd,
	R: ?Sized + Records,
	R::Key: Borrow<Q>,
{
	|&i, q| compare(Borrow::<Q>::borrow(&records.record(i).key), q)
}

/// Lexicographic comparison of two sequences of pairs, using only `<`.
///
/// A strict prefix sorts first.
pub(crate) fn lexicographic_lt<'a, K, V, A, B>(mut a: A, mut b: B) -> bool
where
	K: 'a + PartialOrd,
	V: 'a + PartialOrd,
	A: Iterator<Item = (&'a K, &'a V)>,
	B: Iterator<Item = (&'a K, &'a V)>,
{
	loop {
		match (a.next(), b.next()) {
			(Some((ak, av)), Some((bk, bv))) => match compare(ak, bk).then_with(|| compare(av, bv)) {
				Ordering::Equal => (),
				ordering => return ordering.is_lt(),
			},
			(None, Some(_)) => return true,
			_ => return false,
		}
	}
}
