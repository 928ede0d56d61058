use crate::DualIndexMultiMap;
use serde::{de::Error as _, ser::SerializeSeq};
use serde_seeded::{de::Seed, ser::Seeded, DeserializeSeeded, SerializeSeeded};
use std::marker::PhantomData;

impl<K: SerializeSeeded<Q>, V: SerializeSeeded<Q>, Q> SerializeSeeded<Q> for DualIndexMultiMap<K, V> {
	fn serialize_seeded<S>(&self, seed: &Q, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.len()))?;
		for (key, value) in self.iter_by_key() {
			seq.serialize_element(&(Seeded::new(seed, key), Seeded::new(seed, value)))?;
		}
		seq.end()
	}
}

/// Deserializes a `(key, value)` pair, each half through its own seed.
struct PairSeed<'a, Q: ?Sized, K, KS, V>(&'a Q, PhantomData<(K, KS, V)>);

/// Marker for keys deserialized with the seed.
struct SeededKey;

/// Marker for keys deserialized without the seed.
struct PlainKey;

trait KeySeed<'de, Q: ?Sized, K> {
	fn next_key<A>(seed: &Q, seq: &mut A) -> Result<Option<K>, A::Error>
	where
		A: serde::de::SeqAccess<'de>;
}

impl<'de, Q: ?Sized, K: DeserializeSeeded<'de, Q>> KeySeed<'de, Q, K> for SeededKey {
	fn next_key<A>(seed: &Q, seq: &mut A) -> Result<Option<K>, A::Error>
	where
		A: serde::de::SeqAccess<'de>,
	{
		seq.next_element_seed(Seed::new(seed))
	}
}

impl<'de, Q: ?Sized, K: serde::Deserialize<'de>> KeySeed<'de, Q, K> for PlainKey {
	fn next_key<A>(_seed: &Q, seq: &mut A) -> Result<Option<K>, A::Error>
	where
		A: serde::de::SeqAccess<'de>,
	{
		seq.next_element()
	}
}

impl<'de, 'a, Q, K, KS, V> serde::de::DeserializeSeed<'de> for PairSeed<'a, Q, K, KS, V>
where
	Q: ?Sized,
	KS: KeySeed<'de, Q, K>,
	V: DeserializeSeeded<'de, Q>,
{
	type Value = (K, V);

	fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		deserializer.deserialize_tuple(2, self)
	}
}

impl<'de, 'a, Q, K, KS, V> serde::de::Visitor<'de> for PairSeed<'a, Q, K, KS, V>
where
	Q: ?Sized,
	KS: KeySeed<'de, Q, K>,
	V: DeserializeSeeded<'de, Q>,
{
	type Value = (K, V);

	fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(formatter, "a key-value pair")
	}

	fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
	where
		A: serde::de::SeqAccess<'de>,
	{
		let key = KS::next_key(self.0, &mut seq)?.ok_or_else(|| A::Error::invalid_length(0, &self))?;
		let value = seq
			.next_element_seed(Seed::new(self.0))?
			.ok_or_else(|| A::Error::invalid_length(1, &self))?;
		Ok((key, value))
	}
}

/// Visits a sequence of pairs, inserting each one.
struct EntriesVisitor<'a, Q: ?Sized, K, KS, V>(&'a Q, PhantomData<(K, KS, V)>);

impl<'de, 'a, Q, K, KS, V> serde::de::Visitor<'de> for EntriesVisitor<'a, Q, K, KS, V>
where
	Q: ?Sized,
	K: PartialOrd,
	KS: KeySeed<'de, Q, K>,
	V: PartialOrd + DeserializeSeeded<'de, Q>,
{
	type Value = DualIndexMultiMap<K, V>;

	fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(formatter, "a sequence of key-value pairs")
	}

	fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
	where
		A: serde::de::SeqAccess<'de>,
	{
		let mut result = DualIndexMultiMap::new();

		while let Some((key, value)) = seq.next_element_seed(PairSeed::<Q, K, KS, V>(self.0, PhantomData))? {
			result.insert(key, value);
		}

		Ok(result)
	}
}

impl<'de, Q, K, V> DeserializeSeeded<'de, Q> for DualIndexMultiMap<K, V>
where
	Q: ?Sized,
	K: PartialOrd + DeserializeSeeded<'de, Q>,
	V: PartialOrd + DeserializeSeeded<'de, Q>,
{
	fn deserialize_seeded<D>(seed: &Q, deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		deserializer.deserialize_seq(EntriesVisitor::<Q, K, SeededKey, V>(seed, PhantomData))
	}
}

/// Seeded (de)serialization of a [`DualIndexMultiMap`] whose keys do not need
/// the seed.
pub mod unseeded_dual_index_multi_map_key {
	use super::{EntriesVisitor, PlainKey};
	use crate::DualIndexMultiMap;
	use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};
	use serde_seeded::{ser::Seeded, DeserializeSeeded, SerializeSeeded};
	use std::marker::PhantomData;

	pub fn serialize_seeded<K, V, Q, S>(
		value: &DualIndexMultiMap<K, V>,
		seed: &Q,
		serializer: S,
	) -> Result<S::Ok, S::Error>
	where
		K: Serialize,
		V: SerializeSeeded<Q>,
		S: Serializer,
	{
		let mut s = serializer.serialize_seq(Some(value.len()))?;

		for (key, value) in value.iter_by_key() {
			s.serialize_element(&(key, Seeded::new(seed, value)))?;
		}

		s.end()
	}

	pub fn deserialize_seeded<'de, K, V, Q, D>(
		seed: &Q,
		deserializer: D,
	) -> Result<DualIndexMultiMap<K, V>, D::Error>
	where
		Q: ?Sized,
		K: PartialOrd + Deserialize<'de>,
		V: PartialOrd + DeserializeSeeded<'de, Q>,
		D: Deserializer<'de>,
	{
		deserializer.deserialize_seq(EntriesVisitor::<Q, K, PlainKey, V>(seed, PhantomData))
	}
}
