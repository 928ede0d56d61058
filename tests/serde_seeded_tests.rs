#![cfg(feature = "serde-seeded")]
//! Seeded serialization with plain keys and seeded values.
use btree_dual_index::{unseeded_dual_index_multi_map_key as unseeded_key, DualIndexMultiMap};
use serde::Deserialize;
use serde_seeded::{DeserializeSeeded, SerializeSeeded};

/// Quantity stored in units, serialized scaled by the seed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Scaled(u32);

impl SerializeSeeded<u32> for Scaled {
	fn serialize_seeded<S>(&self, seed: &u32, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_u32(self.0 * seed)
	}
}

impl<'de> DeserializeSeeded<'de, u32> for Scaled {
	fn deserialize_seeded<D>(seed: &u32, deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		u32::deserialize(deserializer).map(|n| Scaled(n / seed))
	}
}

#[test]
fn test_seeds_values_only() {
	let map: DualIndexMultiMap<u32, Scaled> = [(2, Scaled(1)), (1, Scaled(3))].into_iter().collect();

	let mut buffer = Vec::new();
	let mut serializer = serde_json::Serializer::new(&mut buffer);
	unseeded_key::serialize_seeded(&map, &10u32, &mut serializer).unwrap();
	assert_eq!(String::from_utf8(buffer).unwrap(), "[[1,30],[2,10]]");

	let mut deserializer = serde_json::Deserializer::from_str("[[1,30],[2,10]]");
	let decoded: DualIndexMultiMap<u32, Scaled> =
		unseeded_key::deserialize_seeded(&10u32, &mut deserializer).unwrap();
	assert_eq!(decoded, map);
	assert_eq!(decoded.min_value(), Ok(&Scaled(1)));
}
