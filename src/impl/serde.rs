use std::marker::PhantomData;

use serde::{ser::SerializeSeq, Deserialize, Serialize};

use crate::DualIndexMultiMap;

/// Serialized as a sequence of `(key, value)` pairs in key order, one per
/// entry.
impl<K: Serialize, V: Serialize> Serialize for DualIndexMultiMap<K, V> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.len()))?;

		for entry in self.iter_by_key() {
			seq.serialize_element(&entry)?;
		}

		seq.end()
	}
}

impl<'de, K, V> Deserialize<'de> for DualIndexMultiMap<K, V>
where
	K: PartialOrd + Deserialize<'de>,
	V: PartialOrd + Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		struct Visitor<K, V>(PhantomData<(K, V)>);

		impl<'de, K, V> serde::de::Visitor<'de> for Visitor<K, V>
		where
			K: PartialOrd + Deserialize<'de>,
			V: PartialOrd + Deserialize<'de>,
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

				while let Some((key, value)) = seq.next_element()? {
					result.insert(key, value);
				}

				Ok(result)
			}
		}

		deserializer.deserialize_seq(Visitor(PhantomData))
	}
}
