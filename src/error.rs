/// Error returned by [`DualIndexMultiMap`](crate::DualIndexMultiMap)
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// An extremal query was made on an empty map.
	#[error("the collection is empty")]
	EmptyCollection,

	/// No entry has a key comparing equal to the requested one.
	#[error("key not found")]
	KeyNotFound,
}
