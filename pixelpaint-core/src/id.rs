//! # IDs
//! Layers and actions live in append-only arenas and are referred to by index, via the `ArenaID<T>` type.
//! The type parameter is a namespace only: an `ArenaID<Layer>` can never be confused with an `ArenaID<Action>`,
//! even though both are a plain `u32` underneath.
//!
//! Arenas never free a slot while anything may still refer to it, so an ID stays valid for the life of the
//! arena that issued it. This keeps history serializable - an ID written to disk is just its index.

/// Index into an arena of `T`.
pub struct ArenaID<T> {
    index: u32,
    // Namespace marker
    _phantom: std::marker::PhantomData<fn() -> T>,
}
impl<T> Clone for ArenaID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for ArenaID<T> {}
impl<T> PartialEq for ArenaID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl<T> Eq for ArenaID<T> {}
impl<T> PartialOrd for ArenaID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
/// IDs are ordered by allocation. An earlier ID was always allocated before a later one.
impl<T> Ord for ArenaID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}
impl<T> std::hash::Hash for ArenaID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> ArenaID<T> {
    /// Wrap a raw index. Only arenas and the document loader should mint IDs.
    #[must_use]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self {
            index,
            _phantom: std::marker::PhantomData,
        }
    }
    /// Get the raw numeric value of this ID.
    /// IDs from differing namespaces may share the same numeric ID!
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }
    #[must_use]
    pub fn as_usize(&self) -> usize {
        // u32 always fits in usize on supported targets.
        self.index as usize
    }
    /// The ID that would be allocated after an arena of `len` elements.
    ///
    /// Returns `None` if the arena is full.
    #[must_use]
    pub(crate) fn next_for_len(len: usize) -> Option<Self> {
        u32::try_from(len).ok().map(Self::from_index)
    }
}
impl<T> std::fmt::Display for ArenaID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        //Unwrap here is safe - the rsplit will always return at least one element, even for empty strings.
        write!(
            f,
            "{}#{}",
            std::any::type_name::<T>().rsplit("::").next().unwrap(),
            self.index
        )
    }
}
impl<T> std::fmt::Debug for ArenaID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}
// Serialized as the bare index, never as an embedded object.
impl<T> serde::Serialize for ArenaID<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index)
    }
}
impl<'de, T> serde::Deserialize<'de> for ArenaID<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <u32 as serde::Deserialize>::deserialize(deserializer).map(Self::from_index)
    }
}

#[cfg(test)]
mod test {
    use super::ArenaID;

    struct Namespace;
    type TestID = ArenaID<Namespace>;

    #[test]
    fn ordered_by_allocation() {
        let a = TestID::next_for_len(0).unwrap();
        let b = TestID::next_for_len(1).unwrap();
        assert!(a < b);
        assert_eq!(a.index(), 0);
        assert_eq!(b.as_usize(), 1);
    }
    #[test]
    fn display_names_namespace() {
        assert_eq!(TestID::from_index(7).to_string(), "Namespace#7");
    }
    #[test]
    fn serializes_bare() {
        let id = TestID::from_index(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: TestID = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }
    // Test only makes sense if we can exceed u32::MAX in a usize
    #[cfg(target_pointer_width = "64")]
    #[test]
    fn exhausted() {
        assert!(TestID::next_for_len(u32::MAX as usize + 1).is_none());
    }
}
