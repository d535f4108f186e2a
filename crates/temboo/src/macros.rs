/// Defines an insertion-ordered map newtype along with its common methods.
///
/// The generated type exposes the read-only part of the map interface, the
/// insertion logic is left to each container since every one of them has
/// its own upsert rules.
macro_rules! map {
    (
        $(#[$attr:meta])*
        pub struct $name:ident(IndexMap<$key:ty, $value:ty, DefaultHashBuilder>);
    ) => {
        $(#[$attr])*
        pub struct $name(IndexMap<$key, $value, DefaultHashBuilder>);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            #[doc = concat!("Creates an empty [`", stringify!($name), "`].")]
            #[must_use]
            #[inline]
            pub fn new() -> Self {
                Self(IndexMap::with_hasher(DefaultHashBuilder::default()))
            }

            #[doc = concat!("Checks whether [`", stringify!($name), "`] is empty.")]
            #[must_use]
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            #[doc = concat!("Returns the number of entries in [`", stringify!($name), "`].")]
            #[must_use]
            #[inline]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Returns an iterator over the entries.
            ///
            /// **Iterates over the elements in the order they were inserted.**
            #[inline]
            pub fn iter(&self) -> indexmap::map::Iter<'_, $key, $value> {
                self.0.iter()
            }

            #[inline]
            pub(crate) fn get_index(&self, index: usize) -> Option<(&$key, &$value)> {
                self.0.get_index(index)
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = (&'a $key, &'a $value);
            type IntoIter = indexmap::map::Iter<'a, $key, $value>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }
    };
}

pub(crate) use map;
