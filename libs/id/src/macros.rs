//! Macros for defining typed ID types.

/// Macro to define a typed numeric ID.
///
/// This generates a newtype wrapper around an unsigned integer with:
/// - `new()` / `value()` to move between the handle and its raw integer
/// - `Display` and `FromStr` (decimal) implementations
/// - `Serialize` and `Deserialize` as a plain number
/// - `Ord`, `Hash`, and other standard traits
///
/// Adding `uuid` after the representation also generates
/// `from_uuid_str()`, which derives the handle from a UUID string.
///
/// # Example
///
/// ```ignore
/// define_id!(TaskId, u64);
/// define_id!(JobId, u64, uuid);
///
/// let task = TaskId::new(7);
/// let job = JobId::from_uuid_str("2f1e0b7c-5f0d-4d89-9a4b-3c1d2e3f4a5b")?;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, u64, uuid) => {
        $crate::define_id!($name, u64);

        impl $name {
            /// Derives the handle from a UUID string.
            ///
            /// The same string always yields the same handle.
            pub fn from_uuid_str(s: &str) -> Result<Self, $crate::IdError> {
                $crate::fold_uuid(s).map(Self)
            }
        }
    };

    ($name:ident, $repr:ty) => {
        /// A typed numeric handle for this entity kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            /// Creates an ID from its raw value.
            #[must_use]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn value(&self) -> $repr {
                self.0
            }

            /// Parses an ID from its decimal representation.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if s.is_empty() {
                    return Err($crate::IdError::Empty);
                }
                s.parse::<$repr>()
                    .map(Self)
                    .map_err(|_| $crate::IdError::InvalidNumber(s.to_string()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $repr {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&self.0, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                <$repr as serde::Deserialize>::deserialize(deserializer).map(Self)
            }
        }
    };
}
