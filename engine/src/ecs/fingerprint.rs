//! Type fingerprints.
//!
//! A [`Fingerprint`] is a 64-bit value derived from a Rust type's identity. Fingerprints of a set
//! of types combine with XOR, which makes the combined value independent of the order the types
//! are listed in: `(A, B)` and `(B, A)` share a fingerprint. The empty set maps to
//! [`Fingerprint::EMPTY`].
//!
//! Fingerprints key the component registry, the query cache and the system registry. A global
//! name table remembers which type produced each fingerprint so that collisions between distinct
//! types can be reported.

use std::{
    any::TypeId,
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
    ops::{BitXor, BitXorAssign},
};

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Fingerprint to type name, for every type fingerprinted so far.
static NAMES: Lazy<DashMap<Fingerprint, &'static str>> = Lazy::new(DashMap::new);

/// A 64-bit type identity value. Combining fingerprints with `^` is commutative and associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// The fingerprint of the empty type set.
    pub const EMPTY: Self = Self(0);

    /// Construct a fingerprint from a raw value.
    #[inline]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The fingerprint of a single type.
    ///
    /// Stable for the lifetime of the process. Logs a warning the first time two distinct types
    /// produce the same value.
    pub fn of<T: 'static>() -> Self {
        let mut hasher = DefaultHasher::new();
        TypeId::of::<T>().hash(&mut hasher);
        let fingerprint = Self(hasher.finish());

        let name = std::any::type_name::<T>();
        // Read first; the shard write lock is only taken the first time a value is seen.
        let known = NAMES.get(&fingerprint).map(|known| *known);
        let known = match known {
            Some(known) => known,
            None => *NAMES.entry(fingerprint).or_insert(name),
        };
        if known != name {
            log::warn!("fingerprint collision between '{known}' and '{name}' ({fingerprint})");
        }
        fingerprint
    }

    /// The raw value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Whether this is the fingerprint of the empty set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == Self::EMPTY.0
    }

    /// The name of the type this fingerprint was first produced from, if it is a single type
    /// that has been fingerprinted in this process.
    pub fn type_name(&self) -> Option<&'static str> {
        NAMES.get(self).map(|name| *name)
    }
}

impl BitXor for Fingerprint {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Fingerprint {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl FromIterator<Fingerprint> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, BitXor::bitxor)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
