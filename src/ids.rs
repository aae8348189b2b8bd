//! Ids given to declarations that do not name themselves.
//!
//! Triggers spawn and destroy objects by id, so every timeline object has one. A declaration
//! without `id` receives one from an [`IdSource`]:
//!
//! - [`SequentialIds`] yields `prefix0`, `prefix1`, ... and is the choice for reproducible output,
//! - [`RandIds`] yields random 8.3 file names such as `x1c4ke0q.vtp`, like a temporary file
//!   name would look.

/// A generator of object ids.
pub trait IdSource {
    /// Returns a fresh id. Ids returned by one source should not repeat.
    fn next_id(&mut self) -> String;
}

impl<T: IdSource + ?Sized> IdSource for Box<T> {
    fn next_id(&mut self) -> String {
        T::next_id(self)
    }
}

impl<T: IdSource + ?Sized> IdSource for &mut T {
    fn next_id(&mut self) -> String {
        T::next_id(self)
    }
}

/// Numbered ids with a common prefix.
///
/// ```rust
/// use storyboard_rs::ids::{IdSource, SequentialIds};
///
/// let mut ids = SequentialIds::new("obj");
/// assert_eq!(ids.next_id(), "obj0");
/// assert_eq!(ids.next_id(), "obj1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Creates a source starting at `0`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("object_")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Random 8.3 file names drawn from any [`rand::RngCore`].
///
/// ```rust
/// # #[cfg(feature = "rand")]
/// # {
/// use rand::{SeedableRng, rngs::StdRng};
/// use storyboard_rs::ids::{IdSource, RandIds};
///
/// let mut ids = RandIds(StdRng::seed_from_u64(42));
/// let id = ids.next_id();
/// assert_eq!(id.len(), 12);
/// assert_eq!(id.find('.'), Some(8));
/// # }
/// ```
#[cfg(feature = "rand")]
pub struct RandIds<R>(pub R);

#[cfg(feature = "rand")]
impl<R: rand::RngCore> IdSource for RandIds<R> {
    fn next_id(&mut self) -> String {
        const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut pick = || {
            let index = (self.0.next_u32() % ALPHABET.len() as u32) as usize;
            char::from(ALPHABET[index])
        };
        let stem: String = (0..8).map(|_| pick()).collect();
        let extension: String = (0..3).map(|_| pick()).collect();
        format!("{stem}.{extension}")
    }
}

#[cfg(all(test, feature = "rand"))]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn random_ids_look_like_file_names() {
        let mut ids = RandIds(StdRng::seed_from_u64(7));
        let generated: HashSet<_> = (0..64).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 64);
        for id in generated {
            let (stem, extension) = id.split_once('.').unwrap();
            assert_eq!(stem.len(), 8);
            assert_eq!(extension.len(), 3);
            assert!(id.chars().all(|c| c == '.' || c.is_ascii_alphanumeric()));
        }
    }
}
