//! Identity paths: stable, structured names for positions in the element tree.
//!
//! Every component invocation is identified by the path from its mount root
//! down to itself. Each step records the resolved name (host tag or component
//! name) and either the explicit key or the positional index. Two invocations
//! at the same logical position across renders resolve to equal paths, which
//! is how the instance store finds persistent state again.

use std::fmt;
use std::rc::Rc;

/// Identity key for one step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Position among the parent's children.
    Index(usize),
    /// Explicit key supplied by the element.
    Explicit(Rc<str>),
}

impl Key {
    /// Build an explicit key.
    pub fn explicit(key: impl AsRef<str>) -> Self {
        Key::Explicit(Rc::from(key.as_ref()))
    }

    /// Resolve an optional explicit key against a positional index.
    pub fn resolve(explicit: Option<&Key>, index: usize) -> Key {
        explicit.cloned().unwrap_or(Key::Index(index))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Explicit(k) => write!(f, "{k}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::explicit(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::explicit(value)
    }
}

macro_rules! key_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(value: $t) -> Self {
                Key::explicit(value.to_string())
            }
        })*
    };
}

key_from_int!(i32, i64, u32, u64, usize);

/// One step of an [`IdentityPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    pub name: Rc<str>,
    /// `None` only for mount roots.
    pub key: Option<Key>,
}

/// Ordered sequence of segments from a mount root to a node.
///
/// Cloning is cheap: segments share their name strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IdentityPath {
    segments: Vec<Segment>,
}

impl IdentityPath {
    /// A path consisting of a single, unkeyed root segment.
    pub fn root(name: impl AsRef<str>) -> Self {
        Self {
            segments: vec![Segment {
                name: Rc::from(name.as_ref()),
                key: None,
            }],
        }
    }

    /// Extend this path by one step.
    pub fn child(&self, name: impl AsRef<str>, key: Key) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(Segment {
            name: Rc::from(name.as_ref()),
            key: Some(key),
        });
        Self { segments }
    }

    /// Whether `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &IdentityPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// All segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for IdentityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment.name)?;
            if let Some(key) = &segment.key {
                write!(f, ":{key}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_slash_colon_form() {
        let path = IdentityPath::root("Mount0")
            .child("div", Key::Index(0))
            .child("Counter", Key::explicit("a"));
        assert_eq!(path.to_string(), "/Mount0/div:0/Counter:a");
    }

    #[test]
    fn explicit_key_wins_over_index() {
        let key = Key::explicit("item-7");
        assert_eq!(Key::resolve(Some(&key), 3), key);
        assert_eq!(Key::resolve(None, 3), Key::Index(3));
    }

    #[test]
    fn explicit_numeric_key_is_distinct_from_index() {
        let root = IdentityPath::root("Mount0");
        let by_key = root.child("li", Key::from(1));
        let by_index = root.child("li", Key::Index(1));
        assert_eq!(by_key.to_string(), by_index.to_string());
        assert_ne!(by_key, by_index);
    }

    #[test]
    fn starts_with_is_segment_wise() {
        let root = IdentityPath::root("Mount0");
        let item1 = root.child("Item", Key::Index(1));
        let item10 = root.child("Item", Key::Index(10));
        let nested = item1.child("span", Key::Index(0));
        assert!(nested.starts_with(&item1));
        assert!(nested.starts_with(&root));
        assert!(item1.starts_with(&item1));
        // A string prefix check would wrongly match "/Item:1" against "/Item:10".
        assert!(!item10.starts_with(&item1));
    }

    #[test]
    fn same_position_same_path() {
        let a = IdentityPath::root("Mount0").child("App", Key::Index(0));
        let b = IdentityPath::root("Mount0").child("App", Key::Index(0));
        assert_eq!(a, b);
        assert_eq!(a.depth(), 2);
        assert_eq!(a.last().map(|s| &*s.name), Some("App"));
    }
}
