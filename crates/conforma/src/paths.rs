//! Facilities for working with paths within schemas or validated instances.
use std::{fmt, sync::Arc};

/// A cheap-to-clone, owned JSON Pointer into a schema or an instance.
///
/// Stored as its string form, so equality and hashing are byte comparisons
/// and rendering is free.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Location(Arc<str>);

impl Location {
    /// The root location.
    #[must_use]
    pub fn new() -> Location {
        Location(Arc::from(""))
    }

    /// A new location with `segment` appended.
    #[must_use]
    pub fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Location {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        push_segment(&mut buffer, segment.into());
        Location(Arc::from(buffer.as_str()))
    }

    /// The pointer in its string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn push_segment(buffer: &mut String, segment: LocationSegment<'_>) {
    buffer.push('/');
    match segment {
        LocationSegment::Property(property) => {
            for ch in property.chars() {
                match ch {
                    '~' => buffer.push_str("~0"),
                    '/' => buffer.push_str("~1"),
                    _ => buffer.push(ch),
                }
            }
        }
        LocationSegment::Index(index) => buffer.push_str(itoa::Buffer::new().format(index)),
    }
}

/// A single segment of a location: a property name or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSegment<'a> {
    Property(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    fn from(value: &'a str) -> Self {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    fn from(value: &'a String) -> Self {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

/// A lazily-built location for the instance currently being validated.
///
/// Forms a linked list through parent stack frames, so that descending into
/// a property or array element costs nothing unless an error needs the full
/// pointer.
#[derive(Debug, Clone, Copy)]
pub struct LazyLocation<'a, 'b> {
    pub(crate) segment: Option<LocationSegment<'a>>,
    pub(crate) parent: Option<&'b LazyLocation<'b, 'a>>,
}

impl Default for LazyLocation<'_, '_> {
    fn default() -> Self {
        LazyLocation::new()
    }
}

impl<'a, 'b> LazyLocation<'a, 'b> {
    /// The root of the instance.
    #[must_use]
    pub const fn new() -> Self {
        LazyLocation {
            segment: None,
            parent: None,
        }
    }

    /// A child location one segment below `self`.
    #[must_use]
    pub fn push(&'a self, segment: impl Into<LocationSegment<'a>>) -> LazyLocation<'a, 'a> {
        LazyLocation {
            segment: Some(segment.into()),
            parent: Some(self),
        }
    }
}

impl From<&LazyLocation<'_, '_>> for Location {
    fn from(value: &LazyLocation<'_, '_>) -> Self {
        let mut segments = Vec::new();
        let mut node = Some(value);
        while let Some(current) = node {
            if let Some(segment) = current.segment {
                segments.push(segment);
            }
            node = current.parent;
        }
        let mut buffer = String::new();
        for segment in segments.into_iter().rev() {
            push_segment(&mut buffer, segment);
        }
        Location(Arc::from(buffer.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyLocation, Location};

    #[test]
    fn joins_and_escapes() {
        let location = Location::new().join("a/b").join(3).join("c~d");
        assert_eq!(location.as_str(), "/a~1b/3/c~0d");
    }

    #[test]
    fn lazy_location_materializes_in_order() {
        let root = LazyLocation::new();
        let first = root.push("items");
        let second = first.push(2);
        let location = Location::from(&second);
        assert_eq!(location.as_str(), "/items/2");
    }

    #[test]
    fn root_is_empty() {
        assert_eq!(Location::from(&LazyLocation::new()).as_str(), "");
        assert_eq!(Location::new().as_str(), "");
    }
}
