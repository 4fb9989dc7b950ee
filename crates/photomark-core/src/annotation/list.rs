//! Append-only annotation log.

use super::{Annotation, InvalidAnnotation};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Ordered log of committed annotations.
///
/// Insertion order is paint order and erase order. Entries are never
/// reordered or edited; the only removal is [`AnnotationLog::clear`].
///
/// Serializes as a plain JSON array. Deserializing validates every entry,
/// so a restored log never holds geometry a builder could not produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Annotation>", try_from = "Vec<Annotation>")]
pub struct AnnotationLog {
    entries: Vec<Annotation>,
}

impl AnnotationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed annotation.
    pub fn push(&mut self, annotation: Annotation) {
        self.entries.push(annotation);
    }

    /// Discard every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.entries
    }

    /// Union of every entry's painted bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.entries
            .iter()
            .map(Annotation::bounds)
            .reduce(|acc, r| acc.union(r))
    }
}

impl FromIterator<Annotation> for AnnotationLog {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<Vec<Annotation>> for AnnotationLog {
    type Error = InvalidAnnotation;

    fn try_from(entries: Vec<Annotation>) -> Result<Self, Self::Error> {
        entries.iter().try_for_each(Annotation::validate)?;
        Ok(Self { entries })
    }
}

impl From<AnnotationLog> for Vec<Annotation> {
    fn from(log: AnnotationLog) -> Self {
        log.entries
    }
}

impl<'a> IntoIterator for &'a AnnotationLog {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
