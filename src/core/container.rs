//! In-memory form of one FMG file
//!
//! Texts live in an arena of optional values (`None` is the on-disk sentinel,
//! offset 0). An ordered identifier index points into the arena, so iteration
//! is always ascending by identifier and the encoder never has to sort.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Result of looking up an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Identifier is not present in the container
    Missing,
    /// Identifier is present but has no string (offset 0 on disk)
    Null,
    /// Identifier maps to a stored string, possibly empty
    Text(&'a str),
}

impl<'a> Lookup<'a> {
    /// Text view where missing and sentinel entries read as `""`
    pub fn as_str(self) -> &'a str {
        match self {
            Lookup::Text(text) => text,
            Lookup::Missing | Lookup::Null => "",
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Lookup::Missing)
    }
}

/// Decoded localization container
///
/// Two containers are equal when they have the same path and the same
/// identifier to value mapping; arena order and placeholders are ignored.
#[derive(Debug, Clone, Default)]
pub struct Container {
    path: PathBuf,
    slots: Vec<Option<String>>,
    index: BTreeMap<u32, usize>,
}

impl Container {
    /// Create an empty container that will be saved to `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Container {
            path: path.into(),
            slots: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.path = path.into();
    }

    pub fn lookup(&self, id: u32) -> Lookup<'_> {
        match self.index.get(&id) {
            None => Lookup::Missing,
            Some(&slot) => match &self.slots[slot] {
                None => Lookup::Null,
                Some(text) => Lookup::Text(text),
            },
        }
    }

    /// Text for `id`, `""` if missing or sentinel
    pub fn text(&self, id: u32) -> &str {
        self.lookup(id).as_str()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Store `text` for `id`, adding the identifier if needed
    pub fn set<S: Into<String>>(&mut self, id: u32, text: S) {
        self.store(id, Some(text.into()));
    }

    /// Mark `id` as present without a string
    pub fn set_null(&mut self, id: u32) {
        self.store(id, None);
    }

    fn store(&mut self, id: u32, value: Option<String>) {
        match self.index.get(&id) {
            Some(&slot) => self.slots[slot] = value,
            None => {
                self.index.insert(id, self.slots.len());
                self.slots.push(value);
            }
        }
    }

    /// Grow the arena to at least `slots` entries
    ///
    /// New slots are placeholders bound to no identifier; they read as empty
    /// and are never written to disk. Returns true if the arena grew.
    pub fn extend_to(&mut self, slots: usize) -> bool {
        if self.slots.len() >= slots {
            return false;
        }
        self.slots.resize(slots, None);
        true
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Arena length, including unbound placeholder slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn max_id(&self) -> Option<u32> {
        self.index.keys().next_back().copied()
    }

    /// Identifiers in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.index.keys().copied()
    }

    /// `(id, value)` pairs in ascending identifier order
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<&str>)> + '_ {
        self.index
            .iter()
            .map(move |(&id, &slot)| (id, self.slots[slot].as_deref()))
    }

    /// Number of identifiers stored as sentinel
    pub fn null_count(&self) -> usize {
        self.index
            .values()
            .filter(|&&slot| self.slots[slot].is_none())
            .count()
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.iter().eq(other.iter())
    }
}

impl Eq for Container {}

/// Whether a value belongs to the "empty" equivalence class
///
/// Missing, sentinel, `""` and any of `markers` (e.g. `[ERROR]`) are equal.
pub fn is_blank<S: AsRef<str>>(value: Lookup<'_>, markers: &[S]) -> bool {
    match value {
        Lookup::Missing | Lookup::Null => true,
        Lookup::Text(text) => text.is_empty() || markers.iter().any(|m| m.as_ref() == text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_lookup() {
        let mut fmg = Container::new("menu.fmg");
        fmg.set(10, "Start");
        fmg.set_null(11);
        fmg.set(12, "");

        assert_eq!(fmg.lookup(10), Lookup::Text("Start"));
        assert_eq!(fmg.lookup(11), Lookup::Null);
        assert_eq!(fmg.lookup(12), Lookup::Text(""));
        assert_eq!(fmg.lookup(13), Lookup::Missing);
        assert_eq!(fmg.text(11), "");
        assert_eq!(fmg.len(), 3);
        assert_eq!(fmg.null_count(), 1);
    }

    #[test]
    fn test_overwrite_keeps_slot() {
        let mut fmg = Container::new("a.fmg");
        fmg.set(1, "one");
        fmg.set(1, "uno");

        assert_eq!(fmg.len(), 1);
        assert_eq!(fmg.slot_count(), 1);
        assert_eq!(fmg.text(1), "uno");
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut fmg = Container::new("a.fmg");
        fmg.set(30, "c");
        fmg.set(10, "a");
        fmg.set_null(20);

        let items: Vec<_> = fmg.iter().collect();
        assert_eq!(items, vec![(10, Some("a")), (20, None), (30, Some("c"))]);
        assert_eq!(fmg.max_id(), Some(30));
    }

    #[test]
    fn test_extend_to_adds_unbound_placeholders() {
        let mut fmg = Container::new("a.fmg");
        fmg.set(1, "x");

        assert!(fmg.extend_to(4));
        assert!(!fmg.extend_to(2));
        assert_eq!(fmg.slot_count(), 4);
        assert_eq!(fmg.len(), 1);

        fmg.set(2, "y");
        assert_eq!(fmg.slot_count(), 5);
        assert_eq!(fmg.text(2), "y");
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = Container::new("a.fmg");
        a.set(2, "two");
        a.set(1, "one");

        let mut b = Container::new("a.fmg");
        b.set(1, "one");
        b.set(2, "two");
        b.extend_to(10);

        assert_eq!(a, b);

        b.set_null(3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_blank() {
        let markers = ["[ERROR]"];
        assert!(is_blank(Lookup::Missing, &markers));
        assert!(is_blank(Lookup::Null, &markers));
        assert!(is_blank(Lookup::Text(""), &markers));
        assert!(is_blank(Lookup::Text("[ERROR]"), &markers));
        assert!(!is_blank(Lookup::Text("Hi"), &markers));
        assert!(!is_blank(Lookup::Text("[ERROR]"), &[] as &[&str]));
    }
}
