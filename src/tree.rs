//! Output trees: values grouped into branches addressed by integer paths.

use std::hash::Hash;

use indexmap::IndexMap;

/// Ordered multi-map from a path to the values appended under it.
///
/// Branches iterate in the order their paths were first appended to. Clearing
/// a branch empties it in place.
#[derive(Clone, Debug, PartialEq)]
pub struct DataTree<P, T>
where
    P: Copy + Eq + Hash,
{
    branches: IndexMap<P, Vec<T>>,
}

impl<P, T> Default for DataTree<P, T>
where
    P: Copy + Eq + Hash,
{
    fn default() -> Self {
        DataTree {
            branches: IndexMap::new(),
        }
    }
}

impl<P, T> DataTree<P, T>
where
    P: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the branch at `path`, creating the branch if needed.
    pub fn append(&mut self, path: P, value: T) {
        self.branches.entry(path).or_default().push(value);
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, path: P, values: I) {
        self.branches.entry(path).or_default().extend(values);
    }

    pub fn path_exists(&self, path: &P) -> bool {
        self.branches.contains_key(path)
    }

    /// Empty the branch at `path`. Returns `false` when there is no such branch.
    pub fn clear_branch(&mut self, path: &P) -> bool {
        self.branches.get_mut(path).map(Vec::clear).is_some()
    }

    pub fn branch(&self, path: &P) -> Option<&[T]> {
        self.branches.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &P> + '_ {
        self.branches.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&P, &[T])> + '_ {
        self.branches
            .iter()
            .map(|(path, values)| (path, values.as_slice()))
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Total number of values over all branches.
    pub fn len(&self) -> usize {
        self.branches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
