/// Delimited id-list value type
///
/// The store keeps two denormalized relationships as comma-joined text:
/// a user's owned task ids (`users.task_ids`) and a task's associated
/// attribute ids (`tasks.attribute_ids`). `IdList` is the single place that
/// parses and serializes that representation.
///
/// Parsing is lossy by contract: segments that do not parse as integers are
/// dropped, and the empty string parses to the empty list. Serialization
/// joins with `,` and no spaces, so a round trip through well-formed text
/// is exact.
///
/// # Example
///
/// ```
/// use questlog_shared::models::id_list::IdList;
///
/// let mut list = IdList::parse("3,7,11");
/// list.push(15);
/// list.remove(7);
/// assert_eq!(list.to_string(), "3,11,15");
/// ```

use std::fmt;

/// An ordered list of row ids serialized as comma-joined text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(Vec<i64>);

impl IdList {
    /// Parses comma-joined text, dropping malformed segments
    pub fn parse(text: &str) -> Self {
        let ids = text
            .split(',')
            .filter_map(|segment| segment.trim().parse::<i64>().ok())
            .collect();
        IdList(ids)
    }

    /// Appends an id to the end of the list
    pub fn push(&mut self, id: i64) {
        self.0.push(id);
    }

    /// Removes every entry equal to `id`
    pub fn remove(&mut self, id: i64) {
        self.0.retain(|entry| *entry != id);
    }

    /// The ids in list order
    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }
}

impl From<Vec<i64>> for IdList {
    fn from(ids: Vec<i64>) -> Self {
        IdList(ids)
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", joined)
    }
}
