//! Dense, zero-based ordering for explicitly positioned collections.
//!
//! Every relationship that carries a `position` field (templates inside a group,
//! groups inside a blueprint, sections inside a script, groups inside a setup)
//! goes through these functions. After any call the positions of a list of
//! length `n` are exactly `{0, 1, ..., n-1}`, each used once.
//!
//! The functions take the list by value and hand back the re-stamped list, so
//! entity mutators can clone, pass, and store the result without ever touching
//! the value they were called on.

use crate::error::LedgerError;
use itertools::Itertools;

/// An item that lives at an explicit position inside an ordered collection.
pub trait Positioned {
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

/// Sorts by the current position (stable for ties) and re-stamps positions to indices.
pub fn normalize<T: Positioned>(mut list: Vec<T>) -> Vec<T> {
    list.sort_by_key(|item| item.position());
    restamp(list)
}

/// Returns `true` when positions are exactly `0..len`, each used once.
pub fn is_dense<T: Positioned>(list: &[T]) -> bool {
    list.iter()
        .map(Positioned::position)
        .sorted_unstable()
        .eq(0..list.len())
}

/// Inserts `item` at `position`, shifting every item at or after it by one.
///
/// A target beyond the end appends.
pub fn insert_at<T: Positioned>(list: Vec<T>, mut item: T, position: usize) -> Vec<T> {
    let mut list = normalize(list);
    let target = position.min(list.len());

    for existing in list.iter_mut().filter(|e| e.position() >= target) {
        let shifted = existing.position() + 1;
        existing.set_position(shifted);
    }

    item.set_position(target);
    list.push(item);
    list.sort_by_key(|item| item.position());
    list
}

/// Removes every item matched by `matcher` and closes the gaps it leaves.
pub fn remove_and_compact<T, F>(list: Vec<T>, matcher: F) -> Vec<T>
where
    T: Positioned,
    F: Fn(&T) -> bool,
{
    let mut list = normalize(list);
    list.retain(|item| !matcher(item));
    restamp(list)
}

/// Moves the item at `from_index` to `to_index`. A `to_index` beyond the end is clamped.
pub fn reorder<T: Positioned>(
    list: Vec<T>,
    from_index: usize,
    to_index: usize,
) -> Result<Vec<T>, LedgerError> {
    let mut list = normalize(list);
    if from_index >= list.len() {
        return Err(LedgerError::IndexOutOfRange {
            index: from_index,
            len: list.len(),
        });
    }

    let item = list.remove(from_index);
    let target = to_index.min(list.len());
    list.insert(target, item);
    Ok(restamp(list))
}

fn restamp<T: Positioned>(mut list: Vec<T>) -> Vec<T> {
    for (index, item) in list.iter_mut().enumerate() {
        item.set_position(index);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        name: &'static str,
        position: usize,
    }

    impl Positioned for Slot {
        fn position(&self) -> usize {
            self.position
        }
        fn set_position(&mut self, position: usize) {
            self.position = position;
        }
    }

    fn slots(names: &[&'static str]) -> Vec<Slot> {
        names
            .iter()
            .enumerate()
            .map(|(position, name)| Slot {
                name: *name,
                position,
            })
            .collect()
    }

    fn names(list: &[Slot]) -> Vec<&'static str> {
        list.iter().map(|s| s.name).collect()
    }

    #[test]
    fn test_restamp_after_unsorted_input() {
        let list = vec![
            Slot { name: "c", position: 9 },
            Slot { name: "a", position: 2 },
            Slot { name: "b", position: 5 },
        ];
        let list = normalize(list);
        assert_eq!(names(&list), vec!["a", "b", "c"]);
        assert!(is_dense(&list));
    }

    #[test]
    fn test_reorder_leaves_input_on_error() {
        let list = slots(&["a", "b"]);
        assert!(reorder(list.clone(), 2, 0).is_err());
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[test]
    fn test_is_dense_detects_duplicates() {
        let list = vec![
            Slot { name: "a", position: 0 },
            Slot { name: "b", position: 0 },
        ];
        assert!(!is_dense(&list));
    }
}
