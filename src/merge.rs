//! K-way merge of pre-sorted sequences with cross-list duplicate pruning.

use std::cmp::Ordering;

/// Merges an arbitrary number of pre-sorted lists into the first list,
/// possibly pruning out duplicates, and returns it.
///
/// Inputs must be sorted ascending per `cmp_fn` and internally
/// duplicate-free; violating that contract produces unspecified output (it
/// is not a checked error). When `dup_fn` reports two head elements from
/// different lists equivalent, the non-selected duplicate is discarded. Ties
/// between equal-comparing heads with no duplicate match are stable: the
/// lowest-indexed list wins.
///
/// # Examples
///
/// ```rust
/// use geocell::merge::merge_in_place;
///
/// let merged = merge_in_place(
///     vec![vec![1, 4, 7], vec![2, 4, 6]],
///     |a, b| a.cmp(b),
///     Some(|a: &i32, b: &i32| a == b),
/// );
/// assert_eq!(merged, vec![1, 2, 4, 6, 7]);
/// ```
pub fn merge_in_place<T, C, D>(mut lists: Vec<Vec<T>>, cmp_fn: C, dup_fn: Option<D>) -> Vec<T>
where
    C: Fn(&T, &T) -> Ordering,
    D: Fn(&T, &T) -> bool,
{
    if lists.is_empty() {
        return Vec::new();
    }

    // Non-first lists are reversed once so their heads can be peeked with
    // last() and consumed with pop() without shifting.
    for list in lists.iter_mut().skip(1) {
        list.reverse();
    }

    // Cursor into the first list; elements before it are already merged.
    let mut first_pos = 0usize;
    let mut remaining: usize = lists.iter().map(Vec::len).sum();

    while remaining > 0 {
        // Index of the list holding the lowest head seen this round.
        let mut pull_index: Option<usize> = None;

        for i in 0..lists.len() {
            let head_exists = if i == 0 {
                first_pos < lists[0].len()
            } else {
                !lists[i].is_empty()
            };
            if !head_exists {
                continue;
            }

            if let Some(pull) = pull_index {
                let pull_val = if pull == 0 {
                    &lists[0][first_pos]
                } else {
                    lists[pull].last().unwrap()
                };
                let head = if i == 0 {
                    &lists[0][first_pos]
                } else {
                    lists[i].last().unwrap()
                };

                if dup_fn.as_ref().is_some_and(|dup| dup(head, pull_val)) {
                    // Duplicate of the current candidate; drop it.
                    let _ = lists[i].pop();
                    remaining -= 1;
                    continue;
                }
                if cmp_fn(head, pull_val) == Ordering::Less {
                    pull_index = Some(i);
                }
            } else {
                pull_index = Some(i);
            }
        }

        // remaining > 0 guarantees some head survived the scan.
        let pull = pull_index.unwrap();
        if pull == 0 {
            first_pos += 1;
        } else {
            let value = lists[pull].pop().unwrap();
            lists[0].insert(first_pos, value);
            first_pos += 1;
        }
        remaining -= 1;
    }

    lists.swap_remove(0)
}
