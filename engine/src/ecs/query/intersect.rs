//! Sorted-merge intersection of entity lists.

use crate::ecs::Entity;

/// Entities present in both ascending lists, ascending.
pub fn sorted_intersection(left: &[Entity], right: &[Entity]) -> Vec<Entity> {
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Entities present in every ascending list, ascending. No lists yields no entities.
///
/// Lists are folded smallest first so intermediate results stay as small as possible.
pub fn intersect_all(lists: &mut [&[Entity]]) -> Vec<Entity> {
    lists.sort_by_key(|list| list.len());
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    let mut result = first.to_vec();
    for list in rest {
        if result.is_empty() {
            break;
        }
        result = sorted_intersection(&result, list);
    }
    result
}
