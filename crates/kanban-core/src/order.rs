//! Ordered-sequence helpers shared by list and card reordering

/// Move the element at `from` to `to`, keeping every other element's
/// relative order
///
/// `to` is clamped to the last position. Returns false (and leaves `items`
/// untouched) when `from` is out of range or equals the effective target.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let to = to.min(items.len() - 1);
    if from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Insert at `index`, treating anything past the end as an append
pub fn insert_clamped<T>(items: &mut Vec<T>, index: usize, item: T) {
    let index = index.min(items.len());
    items.insert(index, item);
}
