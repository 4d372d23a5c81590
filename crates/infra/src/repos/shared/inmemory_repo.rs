use super::repo::{DeleteResult, UpdateResult};
use std::sync::{Mutex, MutexGuard};

/// Useful functions for creating inmemory repositories

fn lock<T>(collection: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    // Every mutation below is a single push, remove or closure call,
    // so a poisoned vec is still consistent
    collection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Inserts `val` unless an existing item satisfies `conflicts`.
/// Returns whether the item was inserted.
pub fn insert_unique<T, F: Fn(&T) -> bool>(
    val: T,
    collection: &Mutex<Vec<T>>,
    conflicts: F,
) -> bool {
    let mut collection = lock(collection);
    if collection.iter().any(conflicts) {
        return false;
    }
    collection.push(val);
    true
}

pub fn find_one_by<T: Clone, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> Option<T> {
    let collection = lock(collection);
    collection.iter().find(|item| compare(item)).cloned()
}

/// Applies `update` to the first item matching `compare`
pub fn update_one_by<T, F: Fn(&T) -> bool, U: FnOnce(&mut T)>(
    collection: &Mutex<Vec<T>>,
    compare: F,
    update: U,
) -> UpdateResult {
    let mut collection = lock(collection);
    match collection.iter_mut().find(|item| compare(item)) {
        Some(item) => {
            update(item);
            UpdateResult { modified_count: 1 }
        }
        None => UpdateResult { modified_count: 0 },
    }
}

pub fn delete_one_by<T, F: Fn(&T) -> bool>(collection: &Mutex<Vec<T>>, compare: F) -> DeleteResult {
    let mut collection = lock(collection);
    match collection.iter().position(compare) {
        Some(index) => {
            collection.remove(index);
            DeleteResult { deleted_count: 1 }
        }
        None => DeleteResult { deleted_count: 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_refuses_conflicting_insert() {
        let collection = Mutex::new(vec![]);
        assert!(insert_unique(1, &collection, |i| *i == 1));
        assert!(!insert_unique(1, &collection, |i| *i == 1));
        assert!(insert_unique(2, &collection, |i| *i == 2));
        assert_eq!(lock(&collection).len(), 2);
    }

    #[test]
    fn it_updates_and_deletes_only_first_match() {
        let collection = Mutex::new(vec![1, 2, 2]);

        let res = update_one_by(&collection, |i| *i == 2, |i| *i = 3);
        assert_eq!(res.modified_count, 1);
        assert_eq!(*lock(&collection), vec![1, 3, 2]);

        let res = update_one_by(&collection, |i| *i == 5, |i| *i = 3);
        assert_eq!(res.modified_count, 0);

        assert_eq!(delete_one_by(&collection, |i| *i == 1).deleted_count, 1);
        assert_eq!(delete_one_by(&collection, |i| *i == 1).deleted_count, 0);
        assert_eq!(find_one_by(&collection, |i| *i == 2), Some(2));
    }
}
