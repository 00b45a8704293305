//! Copy-on-write helpers over [`List`] and the macros that expose them as
//! add/update/remove/move methods on the owning record.

use std::sync::Arc;

use crate::error::ModelError;
use crate::model::List;

fn check(collection: &'static str, index: usize, len: usize) -> Result<(), ModelError> {
    if index < len {
        Ok(())
    } else {
        Err(ModelError::IndexOutOfRange {
            collection,
            index,
            len,
        })
    }
}

pub(crate) fn pushed<T: Clone>(list: &List<T>, item: T) -> List<T> {
    let mut items = Vec::with_capacity(list.len() + 1);
    items.extend(list.iter().cloned());
    items.push(item);
    Arc::new(items)
}

pub(crate) fn inserted<T: Clone>(list: &List<T>, index: usize, item: T) -> List<T> {
    let mut items = (**list).clone();
    items.insert(index.min(items.len()), item);
    Arc::new(items)
}

pub(crate) fn updated<T: Clone>(
    list: &List<T>,
    collection: &'static str,
    index: usize,
    f: impl FnOnce(&T) -> T,
) -> Result<List<T>, ModelError> {
    check(collection, index, list.len())?;
    let mut items = (**list).clone();
    items[index] = f(&list[index]);
    Ok(Arc::new(items))
}

pub(crate) fn removed<T: Clone>(
    list: &List<T>,
    collection: &'static str,
    index: usize,
) -> Result<List<T>, ModelError> {
    check(collection, index, list.len())?;
    let mut items = (**list).clone();
    items.remove(index);
    Ok(Arc::new(items))
}

pub(crate) fn moved<T: Clone>(
    list: &List<T>,
    collection: &'static str,
    from: usize,
    to: usize,
) -> Result<List<T>, ModelError> {
    check(collection, from, list.len())?;
    check(collection, to, list.len())?;
    let mut items = (**list).clone();
    let item = items.remove(from);
    items.insert(to, item);
    Ok(Arc::new(items))
}

/// A fresh allocation holding copies of every element.
pub(crate) fn deep_copy<T: Clone>(list: &List<T>) -> List<T> {
    Arc::new((**list).clone())
}

/// Generates `add`, `remove` and `move` methods for a list field.
macro_rules! list_ops {
    ($field:ident: $ty:ty, $add:ident, $remove:ident, $move:ident) => {
        #[doc = concat!("Append an entry to `", stringify!($field), "`.")]
        pub fn $add(&self, item: $ty) -> Self {
            Self {
                $field: $crate::list::pushed(&self.$field, item),
                ..self.clone()
            }
        }

        #[doc = concat!("Remove the entry at `index` from `", stringify!($field), "`.")]
        pub fn $remove(&self, index: usize) -> Result<Self, $crate::ModelError> {
            Ok(Self {
                $field: $crate::list::removed(&self.$field, stringify!($field), index)?,
                ..self.clone()
            })
        }

        #[doc = concat!("Move an entry of `", stringify!($field), "` from one position to another.")]
        pub fn $move(&self, from: usize, to: usize) -> Result<Self, $crate::ModelError> {
            Ok(Self {
                $field: $crate::list::moved(&self.$field, stringify!($field), from, to)?,
                ..self.clone()
            })
        }
    };
}

/// Generates an `update` method replacing one entry of a list field.
macro_rules! list_update {
    ($field:ident: $ty:ty, $update:ident) => {
        #[doc = concat!("Replace the entry at `index` in `", stringify!($field), "` with `f(entry)`.")]
        pub fn $update(
            &self,
            index: usize,
            f: impl FnOnce(&$ty) -> $ty,
        ) -> Result<Self, $crate::ModelError> {
            Ok(Self {
                $field: $crate::list::updated(&self.$field, stringify!($field), index, f)?,
                ..self.clone()
            })
        }
    };
}

pub(crate) use list_ops;
pub(crate) use list_update;
