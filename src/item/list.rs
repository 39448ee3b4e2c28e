use std::cell::Cell;

use crate::{
    BatchError,
    core::item::{ItemReader, ItemReaderResult},
};

/// Reads items from an in-memory list, in order.
///
/// Opening the reader rewinds it, so a step reads the whole list again on
/// every execution.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::core::item::ItemReader;
/// use spring_batch_tutorial::item::list::ListItemReader;
///
/// let reader = ListItemReader::new(vec!["0 hello", "1 hello"]);
///
/// assert_eq!(reader.read().unwrap(), Some("0 hello"));
/// assert_eq!(reader.read().unwrap(), Some("1 hello"));
/// assert_eq!(reader.read().unwrap(), None);
///
/// reader.open().unwrap();
/// assert_eq!(reader.read().unwrap(), Some("0 hello"));
/// ```
pub struct ListItemReader<T> {
    items: Vec<T>,
    position: Cell<usize>,
}

impl<T> ListItemReader<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            position: Cell::new(0),
        }
    }

    /// Number of items not read yet.
    pub fn remaining(&self) -> usize {
        self.items.len() - self.position.get()
    }
}

impl<T: Clone> ItemReader<T> for ListItemReader<T> {
    fn read(&self) -> ItemReaderResult<T> {
        let item = self.items.get(self.position.get()).cloned();
        if item.is_some() {
            self.position.set(self.position.get() + 1);
        }
        Ok(item)
    }

    fn open(&self) -> Result<(), BatchError> {
        self.position.set(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(reader: &ListItemReader<i32>) -> Vec<i32> {
        let mut read = Vec::new();
        while let Some(item) = reader.read().unwrap() {
            read.push(item);
        }
        read
    }

    #[test]
    fn reader_is_exhausted_after_one_pass() {
        let reader = ListItemReader::new((1..=3).collect::<Vec<i32>>());

        assert_eq!(read_all(&reader), vec![1, 2, 3]);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn open_rewinds_the_list() {
        let reader = ListItemReader::new(vec![1, 2, 3]);
        read_all(&reader);

        reader.open().unwrap();

        assert_eq!(reader.remaining(), 3);
        assert_eq!(read_all(&reader), vec![1, 2, 3]);
    }
}
