use crate::error::DataError;

/// A collection of items accessible by index.
pub trait Dataset {
    /// The type of a single item returned by the dataset.
    type Item: Send + 'static;

    /// Returns the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] if `index >= len()`.
    fn get(&self, index: usize) -> Result<Self::Item, DataError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
