use std::mem;
use std::sync::Arc;

/// The number of bytes a value is charged against a cache's byte budget.
///
/// The cache calls this exactly once per insert and remembers the result, so
/// the estimate must depend only on the value's content. It should cover the
/// heap memory the value keeps alive, not just `size_of::<Self>()`.
pub trait ObjectSize {
  fn size_in_bytes(&self) -> u64;
}

impl ObjectSize for Vec<u8> {
  fn size_in_bytes(&self) -> u64 {
    (mem::size_of::<Self>() + self.len()) as u64
  }
}

impl ObjectSize for [u8] {
  fn size_in_bytes(&self) -> u64 {
    self.len() as u64
  }
}

impl ObjectSize for String {
  fn size_in_bytes(&self) -> u64 {
    (mem::size_of::<Self>() + self.len()) as u64
  }
}

impl ObjectSize for str {
  fn size_in_bytes(&self) -> u64 {
    self.len() as u64
  }
}

impl<T: ObjectSize + ?Sized> ObjectSize for Arc<T> {
  fn size_in_bytes(&self) -> u64 {
    (**self).size_in_bytes()
  }
}

impl<T: ObjectSize + ?Sized> ObjectSize for Box<T> {
  fn size_in_bytes(&self) -> u64 {
    (**self).size_in_bytes()
  }
}
