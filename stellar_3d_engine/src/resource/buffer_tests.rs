//! Unit tests for buffer.rs

use crate::device::{BufferTarget, BufferUsage};
use crate::resource::buffer::BufferRecord;

#[test]
fn test_new_record_starts_with_one_reference() {
    let record = BufferRecord::new(BufferTarget::Array, BufferUsage::Static, 256);
    assert_eq!(record.references, 1);
    assert_eq!(record.capacity, 256);
    assert!(!record.wide_indices);
    assert!(record.device_buffer.is_none());
    assert!(record.retained.is_none());
}

#[test]
fn test_record_fields() {
    let mut record = BufferRecord::new(BufferTarget::ElementArray, BufferUsage::Dynamic, 1024);
    record.wide_indices = true;
    record.retained = Some(vec![1, 2, 3]);

    assert_eq!(record.target, BufferTarget::ElementArray);
    assert_eq!(record.usage, BufferUsage::Dynamic);
    assert!(record.wide_indices);
    assert_eq!(record.retained.as_deref(), Some(&[1u8, 2, 3][..]));
}
