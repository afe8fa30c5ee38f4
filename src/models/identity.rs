/// Records that carry a collection-unique integer identifier
pub trait Identified {
    fn id(&self) -> u64;
}

/// Compute the next identifier for a collection.
///
/// Returns 1 for an empty collection, otherwise the highest id plus one, so an
/// id that is still present is never handed out again. Gaps left by deleted
/// records below the maximum are not reused either. Returns `None` once the
/// highest id is `u64::MAX`.
pub fn next_id<T: Identified>(collection: &[T]) -> Option<u64> {
    match collection.iter().map(Identified::id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record(u64);

    impl Identified for Record {
        fn id(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_empty_collection_starts_at_one() {
        let empty: Vec<Record> = Vec::new();
        assert_eq!(next_id(&empty), Some(1));
    }

    #[test]
    fn test_uses_maximum_not_length() {
        let records = vec![Record(3), Record(10), Record(7)];
        assert_eq!(next_id(&records), Some(11));
    }

    #[test]
    fn test_does_not_reuse_after_gap() {
        let records = vec![Record(3)];
        assert_eq!(next_id(&records), Some(4));
    }

    #[test]
    fn test_exhausted_at_u64_max() {
        assert_eq!(next_id(&[Record(u64::MAX - 1)]), Some(u64::MAX));
        assert_eq!(next_id(&[Record(5), Record(u64::MAX)]), None);
    }
}
