//! Short public identifiers for posts.

/// Eight lowercase hex digits from a uniformly random `u32`.
///
/// No collision check is made here; the store's unique constraint on
/// `unique_id` is the only guard.
pub fn generate_unique_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

/// Whether `value` has the shape produced by [`generate_unique_id`].
pub fn is_valid_unique_id(value: &str) -> bool {
    value.len() == 8 && value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}
