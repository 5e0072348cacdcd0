use uuid::Uuid;

/// Length of generated paste identifiers.
pub const ID_LENGTH: usize = 8;

/// Generate a short random paste id: a v4 UUID in simple form, truncated.
///
/// Collisions are unlikely at this length but not impossible; the caller is
/// expected to retry when an insert hits the primary key.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LENGTH);
    id
}
