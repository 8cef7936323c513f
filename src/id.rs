//! Identifier generation for tasks, subtasks, lookup records and team members.

use ulid::Ulid;

/// Produce a fresh, lowercase, time-ordered identifier.
pub fn generate_id() -> String {
    Ulid::new().to_string().to_ascii_lowercase()
}
