//! Role names carried in access-token claims.

/// Full access: schedules, generation, session edits, bulk actions.
pub const ROLE_ADMIN: &str = "admin";

/// May read sessions and mark attendance.
pub const ROLE_TEACHER: &str = "teacher";
