//! Derived, client-side authorization.
//!
//! Only gates what the UI offers. The remote store's own rules remain the
//! authority on who may write what.

use crate::models::Record;

/// Whether `current_user_id` may modify or delete `record`.
pub fn can_mutate<R: Record>(record: &R, current_user_id: &str) -> bool {
    record.owner_id() == current_user_id
}
