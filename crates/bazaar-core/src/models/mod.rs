//! Data models for Bazaar

mod comment;
mod favorite;
mod item;
mod user;

pub use comment::{Comment, CommentId};
pub use favorite::Favorite;
pub use item::{Item, ItemDraft};
pub use user::{CurrentUser, UserProfile};

/// An entity synchronized from a remote collection.
///
/// Identity is the id: two records with the same id but different fields
/// are two versions of one entity.
pub trait Record: Clone + Send + Sync + 'static {
    /// Unique identifier within its collection.
    fn id(&self) -> &str;

    /// Identifier of the user who owns this record.
    fn owner_id(&self) -> &str;
}
