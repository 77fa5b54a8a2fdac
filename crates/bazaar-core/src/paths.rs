//! Remote collection and storage paths.
//!
//! These strings are the wire-level table identifiers shared with the
//! backend. Changing any of them breaks compatibility with stored data.

use std::fmt;

/// Top-level collection holding every listed item.
pub const ITEMS_COLLECTION: &str = "items";
/// Top-level collection holding user profiles.
pub const USERS_COLLECTION: &str = "users";
/// Sub-collection of an item holding its comments.
pub const COMMENTS_COLLECTION: &str = "comments";
/// Sub-collection of a user holding favorited items.
pub const FAVORITES_COLLECTION: &str = "favorites";

const USER_PHOTOS_BUCKET: &str = "UserProfilePhotos";
const ITEM_PHOTOS_BUCKET: &str = "itemsPhotos";

/// Path of a remote document collection, e.g. `items/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// `items`
    #[must_use]
    pub fn items() -> Self {
        Self(ITEMS_COLLECTION.to_string())
    }

    /// `users`
    #[must_use]
    pub fn users() -> Self {
        Self(USERS_COLLECTION.to_string())
    }

    /// `items/{item_id}/comments`
    #[must_use]
    pub fn item_comments(item_id: &str) -> Self {
        Self(format!("{ITEMS_COLLECTION}/{item_id}/{COMMENTS_COLLECTION}"))
    }

    /// `users/{user_id}/favorites`
    #[must_use]
    pub fn user_favorites(user_id: &str) -> Self {
        Self(format!("{USERS_COLLECTION}/{user_id}/{FAVORITES_COLLECTION}"))
    }

    /// Raw path string as sent over the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an uploaded photo belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoTarget {
    /// Profile photo of a user.
    User(String),
    /// Listing photo of an item.
    Item(String),
}

impl PhotoTarget {
    /// Object-storage path for the photo, e.g. `itemsPhotos/{id}.jpg`.
    #[must_use]
    pub fn bucket_path(&self) -> String {
        match self {
            Self::User(user_id) => format!("{USER_PHOTOS_BUCKET}/{user_id}.jpg"),
            Self::Item(item_id) => format!("{ITEM_PHOTOS_BUCKET}/{item_id}.jpg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_paths_match_wire_contract() {
        assert_eq!(CollectionPath::items().as_str(), "items");
        assert_eq!(CollectionPath::users().as_str(), "users");
        assert_eq!(
            CollectionPath::item_comments("abc").as_str(),
            "items/abc/comments"
        );
        assert_eq!(
            CollectionPath::user_favorites("u1").to_string(),
            "users/u1/favorites"
        );
    }

    #[test]
    fn photo_targets_use_separate_buckets() {
        assert_eq!(
            PhotoTarget::User("u1".to_string()).bucket_path(),
            "UserProfilePhotos/u1.jpg"
        );
        assert_eq!(
            PhotoTarget::Item("i9".to_string()).bucket_path(),
            "itemsPhotos/i9.jpg"
        );
    }
}
