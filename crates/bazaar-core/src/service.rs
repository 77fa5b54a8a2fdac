//! Marketplace operations over the remote store.
//!
//! Builds domain writes (listing, commenting, favoriting, profiles, photos)
//! on top of [`RemoteGateway`]. The acting user is always passed in; nothing
//! here reads ambient session state.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::authorization::can_mutate;
use crate::config::ClientConfig;
use crate::decode::{decode_snapshot, RawRecord, RemoteDecode, RemoteEncode};
use crate::media::{resize_for_upload, ResizeOptions, JPEG_CONTENT_TYPE};
use crate::models::{
    Comment, CommentId, CurrentUser, Favorite, Item, ItemDraft, Record, UserProfile,
};
use crate::paths::{CollectionPath, PhotoTarget};
use crate::remote::{Filter, RemoteGateway};
use crate::util::required_text;
use crate::{Error, Result};

const ITEM_ID: &str = "itemID";
const ITEM_IMAGE_URL: &str = "imageURL";
const ITEM_SELLER_ID: &str = "sellerID";
const USER_DISPLAY_NAME: &str = "displayName";
const USER_PHOTO_URL: &str = "photoURL";

/// Shared, cheaply clonable handle for marketplace operations.
#[derive(Clone)]
pub struct MarketplaceService {
    gateway: Arc<dyn RemoteGateway>,
    config: ClientConfig,
}

impl MarketplaceService {
    pub fn new(gateway: Arc<dyn RemoteGateway>, config: ClientConfig) -> Self {
        Self { gateway, config }
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> Arc<dyn RemoteGateway> {
        Arc::clone(&self.gateway)
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List a new item for sale under `seller`'s name.
    ///
    /// The item has no photo yet; see [`Self::upload_photo`].
    pub async fn create_item(&self, seller: &CurrentUser, draft: ItemDraft) -> Result<Item> {
        let item_name = required_text(&draft.item_name, "Item name")?;
        let category_name = required_text(&draft.category_name, "Category")?;
        if !draft.price.is_finite() || draft.price < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Price must be a non-negative number, got {}",
                draft.price
            )));
        }
        let seller_name = seller.display_name.clone().ok_or_else(|| {
            Error::IncompleteProfile("a display name is required to list items".to_string())
        })?;

        let item = Item {
            item_name,
            price: draft.price,
            item_id: String::new(),
            listed_date: Utc::now(),
            seller_name,
            seller_id: seller.id.clone(),
            category_name,
            image_url: String::new(),
        };
        let mut fields = item.encode()?;
        fields.remove(ITEM_ID);
        fields.remove(ITEM_IMAGE_URL);

        let item_id = self
            .gateway
            .create(&CollectionPath::items(), ITEM_ID, fields.clone())
            .await?;
        fields.insert(ITEM_ID.to_string(), Value::from(item_id.clone()));
        tracing::info!("Listed item {} for seller {}", item_id, seller.id);
        Ok(Item::decode(&fields))
    }

    /// Post a comment by `author` on `item`.
    pub async fn post_comment(
        &self,
        author: &CurrentUser,
        item: &Item,
        text: &str,
    ) -> Result<Comment> {
        let text = required_text(text, "Comment")?;
        let commented_by = author.display_name.clone().ok_or_else(|| {
            Error::IncompleteProfile("a display name is required to comment".to_string())
        })?;

        let comment = Comment {
            comment_id: CommentId::new().to_string(),
            comment_date: Utc::now(),
            commented_by,
            commented_by_id: author.id.clone(),
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            seller_name: item.seller_name.clone(),
            text,
        };
        self.gateway
            .set(
                &CollectionPath::item_comments(&item.item_id),
                &comment.comment_id,
                comment.encode()?,
            )
            .await?;
        Ok(comment)
    }

    /// Delete a listing. Only its seller may do so.
    pub async fn delete_item(&self, user: &CurrentUser, item: &Item) -> Result<()> {
        self.delete_owned(&CollectionPath::items(), user, item).await
    }

    /// Delete a comment. Only its author may do so.
    pub async fn delete_comment(&self, user: &CurrentUser, comment: &Comment) -> Result<()> {
        self.delete_owned(&CollectionPath::item_comments(&comment.item_id), user, comment)
            .await
    }

    async fn delete_owned<R: Record>(
        &self,
        path: &CollectionPath,
        user: &CurrentUser,
        record: &R,
    ) -> Result<()> {
        if !can_mutate(record, &user.id) {
            return Err(Error::Unauthorized {
                record_id: record.id().to_string(),
            });
        }
        self.gateway.delete(path, record.id()).await?;
        tracing::info!("Deleted {} from {}", record.id(), path);
        Ok(())
    }

    /// Every item listed by `seller_id`, ordered by item id.
    pub async fn fetch_user_items(&self, seller_id: &str) -> Result<Vec<Item>> {
        let records = self
            .gateway
            .query(
                &CollectionPath::items(),
                &Filter::field_equals(ITEM_SELLER_ID, seller_id),
            )
            .await?;
        Ok(decode_snapshot(&records))
    }

    /// Whether `user_id` has favorited `item_id`.
    pub async fn is_favorite(&self, user_id: &str, item_id: &str) -> Result<bool> {
        let existing = self
            .gateway
            .get(&CollectionPath::user_favorites(user_id), item_id)
            .await?;
        Ok(existing.is_some())
    }

    /// Record `item` as a favorite of `user_id`.
    pub async fn add_favorite(&self, user_id: &str, item: &Item) -> Result<Favorite> {
        let favorite = Favorite::of_item(item, user_id);
        self.gateway
            .set(
                &CollectionPath::user_favorites(user_id),
                &favorite.item_id,
                favorite.encode()?,
            )
            .await?;
        Ok(favorite)
    }

    /// Remove `item_id` from `user_id`'s favorites.
    pub async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<()> {
        self.gateway
            .delete(&CollectionPath::user_favorites(user_id), item_id)
            .await?;
        Ok(())
    }

    /// Write the profile document for a newly registered user.
    pub async fn create_user_profile(&self, user: &CurrentUser) -> Result<UserProfile> {
        let email = user
            .email
            .clone()
            .ok_or_else(|| Error::IncompleteProfile("an email address is required".to_string()))?;
        let profile = UserProfile {
            user_id: user.id.clone(),
            display_name: user.display_name.clone().unwrap_or_default(),
            email,
            photo_url: String::new(),
        };
        self.gateway
            .set(&CollectionPath::users(), &profile.user_id, profile.encode()?)
            .await?;
        Ok(profile)
    }

    /// Profile document of `user_id`, if one exists.
    pub async fn fetch_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let record = self.gateway.get(&CollectionPath::users(), user_id).await?;
        Ok(record.as_ref().map(UserProfile::decode))
    }

    /// Change the display name stored in `user`'s profile.
    pub async fn update_display_name(&self, user: &CurrentUser, display_name: &str) -> Result<()> {
        let display_name = required_text(display_name, "Display name")?;
        let mut fields = RawRecord::new();
        fields.insert(USER_DISPLAY_NAME.to_string(), Value::from(display_name));
        self.gateway
            .update(&CollectionPath::users(), &user.id, fields)
            .await?;
        Ok(())
    }

    /// Resize and upload a photo, then point the owning document at it.
    ///
    /// Returns the download URL.
    pub async fn upload_photo(&self, target: PhotoTarget, source_bytes: &[u8]) -> Result<String> {
        let resized = resize_for_upload(source_bytes, ResizeOptions::from_config(&self.config))?;
        tracing::debug!(
            "Uploading {}x{} photo ({} bytes) to {}",
            resized.width,
            resized.height,
            resized.bytes.len(),
            target.bucket_path()
        );

        let url = self
            .gateway
            .upload_blob(&target.bucket_path(), resized.bytes, JPEG_CONTENT_TYPE)
            .await?;

        let (path, id, field) = match &target {
            PhotoTarget::Item(item_id) => (CollectionPath::items(), item_id, ITEM_IMAGE_URL),
            PhotoTarget::User(user_id) => (CollectionPath::users(), user_id, USER_PHOTO_URL),
        };
        let mut fields = RawRecord::new();
        fields.insert(field.to_string(), Value::from(url.clone()));
        self.gateway.update(&path, id, fields).await?;

        Ok(url)
    }
}
