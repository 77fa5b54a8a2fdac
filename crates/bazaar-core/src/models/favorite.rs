//! Favorite model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decode::{
    f64_field, string_field, timestamp_field, wire_timestamp, RawRecord, RemoteDecode,
    RemoteEncode,
};

use super::item::{IMAGE_URL, ITEM_ID, ITEM_NAME, PRICE, SELLER_ID, SELLER_NAME};
use super::{Item, Record};

const FAVORITED_DATE: &str = "favoritedDate";
const FAVORITED_BY_ID: &str = "favoritedByID";

/// An item a user marked as favorite, stored under `users/{id}/favorites`
/// with the item id as document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub item_name: String,
    pub price: f64,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub seller_name: String,
    #[serde(rename = "sellerID")]
    pub seller_id: String,
    #[serde(with = "wire_timestamp")]
    pub favorited_date: DateTime<Utc>,
    #[serde(rename = "favoritedByID")]
    pub favorited_by_id: String,
}

impl Favorite {
    /// Snapshot the listing fields of `item` as a favorite of `user_id`.
    #[must_use]
    pub fn of_item(item: &Item, user_id: &str) -> Self {
        Self {
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            seller_name: item.seller_name.clone(),
            seller_id: item.seller_id.clone(),
            favorited_date: Utc::now(),
            favorited_by_id: user_id.to_string(),
        }
    }
}

impl Record for Favorite {
    fn id(&self) -> &str {
        &self.item_id
    }

    fn owner_id(&self) -> &str {
        &self.favorited_by_id
    }
}

impl RemoteDecode for Favorite {
    fn decode(raw: &RawRecord) -> Self {
        Self {
            item_id: string_field(raw, ITEM_ID, "No Item ID"),
            item_name: string_field(raw, ITEM_NAME, "No item name"),
            price: f64_field(raw, PRICE, 0.0),
            image_url: string_field(raw, IMAGE_URL, "No image URL"),
            seller_name: string_field(raw, SELLER_NAME, "No seller name"),
            seller_id: string_field(raw, SELLER_ID, "No seller ID"),
            favorited_date: timestamp_field(raw, FAVORITED_DATE),
            favorited_by_id: string_field(raw, FAVORITED_BY_ID, "No user ID"),
        }
    }
}

impl RemoteEncode for Favorite {}
