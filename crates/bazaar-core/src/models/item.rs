//! Item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decode::{
    f64_field, string_field, timestamp_field, wire_timestamp, RawRecord, RemoteDecode,
    RemoteEncode,
};

use super::Record;

pub(crate) const ITEM_NAME: &str = "itemName";
pub(crate) const PRICE: &str = "price";
pub(crate) const ITEM_ID: &str = "itemID";
pub(crate) const LISTED_DATE: &str = "listedDate";
pub(crate) const SELLER_NAME: &str = "sellerName";
pub(crate) const SELLER_ID: &str = "sellerID";
pub(crate) const CATEGORY_NAME: &str = "categoryName";
pub(crate) const IMAGE_URL: &str = "imageURL";

/// An item listed for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_name: String,
    pub price: f64,
    #[serde(rename = "itemID")]
    pub item_id: String,
    /// When the item was listed
    #[serde(with = "wire_timestamp")]
    pub listed_date: DateTime<Utc>,
    pub seller_name: String,
    #[serde(rename = "sellerID")]
    pub seller_id: String,
    pub category_name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// User input for listing a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub item_name: String,
    pub price: f64,
    pub category_name: String,
}

impl ItemDraft {
    pub fn new(item_name: impl Into<String>, price: f64, category_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            price,
            category_name: category_name.into(),
        }
    }
}

impl Record for Item {
    fn id(&self) -> &str {
        &self.item_id
    }

    fn owner_id(&self) -> &str {
        &self.seller_id
    }
}

impl RemoteDecode for Item {
    fn decode(raw: &RawRecord) -> Self {
        Self {
            item_name: string_field(raw, ITEM_NAME, "No item name"),
            price: f64_field(raw, PRICE, 0.0),
            item_id: string_field(raw, ITEM_ID, "No Item ID"),
            listed_date: timestamp_field(raw, LISTED_DATE),
            seller_name: string_field(raw, SELLER_NAME, "No seller name"),
            seller_id: string_field(raw, SELLER_ID, "No seller ID"),
            category_name: string_field(raw, CATEGORY_NAME, "No category name"),
            image_url: string_field(raw, IMAGE_URL, "No image URL"),
        }
    }
}

impl RemoteEncode for Item {}
