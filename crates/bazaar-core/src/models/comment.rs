//! Comment model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decode::{
    string_field, timestamp_field, wire_timestamp, RawRecord, RemoteDecode, RemoteEncode,
};

use super::Record;

const COMMENT_ID: &str = "commentID";
const COMMENT_DATE: &str = "commentDate";
const COMMENTED_BY: &str = "commentedBy";
const COMMENTED_BY_ID: &str = "commentedByID";
const ITEM_ID: &str = "itemID";
const ITEM_NAME: &str = "itemName";
const SELLER_NAME: &str = "sellerName";
const TEXT: &str = "text";

/// A unique identifier for a new comment, using UUID v7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentId(Uuid);

impl CommentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CommentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment left on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "commentID")]
    pub comment_id: String,
    #[serde(with = "wire_timestamp")]
    pub comment_date: DateTime<Utc>,
    /// Display name of the author
    pub commented_by: String,
    /// User id of the author
    #[serde(rename = "commentedByID")]
    pub commented_by_id: String,
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub item_name: String,
    pub seller_name: String,
    pub text: String,
}

impl Record for Comment {
    fn id(&self) -> &str {
        &self.comment_id
    }

    fn owner_id(&self) -> &str {
        &self.commented_by_id
    }
}

impl RemoteDecode for Comment {
    fn decode(raw: &RawRecord) -> Self {
        Self {
            comment_id: string_field(raw, COMMENT_ID, "no comment id"),
            comment_date: timestamp_field(raw, COMMENT_DATE),
            commented_by: string_field(raw, COMMENTED_BY, "no commentBy name"),
            commented_by_id: string_field(raw, COMMENTED_BY_ID, "no commentBy id"),
            item_id: string_field(raw, ITEM_ID, "no item id"),
            item_name: string_field(raw, ITEM_NAME, "no item name"),
            seller_name: string_field(raw, SELLER_NAME, "no seller name"),
            text: string_field(raw, TEXT, "no text"),
        }
    }
}

impl RemoteEncode for Comment {}
