//! bazaar-core - Core library for Bazaar
//!
//! This crate keeps remote marketplace collections (items, comments,
//! favorites, profiles) in sync with local view models. The backend itself
//! is reached only through the [`remote::RemoteGateway`] contract.

pub mod authorization;
pub mod config;
pub mod decode;
pub mod error;
pub mod media;
pub mod models;
pub mod paths;
pub mod remote;
pub mod service;
pub mod subscription;
pub mod util;
pub mod viewmodel;

pub use authorization::can_mutate;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{Comment, CurrentUser, Favorite, Item, ItemDraft, Record, UserProfile};
pub use paths::{CollectionPath, PhotoTarget};
pub use remote::{Filter, MemoryGateway, RemoteError, RemoteErrorKind, RemoteGateway};
pub use service::MarketplaceService;
pub use subscription::SubscriptionManager;
pub use viewmodel::{CollectionViewModel, FavoriteToggle};

#[cfg(test)]
mod tests;
