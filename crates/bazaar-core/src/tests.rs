use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::sleep;

use crate::decode::RemoteDecode;
use crate::{
    ClientConfig, CollectionPath, CollectionViewModel, Comment, CurrentUser, Error, Favorite,
    FavoriteToggle, Item, ItemDraft, MarketplaceService, MemoryGateway, Record,
};

fn marketplace() -> (MemoryGateway, MarketplaceService) {
    let gateway = MemoryGateway::default();
    let service = MarketplaceService::new(Arc::new(gateway.clone()), ClientConfig::default());
    (gateway, service)
}

fn seller() -> CurrentUser {
    CurrentUser::new("seller-1").with_display_name("Sam")
}

fn buyer() -> CurrentUser {
    CurrentUser::new("buyer-1").with_display_name("Bea")
}

async fn settle<T: Record + RemoteDecode>(
    view: &CollectionViewModel<T>,
    predicate: impl Fn(&CollectionViewModel<T>) -> bool,
) {
    for _ in 0..200 {
        if predicate(view) {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("view model did not settle");
}

#[tokio::test]
async fn listing_feed_follows_remote_changes() {
    let (_gateway, service) = marketplace();
    let mut feed = CollectionViewModel::<Item>::new(CollectionPath::items(), service.clone());
    feed.appear();
    settle(&feed, |view| view.revision() >= 1).await;
    assert!(feed.is_empty());

    let lamp = service
        .create_item(&seller(), ItemDraft::new("Lamp", 12.5, "Home"))
        .await
        .unwrap();
    settle(&feed, |view| view.len() == 1).await;

    let listed = feed.record_at(0).unwrap();
    assert_eq!(listed.item_id, lamp.item_id);
    assert_eq!(listed.seller_name, "Sam");
    assert!(feed.can_mutate(0, "seller-1").unwrap());
    assert!(!feed.can_mutate(0, "buyer-1").unwrap());

    let denied = feed.request_delete(0, "buyer-1").await.unwrap_err();
    assert!(matches!(denied, Error::Unauthorized { .. }));
    assert_eq!(feed.len(), 1);

    feed.request_delete(0, "seller-1").await.unwrap();
    settle(&feed, CollectionViewModel::is_empty).await;
    feed.disappear();
}

#[tokio::test]
async fn favoriting_shows_up_in_buyers_favorites() {
    let (_gateway, service) = marketplace();
    let item = service
        .create_item(&seller(), ItemDraft::new("Chair", 40.0, "Home"))
        .await
        .unwrap();

    let feed = CollectionViewModel::<Item>::new(CollectionPath::items(), service.clone());
    feed.set_records(vec![item.clone()]);

    let mut favorites = CollectionViewModel::<Favorite>::new(
        CollectionPath::user_favorites("buyer-1"),
        service.clone(),
    );
    favorites.appear();
    settle(&favorites, |view| view.revision() >= 1).await;

    assert_eq!(
        feed.request_toggle_favorite(0, "buyer-1").await.unwrap(),
        FavoriteToggle::Added
    );
    settle(&favorites, |view| view.len() == 1).await;
    let favorite = favorites.record_at(0).unwrap();
    assert_eq!(favorite.item_id, item.item_id);
    assert_eq!(favorite.favorited_by_id, "buyer-1");
    assert!(favorites.can_mutate(0, "buyer-1").unwrap());

    assert_eq!(
        feed.request_toggle_favorite(0, "buyer-1").await.unwrap(),
        FavoriteToggle::Removed
    );
    settle(&favorites, CollectionViewModel::is_empty).await;
}

#[tokio::test]
async fn comment_thread_switches_between_items() {
    let (gateway, service) = marketplace();
    let first = service
        .create_item(&seller(), ItemDraft::new("Desk", 80.0, "Office"))
        .await
        .unwrap();
    let second = service
        .create_item(&seller(), ItemDraft::new("Mug", 4.0, "Kitchen"))
        .await
        .unwrap();
    service
        .post_comment(&buyer(), &first, "Still available?")
        .await
        .unwrap();

    let first_path = CollectionPath::item_comments(&first.item_id);
    let second_path = CollectionPath::item_comments(&second.item_id);

    let mut thread = CollectionViewModel::<Comment>::new(first_path.clone(), service.clone());
    thread.appear();
    settle(&thread, |view| view.len() == 1).await;
    assert_eq!(thread.record_at(0).unwrap().text, "Still available?");
    assert!(!thread.can_mutate(0, "seller-1").unwrap());

    thread.disappear();
    let mut thread = CollectionViewModel::<Comment>::new(second_path.clone(), service.clone());
    thread.appear();
    settle(&thread, |view| view.revision() >= 1).await;
    assert!(thread.is_empty());
    assert_eq!(gateway.listener_count(&first_path), 0);
    assert_eq!(gateway.listener_count(&second_path), 1);
}
