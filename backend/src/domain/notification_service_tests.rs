//! Tests for the notification service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockNotificationRepository, MockUserRepository, RepositoryError};

fn service(
    notifications: MockNotificationRepository,
    users: MockUserRepository,
) -> NotificationService {
    NotificationService::new(
        Arc::new(notifications),
        Arc::new(users),
        Arc::new(DefaultClock),
    )
}

#[fixture]
fn user_ctx() -> RequestContext {
    RequestContext::new(UserId::random(), Role::User)
}

#[rstest]
#[tokio::test]
async fn mark_read_of_foreign_notification_is_not_found(user_ctx: RequestContext) {
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_mark_read()
        .times(1)
        .returning(|_, _| Ok(false));
    let err = service(notifications, MockUserRepository::new())
        .mark_read(&user_ctx, NotificationId::random())
        .await
        .expect_err("foreign notification");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn list_clamps_limit(user_ctx: RequestContext) {
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_list()
        .withf(|_, unread_only, limit| *unread_only && *limit == MAX_LIST_LIMIT)
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));
    let listed = service(notifications, MockUserRepository::new())
        .list(&user_ctx, true, Some(10_000))
        .await
        .expect("list succeeds");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn broadcast_requires_admin(user_ctx: RequestContext) {
    let err = service(MockNotificationRepository::new(), MockUserRepository::new())
        .broadcast(&user_ctx, NotificationKind::Announcement, "Hi", "All")
        .await
        .expect_err("users cannot broadcast");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn broadcast_reaches_every_user() {
    let recipients = vec![UserId::random(), UserId::random(), UserId::random()];
    let expected = recipients.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_list_ids()
        .times(1)
        .return_once(move || Ok(recipients));
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_insert_many()
        .withf(move |batch| {
            batch.iter().map(|n| n.user_id).collect::<Vec<_>>() == expected
                && batch.iter().all(|n| n.kind == NotificationKind::Announcement)
        })
        .times(1)
        .returning(|_| Ok(()));
    let admin = RequestContext::new(UserId::random(), Role::Admin);
    let sent = service(notifications, users)
        .broadcast(&admin, NotificationKind::Announcement, "Doors open", "Welcome")
        .await
        .expect("broadcast succeeds");
    assert_eq!(sent, 3);
}

#[rstest]
#[tokio::test]
async fn notify_after_commit_swallows_storage_errors() {
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_insert_many()
        .times(1)
        .returning(|_| Err(RepositoryError::connection("down")));
    service(notifications, MockUserRepository::new())
        .notify_after_commit(UserId::random(), NotificationKind::PointsAwarded, "Points", "+5")
        .await;
}

#[rstest]
#[tokio::test]
async fn notify_stamps_clock_time() {
    struct Fixed;
    impl Clock for Fixed {
        fn local(&self) -> chrono::DateTime<chrono::Local> {
            self.utc().with_timezone(&chrono::Local)
        }
        fn utc(&self) -> chrono::DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp")
        }
    }
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_insert_many().returning(|_| Ok(()));
    let service = NotificationService::new(
        Arc::new(notifications),
        Arc::new(MockUserRepository::new()),
        Arc::new(Fixed),
    );
    let stored = service
        .notify(UserId::random(), NotificationKind::RoleChanged, "Role", "assistant")
        .await
        .expect("stored");
    assert_eq!(stored.created_at, Fixed.utc());
}
