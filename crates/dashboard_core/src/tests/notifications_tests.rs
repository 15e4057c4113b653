use super::*;

#[tokio::test(start_paused = true)]
async fn newest_notification_is_listed_first() {
    let center = NotificationCenter::default();
    center.notify(Severity::Info, "first").await;
    center.notify(Severity::Success, "second").await;

    let messages: Vec<_> = center
        .active()
        .await
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["second", "first"]);
}

#[tokio::test(start_paused = true)]
async fn notification_expires_after_ttl() {
    let center = NotificationCenter::default();
    center.notify(Severity::Error, "upload failed").await;

    tokio::time::sleep(NOTIFICATION_TTL - Duration::from_millis(1)).await;
    assert_eq!(center.active().await.len(), 1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    tokio::task::yield_now().await;
    assert!(center.active().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn dismiss_removes_immediately_and_is_idempotent() {
    let center = NotificationCenter::default();
    let keep = center.notify(Severity::Info, "keep").await;
    let gone = center.notify(Severity::Info, "gone").await;

    assert!(center.dismiss(gone).await);
    assert!(!center.dismiss(gone).await);

    let active = center.active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, keep);
}

#[tokio::test(start_paused = true)]
async fn dismissed_notification_expiry_does_not_touch_later_entries() {
    let center = NotificationCenter::new(Duration::from_millis(1000));
    let early = center.notify(Severity::Info, "early").await;
    center.dismiss(early).await;

    tokio::time::sleep(Duration::from_millis(600)).await;
    let late = center.notify(Severity::Success, "late").await;

    // the cancelled timer of `early` would have fired here
    tokio::time::sleep(Duration::from_millis(500)).await;
    tokio::task::yield_now().await;
    let active = center.active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, late);

    tokio::time::sleep(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;
    assert!(center.active().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn clear_cancels_every_timer() {
    let center = NotificationCenter::default();
    center.notify(Severity::Info, "a").await;
    center.notify(Severity::Info, "b").await;

    center.clear().await;
    assert!(center.active().await.is_empty());
}

#[test]
fn severity_icons_match_alert_style() {
    assert_eq!(Severity::Success.icon(), "check-circle");
    assert_eq!(Severity::Error.icon(), "x-circle");
    assert_eq!(Severity::Info.icon(), "info");
}

#[test]
fn date_label_uses_day_month_year() {
    let created_at = chrono::NaiveDate::from_ymd_opt(2026, 1, 5)
        .and_then(|date| date.and_hms_opt(23, 30, 0))
        .expect("valid timestamp")
        .and_utc();
    let notification = Notification {
        id: NotificationId(7),
        severity: Severity::Success,
        message: "Đã nhập 120 sinh viên".into(),
        created_at,
    };

    assert_eq!(notification.date_label(), "05/01/2026");
    assert_eq!(notification.icon(), "check-circle");
}
