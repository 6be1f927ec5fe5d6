use std::time::Duration;

use battleship_link::barrier::{BarrierError, Party, ReadyBarrier};
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread")]
async fn test_both_waiters_released_together() -> anyhow::Result<()> {
    let barrier = ReadyBarrier::new();
    let mut w1 = barrier.waiter();
    let mut w2 = barrier.waiter();
    let h1 = tokio::spawn(async move { w1.wait().await });
    let h2 = tokio::spawn(async move { w2.wait().await });

    assert_eq!(barrier.signal(Party::Remote), Ok(false));
    assert!(!barrier.is_released());
    assert_eq!(barrier.signal(Party::Local), Ok(true));

    assert_eq!(timeout(Duration::from_secs(2), h1).await??, Ok(0));
    assert_eq!(timeout(Duration::from_secs(2), h2).await??, Ok(0));
    Ok(())
}

#[tokio::test]
async fn test_single_signal_never_releases() {
    let barrier = ReadyBarrier::new();
    barrier.signal(Party::Local).unwrap();
    assert!(barrier.has_signalled(Party::Local));
    assert!(!barrier.has_signalled(Party::Remote));
    let mut waiter = barrier.waiter();
    assert!(timeout(Duration::from_millis(100), waiter.wait()).await.is_err());
}

#[test]
fn test_duplicate_signal_rejected() {
    let barrier = ReadyBarrier::new();
    barrier.signal(Party::Remote).unwrap();
    assert_eq!(
        barrier.signal(Party::Remote),
        Err(BarrierError::AlreadySignalled(Party::Remote))
    );
    assert!(!barrier.is_released());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_abort_breaks_waiters() -> anyhow::Result<()> {
    let barrier = ReadyBarrier::new();
    let mut waiter = barrier.waiter();
    let handle = tokio::spawn(async move { waiter.wait().await });
    barrier.signal(Party::Local).unwrap();
    barrier.abort();
    assert_eq!(
        timeout(Duration::from_secs(2), handle).await??,
        Err(BarrierError::Broken)
    );
    assert_eq!(barrier.signal(Party::Remote), Err(BarrierError::Broken));
    Ok(())
}

#[tokio::test]
async fn test_reset_starts_new_generation() {
    let mut barrier = ReadyBarrier::new();
    let mut old = barrier.waiter();
    barrier.signal(Party::Local).unwrap();
    barrier.reset();
    assert_eq!(barrier.generation(), 1);
    assert_eq!(old.wait().await, Err(BarrierError::Broken));

    // signals of the old generation are gone
    assert!(!barrier.has_signalled(Party::Local));
    let mut fresh = barrier.waiter();
    assert_eq!(fresh.generation(), 1);
    barrier.signal(Party::Local).unwrap();
    barrier.signal(Party::Remote).unwrap();
    assert_eq!(fresh.wait().await, Ok(1));
}

#[tokio::test]
async fn test_abort_after_release_is_noop() {
    let barrier = ReadyBarrier::new();
    barrier.signal(Party::Local).unwrap();
    barrier.signal(Party::Remote).unwrap();
    barrier.abort();
    assert!(barrier.is_released());
    assert_eq!(barrier.waiter().wait().await, Ok(0));
}
