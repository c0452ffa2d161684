use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Latest-wins slot for overlapping requests of the same kind.
///
/// Starting a request cancels whichever one was in flight before it, so a
/// slow lookup for a stale query never overwrites a newer answer.
#[derive(Default)]
pub struct SupersedingSlot {
    current: Mutex<Option<(u64, CancellationToken)>>,
    next_id: AtomicU64,
}

/// Handle for one request in a [`SupersedingSlot`]. Dropping it releases
/// the slot if no newer request has taken it.
pub struct SlotTicket<'a> {
    slot: &'a SupersedingSlot,
    id: u64,
    token: CancellationToken,
}

impl SupersedingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> SlotTicket<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self.current.lock().replace((id, token.clone()));
        if let Some((old_id, old)) = previous {
            debug!(superseded = old_id, by = id, "cancelling in-flight request");
            old.cancel();
        }
        SlotTicket {
            slot: self,
            id,
            token,
        }
    }
}

impl SlotTicket<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SlotTicket<'_> {
    fn drop(&mut self) {
        let mut current = self.slot.current.lock();
        if matches!(current.as_ref(), Some((id, _)) if *id == self.id) {
            *current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn newer_request_cancels_older() {
        let slot = SupersedingSlot::new();
        let first = slot.begin();
        assert!(!first.is_superseded());

        let second = slot.begin();
        assert!(first.is_superseded());
        assert!(!second.is_superseded());
    }

    #[test]
    fn stale_drop_keeps_newer_request() {
        let slot = SupersedingSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        drop(first);
        assert!(slot.current.lock().is_some());
        drop(second);
        assert!(slot.current.lock().is_none());
    }

    #[tokio::test]
    async fn cancelled_future_resolves() {
        let slot = SupersedingSlot::new();
        let first = slot.begin();
        let token = first.token().clone();

        let waiter = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => true,
                _ = tokio::time::sleep(Duration::from_secs(5)) => false,
            }
        });

        let _second = slot.begin();
        assert!(waiter.await.unwrap());
    }
}
