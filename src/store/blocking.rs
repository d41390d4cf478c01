//! The blocking coordinator.
//!
//! A client that finds every requested list empty parks as a *waiter*: a
//! record enqueued under each requested key, all sharing one single-shot
//! delivery slot. A producer that pushes while holding the store write
//! lock drains waiters head-of-queue first, popping one element per waiter
//! from the end that waiter asked for and sending `{key, element}` through
//! its slot. Delivery never blocks because the slot is a oneshot channel.
//!
//! A waiter is identified by its slot pointer. Completion, whether by
//! delivery, timeout or client disconnect, removes its record from every
//! queue it was enrolled in while preserving the order of the remaining
//! waiters. Records whose slot has already been emptied are skipped
//! without consuming an element.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use super::{SharedStore, Store, StoreError, Value};

/// Which end of a list an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopEnd {
    Left,
    Right,
}

/// The message a producer hands to a parked waiter.
#[derive(Debug, PartialEq)]
pub struct Delivery {
    pub key: String,
    pub element: String,
}

type DeliverySlot = Arc<Mutex<Option<oneshot::Sender<Delivery>>>>;

/// One queue entry under a single key. Waiters enrolled under several keys
/// have one record per key, all sharing the same slot.
pub(crate) struct WaiterRecord {
    pub(crate) end: PopEnd,
    pub(crate) slot: DeliverySlot,
}

/// Handle to an enrolled waiter. Dropping the ticket without completing it
/// (a cancelled client task) closes the delivery slot immediately so
/// producers skip it, and scrubs the queue entries from a detached task.
pub struct WaiterTicket {
    store: SharedStore,
    keys: Vec<String>,
    slot: DeliverySlot,
    completed: bool,
}

impl WaiterTicket {
    /// Removes this waiter from every queue it was enrolled in.
    pub async fn complete(mut self) {
        self.completed = true;
        let keys = std::mem::take(&mut self.keys);
        let store = Arc::clone(&self.store);
        let slot = Arc::clone(&self.slot);
        store.write().await.remove_waiter(&keys, &slot);
    }
}

impl Drop for WaiterTicket {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if let Ok(mut slot) = self.slot.lock() {
            slot.take();
        }
        let store = Arc::clone(&self.store);
        let keys = std::mem::take(&mut self.keys);
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            store.write().await.remove_waiter(&keys, &slot);
        });
    }
}

impl Store {
    /// Enqueues a waiter under every requested key, in arrival order.
    /// Must be called under the same write-lock acquisition that found the
    /// lists empty, otherwise a concurrent push could be missed.
    pub(crate) fn register_waiter(
        &mut self,
        shared: &SharedStore,
        keys: &[String],
        end: PopEnd,
    ) -> (WaiterTicket, oneshot::Receiver<Delivery>) {
        let (sender, receiver) = oneshot::channel();
        let slot: DeliverySlot = Arc::new(Mutex::new(Some(sender)));

        for key in keys {
            self.waiters
                .entry(key.clone())
                .or_default()
                .push_back(WaiterRecord {
                    end,
                    slot: Arc::clone(&slot),
                });
        }

        let ticket = WaiterTicket {
            store: Arc::clone(shared),
            keys: keys.to_vec(),
            slot,
            completed: false,
        };
        (ticket, receiver)
    }

    /// Deletes this waiter's record from each named queue. Some entries
    /// may already be gone; one entry per key is removed at most.
    pub(crate) fn remove_waiter(&mut self, keys: &[String], slot: &DeliverySlot) {
        for key in keys {
            if let Some(queue) = self.waiters.get_mut(key) {
                if let Some(position) = queue.iter().position(|record| Arc::ptr_eq(&record.slot, slot)) {
                    queue.remove(position);
                }
                if queue.is_empty() {
                    self.waiters.remove(key);
                }
            }
        }
    }

    /// Serves parked waiters after a push on `key`: while the list is
    /// non-empty and waiters remain, the head waiter receives one element
    /// popped from the end it named. Called with the write lock held.
    pub(crate) fn drain_waiters(&mut self, key: &str) {
        loop {
            if self.list_len(key).unwrap_or(0) == 0 {
                return;
            }
            let Some(queue) = self.waiters.get_mut(key) else {
                return;
            };
            let Some(record) = queue.pop_front() else {
                self.waiters.remove(key);
                return;
            };

            let sender = match record.slot.lock() {
                Ok(mut slot) => slot.take(),
                Err(_) => None,
            };
            // a record without a sender was already satisfied or cancelled
            let Some(sender) = sender else {
                continue;
            };

            let Some(Value::List(list)) = self.entries.get_mut(key) else {
                return;
            };
            let element = match record.end {
                PopEnd::Left => list.pop_front(),
                PopEnd::Right => list.pop_back(),
            };
            let Some(element) = element else {
                return;
            };
            let now_empty = list.is_empty();

            if let Err(returned) = sender.send(Delivery {
                key: key.to_string(),
                element,
            }) {
                // receiver vanished between cancellation and cleanup;
                // the element goes back where it came from
                if let Some(Value::List(list)) = self.entries.get_mut(key) {
                    match record.end {
                        PopEnd::Left => list.push_front(returned.element),
                        PopEnd::Right => list.push_back(returned.element),
                    }
                }
                continue;
            }

            if now_empty {
                self.entries.remove(key);
                return;
            }
        }
    }
}

/// Blocking pop over several keys.
///
/// The fast path, under one write-lock acquisition, pops from the first
/// non-empty list in argument order. Otherwise a waiter is enrolled under
/// every key and the call parks until a producer delivers or the timeout
/// elapses. A timeout of zero parks indefinitely.
pub async fn block_pop(
    store: &SharedStore,
    keys: &[String],
    end: PopEnd,
    timeout_secs: f64,
) -> Result<Option<Delivery>, StoreError> {
    let (ticket, mut receiver) = {
        let mut guard = store.write().await;
        for key in keys {
            if let Some(element) = guard.pop(key, end)? {
                return Ok(Some(Delivery {
                    key: key.clone(),
                    element,
                }));
            }
        }
        guard.register_waiter(store, keys, end)
    };

    let mut delivery = wait_for_delivery(&mut receiver, timeout_secs).await;
    ticket.complete().await;
    if delivery.is_none() {
        // a producer may have delivered in the instant before deregistration
        delivery = receiver.try_recv().ok();
    }

    Ok(delivery)
}

/// Blocking move: like [`Store::move_element`] but parking on an absent
/// source until an element arrives or the timeout elapses.
pub async fn block_move(
    store: &SharedStore,
    src: &str,
    dst: &str,
    src_end: PopEnd,
    dst_end: PopEnd,
    timeout_secs: f64,
) -> Result<Option<String>, StoreError> {
    let (ticket, mut receiver) = {
        let mut guard = store.write().await;
        if let Some(element) = guard.move_element(src, dst, src_end, dst_end)? {
            return Ok(Some(element));
        }
        guard.register_waiter(store, &[src.to_string()], src_end)
    };

    let mut delivery = wait_for_delivery(&mut receiver, timeout_secs).await;
    ticket.complete().await;
    if delivery.is_none() {
        delivery = receiver.try_recv().ok();
    }

    let Some(delivery) = delivery else {
        return Ok(None);
    };

    let mut guard = store.write().await;
    guard.push(dst, dst_end, vec![delivery.element.clone()])?;
    Ok(Some(delivery.element))
}

/// Waits on the delivery channel, racing it against a one-shot timer. A
/// duration of zero means the timer never fires.
async fn wait_for_delivery(
    receiver: &mut oneshot::Receiver<Delivery>,
    timeout_secs: f64,
) -> Option<Delivery> {
    if timeout_secs == 0.0 {
        receiver.await.ok()
    } else {
        match tokio::time::timeout(Duration::from_secs_f64(timeout_secs), &mut *receiver).await {
            Ok(result) => result.ok(),
            Err(_) => None,
        }
    }
}
