use crate::{Camera, CameraError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use vmcam_base::Tensor;

type FrameResult = Result<Tensor<u8>, CameraError>;

struct Shared {
    frame: Mutex<Option<FrameResult>>,
    notify: Notify,
    sender_closed: AtomicBool,
    receiver_closed: AtomicBool,
    overwritten: AtomicU64,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Option<FrameResult>> {
        self.frame.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Producer half of [`latest_frame`]. Usable from a plain thread.
pub struct LatestSender {
    shared: Arc<Shared>,
}

/// Consumer half of [`latest_frame`]; a [`Camera`] that always yields the
/// newest frame published.
pub struct LatestReceiver {
    shared: Arc<Shared>,
}

/// A one-frame handoff between a capture thread and a consumer.
///
/// Publishing replaces any frame the consumer has not picked up yet, so a
/// consumer sampling slower than the device never sees a backlog.
pub fn latest_frame() -> (LatestSender, LatestReceiver) {
    let shared = Arc::new(Shared {
        frame: Mutex::new(None),
        notify: Notify::new(),
        sender_closed: AtomicBool::new(false),
        receiver_closed: AtomicBool::new(false),
        overwritten: AtomicU64::new(0),
    });
    (
        LatestSender {
            shared: shared.clone(),
        },
        LatestReceiver { shared },
    )
}

impl LatestSender {
    /// Publish `frame`. Returns `false` once the receiver is gone.
    pub fn send(&self, frame: FrameResult) -> bool {
        if self.is_closed() {
            return false;
        }
        if self.shared.slot().replace(frame).is_some() {
            self.shared.overwritten.fetch_add(1, Ordering::Relaxed);
        }
        self.shared.notify.notify_one();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.shared.receiver_closed.load(Ordering::Acquire)
    }
}

impl Drop for LatestSender {
    fn drop(&mut self) {
        self.shared.sender_closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

impl LatestReceiver {
    /// Take the pending frame, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<FrameResult> {
        self.shared.slot().take()
    }

    /// Frames replaced before anyone received them.
    pub fn overwritten(&self) -> u64 {
        self.shared.overwritten.load(Ordering::Relaxed)
    }
}

impl Drop for LatestReceiver {
    fn drop(&mut self) {
        self.shared.receiver_closed.store(true, Ordering::Release);
    }
}

impl Camera for LatestReceiver {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        loop {
            if let Some(frame) = self.try_recv() {
                return frame;
            }
            if self.shared.sender_closed.load(Ordering::Acquire) {
                // The last frame may have landed between the two checks
                return self
                    .try_recv()
                    .unwrap_or_else(|| Err(CameraError::Channel("capture stopped".to_string())));
            }
            // notify_one keeps a permit when nobody waits, so no wakeup is lost
            self.shared.notify.notified().await;
        }
    }
}
