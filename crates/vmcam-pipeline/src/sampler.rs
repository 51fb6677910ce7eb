use std::future::Future;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use vmcam_camera::{Camera, CameraError};

/// Periodic tick source. Ticks missed while the loop was busy are dropped,
/// not replayed in a burst.
pub(crate) fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Wait for camera access. A refusal is logged and reported as `None`.
pub(crate) async fn acquire_camera<Cam, A>(acquire: A) -> Option<Cam>
where
    Cam: Camera,
    A: Future<Output = Result<Cam, CameraError>>,
{
    match acquire.await {
        Ok(camera) => Some(camera),
        Err(err) => {
            log::error!("camera access failed: {err}");
            None
        }
    }
}
