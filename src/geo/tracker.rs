//! Position and heading fusion.
//!
//! Two independent, unreliable sensor streams (a location feed and a
//! compass/orientation feed) are fused into a single live reading. Sources
//! are injected as ports so tests can drive them deterministically; either
//! stream closing degrades the reading instead of tearing it down.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::SensorError;

use super::{distance_meters, initial_bearing_degrees, relative_bearing_degrees, GeoPoint};

/// One location update. Accuracy is never used to reject a fix; the UI shows
/// it so the user can judge the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub point: GeoPoint,
    pub accuracy_meters: f64,
}

/// One raw orientation update. `is_compass` is true when the platform
/// delivered a dedicated compass heading rather than a raw orientation
/// angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSample {
    pub degrees: f64,
    pub is_compass: bool,
}

/// Continuous location feed port.
pub trait PositionSource: Send + Sync {
    fn subscribe(&self) -> Result<broadcast::Receiver<PositionFix>, SensorError>;
}

/// Continuous compass/orientation feed port.
pub trait HeadingSource: Send + Sync {
    fn subscribe(&self) -> Result<broadcast::Receiver<HeadingSample>, SensorError>;
}

/// Normalizes a platform orientation event to degrees clockwise from north
/// in `[0, 360)`. Dedicated compass headings pass through; raw orientation
/// angles are counter-clockwise and get flipped.
pub fn normalize_heading(sample: HeadingSample) -> f64 {
    let degrees = if sample.is_compass {
        sample.degrees
    } else {
        360.0 - sample.degrees
    };
    degrees.rem_euclid(360.0)
}

/// Latest fused sensor state. `position` stays `None` until the first fix
/// arrives (and navigation shows "distance unknown").
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FusedReading {
    pub position: Option<PositionFix>,
    pub heading_degrees: f64,
}

impl FusedReading {
    /// Great-circle distance to a target, if a position is known.
    pub fn distance_to(&self, target: GeoPoint) -> Option<f64> {
        self.position.map(|fix| distance_meters(fix.point, target))
    }

    /// Arrow rotation toward a target, compensated for device heading.
    pub fn relative_bearing_to(&self, target: GeoPoint) -> Option<f64> {
        self.position.map(|fix| {
            relative_bearing_degrees(
                initial_bearing_degrees(fix.point, target),
                self.heading_degrees,
            )
        })
    }
}

/// Long-lived background listener fusing both sensor streams into a watch
/// channel. Bounded-lifetime resource: the fusion task stops on [`stop`]
/// (idempotent) or when the tracker is dropped.
///
/// [`stop`]: PositionTracker::stop
#[derive(Debug)]
pub struct PositionTracker {
    reading_rx: watch::Receiver<FusedReading>,
    task: Option<JoinHandle<()>>,
}

impl PositionTracker {
    pub fn start(
        positions: &dyn PositionSource,
        headings: &dyn HeadingSource,
    ) -> Result<Self, SensorError> {
        let mut position_rx = positions.subscribe()?;
        let mut heading_rx = headings.subscribe()?;
        let (tx, reading_rx) = watch::channel(FusedReading::default());

        let task = tokio::spawn(async move {
            let mut current = FusedReading::default();
            loop {
                tokio::select! {
                    fix = position_rx.recv() => match fix {
                        Ok(fix) => {
                            current.position = Some(fix);
                            if tx.send(current).is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    sample = heading_rx.recv() => match sample {
                        Ok(sample) => {
                            current.heading_degrees = normalize_heading(sample);
                            if tx.send(current).is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Ok(Self {
            reading_rx,
            task: Some(task),
        })
    }

    /// The latest fused reading.
    pub fn reading(&self) -> FusedReading {
        *self.reading_rx.borrow()
    }

    /// Waits until the fused reading changes.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.reading_rx.changed().await
    }

    /// Releases the background listener. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePositions(broadcast::Sender<PositionFix>);
    struct FakeHeadings(broadcast::Sender<HeadingSample>);
    struct DeniedPositions;

    impl PositionSource for FakePositions {
        fn subscribe(&self) -> Result<broadcast::Receiver<PositionFix>, SensorError> {
            Ok(self.0.subscribe())
        }
    }

    impl HeadingSource for FakeHeadings {
        fn subscribe(&self) -> Result<broadcast::Receiver<HeadingSample>, SensorError> {
            Ok(self.0.subscribe())
        }
    }

    impl PositionSource for DeniedPositions {
        fn subscribe(&self) -> Result<broadcast::Receiver<PositionFix>, SensorError> {
            Err(SensorError::PermissionDenied("location"))
        }
    }

    #[test]
    fn compass_heading_passes_through() {
        let h = normalize_heading(HeadingSample {
            degrees: 123.0,
            is_compass: true,
        });
        assert_eq!(h, 123.0);
    }

    #[test]
    fn raw_orientation_angle_is_flipped() {
        let h = normalize_heading(HeadingSample {
            degrees: 90.0,
            is_compass: false,
        });
        assert_eq!(h, 270.0);
        // alpha = 0 and alpha = 360 both mean facing north.
        let north = normalize_heading(HeadingSample {
            degrees: 0.0,
            is_compass: false,
        });
        assert_eq!(north, 0.0);
    }

    #[tokio::test]
    async fn fuses_position_and_heading_updates() {
        let (pos_tx, _) = broadcast::channel(8);
        let (head_tx, _) = broadcast::channel(8);
        let mut tracker =
            PositionTracker::start(&FakePositions(pos_tx.clone()), &FakeHeadings(head_tx.clone()))
                .unwrap();

        assert_eq!(tracker.reading().position, None);

        pos_tx
            .send(PositionFix {
                point: GeoPoint::new(-23.5505, -46.6333),
                accuracy_meters: 8.0,
            })
            .unwrap();
        tracker.changed().await.unwrap();
        assert!(tracker.reading().position.is_some());

        head_tx
            .send(HeadingSample {
                degrees: 45.0,
                is_compass: true,
            })
            .unwrap();
        tracker.changed().await.unwrap();
        let reading = tracker.reading();
        assert_eq!(reading.heading_degrees, 45.0);
        assert!(reading.position.is_some());
    }

    #[tokio::test]
    async fn relative_bearing_points_at_target() {
        let (pos_tx, _) = broadcast::channel(8);
        let (head_tx, _) = broadcast::channel(8);
        let mut tracker =
            PositionTracker::start(&FakePositions(pos_tx.clone()), &FakeHeadings(head_tx.clone()))
                .unwrap();

        pos_tx
            .send(PositionFix {
                point: GeoPoint::new(0.0, 0.0),
                accuracy_meters: 5.0,
            })
            .unwrap();
        tracker.changed().await.unwrap();
        head_tx
            .send(HeadingSample {
                degrees: 90.0,
                is_compass: true,
            })
            .unwrap();
        tracker.changed().await.unwrap();

        // Target due east while facing east: the arrow points straight ahead.
        let target = GeoPoint::new(0.0, 1.0);
        let rel = tracker.reading().relative_bearing_to(target).unwrap();
        assert!(rel.abs() < 0.01 || (360.0 - rel) < 0.01, "got {rel}");
    }

    #[tokio::test]
    async fn unknown_position_yields_no_distance() {
        let (pos_tx, _) = broadcast::channel(8);
        let (head_tx, _) = broadcast::channel(8);
        let tracker =
            PositionTracker::start(&FakePositions(pos_tx), &FakeHeadings(head_tx)).unwrap();
        assert_eq!(tracker.reading().distance_to(GeoPoint::new(0.0, 0.0)), None);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (pos_tx, _) = broadcast::channel(8);
        let (head_tx, _) = broadcast::channel(8);
        let mut tracker =
            PositionTracker::start(&FakePositions(pos_tx), &FakeHeadings(head_tx)).unwrap();
        tracker.stop();
        tracker.stop();
    }

    #[tokio::test]
    async fn denied_permission_surfaces_once() {
        let (head_tx, _) = broadcast::channel::<HeadingSample>(8);
        let err = PositionTracker::start(&DeniedPositions, &FakeHeadings(head_tx)).unwrap_err();
        assert!(matches!(err, SensorError::PermissionDenied("location")));
    }
}
