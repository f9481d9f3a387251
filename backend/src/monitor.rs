// Real-time gaze monitor task.
// Invariants: runs on its own task so the dispatcher stays responsive;
// suspension only at tick boundaries; terminates on violation or when the
// requested duration elapses, nothing else.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::{self, Instant};
use tracing::{info, warn};

use gaze_core::monitor::{check_tick, MonitorOutcome, TickCheck};
use gaze_core::session::DeviceSession;

use crate::protocol::ServerMessage;
use crate::utils::send_message;

#[derive(Clone, Copy, Debug)]
pub struct MonitorParams {
    pub duration: Duration,
    pub tick: Duration,
    pub threshold_px: f64,
    /// Screen center in pixels; deviations are measured from here.
    pub center: (f64, f64),
}

/// Polls the newest gaze sample at the tick cadence until the duration
/// elapses or the deviation threshold is exceeded. A violation stops the
/// session's recording and broadcasts `eyeMovementDetected`; completion is
/// silent.
pub async fn run_monitor(
    session: Arc<Mutex<DeviceSession>>,
    tx: broadcast::Sender<String>,
    params: MonitorParams,
) -> MonitorOutcome {
    let started = Instant::now();
    let mut ticker = time::interval(params.tick);

    loop {
        // first tick resolves immediately, so the check runs at t=0
        ticker.tick().await;
        if started.elapsed() >= params.duration {
            return MonitorOutcome::Completed;
        }

        let sample = { session.lock().await.newest_sample() };
        let Some(sample) = sample else {
            // no eye data this tick: skip the check, keep monitoring
            continue;
        };

        if let TickCheck::Violated { x, y } =
            check_tick(&sample, params.center, params.threshold_px)
        {
            {
                let mut session = session.lock().await;
                if let Err(err) = session.stop_recording() {
                    warn!(%err, "failed to stop recording after gaze violation");
                }
            }
            send_message(&tx, &ServerMessage::EyeMovementDetected { x, y });
            info!(x, y, "eye movement detected");
            return MonitorOutcome::Violated { x, y };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scripted_session, ScriptedDriver};

    use gaze_core::sample::GazeSample;
    use gaze_core::session::SessionState;

    fn params(duration_ms: u64) -> MonitorParams {
        MonitorParams {
            duration: Duration::from_millis(duration_ms),
            tick: Duration::from_millis(1),
            threshold_px: 63.0,
            center: (960.0, 540.0),
        }
    }

    #[tokio::test]
    async fn violation_terminates_at_the_offending_tick() {
        let driver = ScriptedDriver::default();
        let polls = driver.polls.clone();
        // two in-bounds ticks, then a deviation of 100px to the right
        driver.push_samples(vec![
            Some(GazeSample::both_at((960.0, 540.0), (960.0, 540.0))),
            Some(GazeSample::both_at((970.0, 540.0), (950.0, 540.0))),
            Some(GazeSample::both_at((1060.0, 540.0), (1060.0, 540.0))),
            Some(GazeSample::both_at((960.0, 540.0), (960.0, 540.0))),
        ]);
        let (session, tx, mut rx) = scripted_session(driver);
        session.lock().await.start_recording().expect("start");

        let outcome = run_monitor(session.clone(), tx, params(5_000)).await;
        assert_eq!(outcome, MonitorOutcome::Violated { x: 100.0, y: 0.0 });
        // terminated immediately: the in-bounds tail sample was never polled
        assert_eq!(*polls.lock().unwrap(), 3);
        // recording stopped as a side effect
        assert_eq!(session.lock().await.state(), SessionState::Configured);
        // violation broadcast with center-relative coordinates
        let payload = rx.try_recv().expect("violation message");
        assert_eq!(
            payload,
            r#"{"type":"eyeMovementDetected","x":100.0,"y":0.0}"#
        );
    }

    #[tokio::test]
    async fn quiet_run_completes_silently() {
        let driver = ScriptedDriver::default();
        driver.push_samples(vec![
            Some(GazeSample::both_at((960.0, 540.0), (960.0, 540.0)));
            64
        ]);
        let (session, tx, mut rx) = scripted_session(driver);

        let outcome = run_monitor(session, tx, params(30)).await;
        assert_eq!(outcome, MonitorOutcome::Completed);
        assert!(rx.try_recv().is_err(), "completion must not emit a message");
    }

    #[tokio::test]
    async fn missing_samples_are_skipped_not_violations() {
        let driver = ScriptedDriver::default();
        driver.push_samples(vec![None, None, None]);
        let (session, tx, mut rx) = scripted_session(driver);

        let outcome = run_monitor(session, tx, params(20)).await;
        assert_eq!(outcome, MonitorOutcome::Completed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn zero_duration_completes_without_polling() {
        let driver = ScriptedDriver::default();
        let polls = driver.polls.clone();
        driver.push_samples(vec![Some(GazeSample::both_at(
            (2000.0, 540.0),
            (2000.0, 540.0),
        ))]);
        let (session, tx, _rx) = scripted_session(driver);

        let outcome = run_monitor(session, tx, params(0)).await;
        assert_eq!(outcome, MonitorOutcome::Completed);
        assert_eq!(*polls.lock().unwrap(), 0);
    }
}
