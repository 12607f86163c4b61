//! Countdown tick background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::{AppState, TickOutcome};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Delay after a notification before another expiry may notify again
pub const NOTIFY_LOCK_RELEASE: Duration = Duration::from_secs(1);

/// Background task ticking the countdown once per second while it runs
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task");

    let mut running_rx = state.running_tx.subscribe();

    loop {
        // Wait for the timer to be started
        if !*running_rx.borrow_and_update() {
            if running_rx.changed().await.is_err() {
                debug!("Running flag channel closed, stopping countdown task");
                return;
            }
            continue;
        }

        debug!("Countdown running, ticking every {:?}", TICK_INTERVAL);
        let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick() {
                        Ok(TickOutcome::Counting(remaining)) => {
                            debug!("Countdown: {}s remaining", remaining);
                        }
                        Ok(TickOutcome::Completed { notify: Some(generation) }) => {
                            spawn_notification(Arc::clone(&state), generation);
                            break;
                        }
                        Ok(TickOutcome::Completed { notify: None }) => {
                            debug!("Notification already in flight, skipping");
                            break;
                        }
                        Ok(TickOutcome::Idle) => break,
                        Err(e) => {
                            error!("Failed to tick countdown: {}", e);
                            break;
                        }
                    }
                }

                changed = running_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*running_rx.borrow_and_update() {
                        debug!("Countdown stopped");
                        break;
                    }
                }
            }
        }
    }
}

/// Notify off the tick loop, then free the lock this expiry took
fn spawn_notification(state: Arc<AppState>, generation: u64) {
    tokio::spawn(async move {
        let notifier_state = Arc::clone(&state);
        if let Err(e) = tokio::task::spawn_blocking(move || notifier_state.notify_completion()).await {
            error!("Notification task failed: {}", e);
        }

        sleep(NOTIFY_LOCK_RELEASE).await;
        if let Err(e) = state.release_notify_lock(generation) {
            error!("Failed to release notification lock: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{Permission, YoutubeClient},
        state::AlertKind,
        test_support::FakeBackend,
    };

    fn app(work_seconds: u64) -> Arc<AppState> {
        Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            work_seconds,
            YoutubeClient::new("http://127.0.0.1:1", None),
            FakeBackend::new(Permission::Denied),
            false,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn runs_down_and_notifies_once() {
        let state = app(5);
        tokio::spawn(countdown_task(Arc::clone(&state)));

        state.start_timer().unwrap();
        sleep(Duration::from_millis(4_500)).await;
        let timer = state.get_timer_state().unwrap();
        assert_eq!(timer.remaining_seconds, 1);
        assert!(timer.running);

        sleep(Duration::from_secs(1)).await;
        let timer = state.get_timer_state().unwrap();
        assert!(!timer.running);
        assert_eq!(timer.completed, 1);
        assert_eq!(timer.remaining_seconds, 5);

        sleep(Duration::from_secs(3)).await;
        let completions: Vec<_> = state
            .ui
            .alerts()
            .unwrap()
            .into_iter()
            .filter(|a| a.kind == AlertKind::Completion)
            .collect();
        assert_eq!(completions.len(), 1);
        assert!(!state.timer.lock().unwrap().is_notify_locked());
        assert_eq!(state.get_timer_state().unwrap().completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticking() {
        let state = app(10);
        tokio::spawn(countdown_task(Arc::clone(&state)));

        state.start_timer().unwrap();
        sleep(Duration::from_millis(2_500)).await;
        state.pause_timer().unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 8);

        state.start_timer().unwrap();
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 7);
    }
}
