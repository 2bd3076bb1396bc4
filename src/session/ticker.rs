use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::session::SessionEvent;

/// Spawns the one-second countdown task. The task carries no attempt state:
/// it only emits `Tick` events; the controller, which always holds the live
/// selection and question index, decides what a tick means. Cancelled through
/// the `stop` channel when the countdown ends or the session tears down.
pub(crate) fn spawn(
    events: mpsc::Sender<SessionEvent>,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(1));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick resolves immediately; skip it so the
        // countdown moves one second after start, not at start.
        tick.tick().await;

        loop {
            tokio::select! {
                _ = stop.changed() => break,
                _ = tick.tick() => {
                    if events.send(SessionEvent::Tick).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}
