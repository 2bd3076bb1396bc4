use std::sync::Arc;

use anyhow::Result;
use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};

use crate::services::attempt_api::AttemptService;
use crate::session::controller::{
    AdvanceOutcome, AttemptController, LoadError, SubmitMode, SubmitOutcome, TickOutcome,
};
use crate::session::{ticker, SessionEvent};
use crate::ui;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Drives one attempt end to end: initialize, answer loop, terminal submit.
pub(crate) async fn run_attempt(
    service: Arc<dyn AttemptService>,
    assessment_id: i64,
) -> Result<()> {
    let controller =
        match AttemptController::initialize(service, assessment_id, OffsetDateTime::now_utc())
            .await
        {
            Ok(controller) => controller,
            Err(LoadError::AlreadySubmitted) => {
                ui::notice("You have already submitted this assessment.");
                return Ok(());
            }
            Err(err) => {
                tracing::error!(assessment_id, error = %err, "failed to load attempt");
                ui::notice("Failed to load assessment. It might not be live yet.");
                return Ok(());
            }
        };

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (stop_tx, stop_rx) = watch::channel(false);

    let input_task = tokio::spawn(ui::read_input(events_tx.clone(), stop_rx.clone()));
    let ticker_task = if controller.has_countdown() && !controller.time_expired() {
        Some(ticker::spawn(events_tx, stop_rx))
    } else {
        None
    };

    drive(controller, events_rx, &stop_tx).await;

    let _ = stop_tx.send(true);
    input_task.abort();
    if let Some(task) = ticker_task {
        task.abort();
    }

    Ok(())
}

async fn drive(
    mut controller: AttemptController,
    mut events: mpsc::Receiver<SessionEvent>,
    stop: &watch::Sender<bool>,
) {
    // An attempt resumed after its deadline goes straight to the expiry path;
    // there is no tick to wait for.
    if controller.time_expired() {
        finish_auto(&mut controller).await;
        return;
    }

    ui::render_question(&controller);

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Select(choice) => {
                if let Some(option) = option_at(&controller, choice) {
                    controller.select_option(&option);
                }
                ui::render_question(&controller);
            }
            SessionEvent::Next => match controller.confirm_and_advance().await {
                AdvanceOutcome::Ignored => {
                    ui::notice("Pick an option first.");
                }
                AdvanceOutcome::Moved { .. } => {
                    ui::render_question(&controller);
                }
                AdvanceOutcome::Submitted => {
                    ui::notice("Assessment submitted!");
                    break;
                }
                AdvanceOutcome::Closed => {
                    ui::notice("This attempt is already closed.");
                    break;
                }
                AdvanceOutcome::SaveFailed(err) => {
                    ui::notice(&format!("Failed to save answer: {err}. Try again."));
                }
                AdvanceOutcome::SubmitFailed(err) => {
                    ui::notice(&format!("Failed to submit assessment: {err}. Try again."));
                }
            },
            SessionEvent::Tick => match controller.tick() {
                TickOutcome::Idle => {}
                TickOutcome::Running(remaining) => {
                    ui::render_clock(remaining);
                }
                TickOutcome::Expired => {
                    let _ = stop.send(true);
                    finish_auto(&mut controller).await;
                    break;
                }
            },
            SessionEvent::Quit => {
                tracing::info!(
                    attempt_id = controller.attempt_id(),
                    "attempt abandoned by the student"
                );
                break;
            }
        }

        if controller.is_done() {
            break;
        }
    }
}

async fn finish_auto(controller: &mut AttemptController) {
    match controller.auto_submit().await {
        SubmitOutcome::Submitted(SubmitMode::Auto) => {
            ui::notice("Time's up! Assessment submitted.");
        }
        SubmitOutcome::Submitted(SubmitMode::Manual) | SubmitOutcome::Ignored => {}
        SubmitOutcome::Failed(_) => {
            // Already logged by the controller; nothing the student can do.
            ui::notice("Time's up!");
        }
    }
}

fn option_at(controller: &AttemptController, choice: usize) -> Option<String> {
    if choice == 0 {
        return None;
    }
    controller.current_question().options.get(choice - 1).cloned()
}
