use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use crate::core::time::format_clock;
use crate::session::controller::AttemptController;
use crate::session::SessionEvent;

/// Reads stdin lines and translates them into session events. A number picks
/// an option, an empty line or `n` confirms it, `q` abandons the attempt.
pub(crate) async fn read_input(
    events: mpsc::Sender<SessionEvent>,
    mut stop: watch::Receiver<bool>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = stop.changed() => break,
            line = lines.next_line() => line,
        };

        let event = match line {
            Ok(Some(raw)) => parse_line(&raw),
            Ok(None) => Some(SessionEvent::Quit),
            Err(err) => {
                tracing::error!(error = %err, "failed to read input");
                Some(SessionEvent::Quit)
            }
        };

        let quit = event == Some(SessionEvent::Quit);
        if let Some(event) = event {
            if events.send(event).await.is_err() {
                break;
            }
        }
        if quit {
            break;
        }
    }
}

fn parse_line(raw: &str) -> Option<SessionEvent> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(SessionEvent::Next);
    }
    if let Ok(choice) = trimmed.parse::<usize>() {
        return Some(SessionEvent::Select(choice));
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "n" | "next" => Some(SessionEvent::Next),
        "q" | "quit" => Some(SessionEvent::Quit),
        _ => None,
    }
}

pub(crate) fn render_question(controller: &AttemptController) {
    let question = controller.current_question();

    println!();
    println!(
        "{} | question {} of {}  [{}]",
        controller.title(),
        controller.current_index() + 1,
        controller.question_count(),
        format_clock(controller.remaining()),
    );
    println!("{}", question.question_text);
    for (index, option) in question.options.iter().enumerate() {
        let marker = if controller.selected_option() == Some(option.as_str()) { ">" } else { " " };
        println!(" {marker} {}. {option}", index + 1);
    }
    let action = if controller.current_index() + 1 == controller.question_count() {
        "submit the assessment"
    } else {
        "go to the next question"
    };
    println!("(type an option number, or press Enter to {action})");
}

pub(crate) fn render_clock(remaining: i64) {
    // Only nag about the clock once it gets tight.
    if remaining <= 60 && (remaining % 10 == 0 || remaining <= 5) {
        println!("  {} left", format_clock(Some(remaining)));
    }
}

pub(crate) fn notice(message: &str) {
    println!("{message}");
}
