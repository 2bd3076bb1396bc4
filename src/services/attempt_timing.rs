use time::OffsetDateTime;

/// Total budget for the whole attempt: per-question duration times the number
/// of questions.
pub(crate) fn total_duration_seconds(time_per_question: i64, question_count: usize) -> i64 {
    time_per_question.max(0) * question_count as i64
}

/// Seconds left on the attempt clock, clamped at zero. Computed once at load
/// from the server-issued start timestamp; afterwards the controller only
/// decrements locally, it never re-syncs with the server clock.
pub(crate) fn remaining_seconds(
    total_duration: i64,
    started_at: OffsetDateTime,
    now: OffsetDateTime,
) -> i64 {
    let elapsed = (now - started_at).whole_seconds();
    (total_duration - elapsed).max(0)
}
