pub(crate) mod attempt_api;
pub(crate) mod attempt_timing;
