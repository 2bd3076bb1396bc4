pub(crate) mod assessment;
pub(crate) mod attempt;
