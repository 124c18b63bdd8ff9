pub mod distance_matrix;
pub mod evaluator;
pub mod genome;
pub mod league;
pub mod optimizer;
pub mod parsers;
pub mod schedule;
pub mod search;
pub mod team_cost_matrix;
mod utils;

#[cfg(test)]
pub(crate) mod test_support;
