pub mod errors;
pub mod execution;
pub mod line;
pub mod metrics;
pub mod types;

#[cfg(test)]
mod tests;
