pub mod alerts;
pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod notifier;

#[cfg(test)]
mod test_support;
