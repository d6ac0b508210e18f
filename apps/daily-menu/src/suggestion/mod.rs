pub mod batch;
pub mod candidate_selector;
pub mod catalog;
pub mod pipeline;
pub mod prompt;
pub mod reconciler;
pub mod user_context;
pub mod writer;

#[cfg(test)]
pub mod test_support;
