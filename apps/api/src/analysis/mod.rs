// Résumé analysis: PDF text → completion → parsed record → stored document → report.
// All model calls go through llm_client; handlers only adapt input and output.

pub mod extractor;
pub mod handlers;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod store;
pub mod ui;

#[cfg(test)]
pub mod testing;
