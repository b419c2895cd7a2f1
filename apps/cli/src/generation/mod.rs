// Curriculum generation and achievement tuning.
// All LLM calls go through llm_client::JsonGenerator — no direct HTTP calls here.

pub mod achievements;
pub mod curriculum;
pub mod prompts;
pub mod text_converter;
