// Candidate/job matching engine.
// Leaf-first: similarity → experience / education / skills → scorer → ai_matcher → batch.
// All LLM calls go through llm_client; key-phrase calls through key_phrases.

pub mod ai_matcher;
pub mod batch;
pub mod education;
pub mod experience;
pub mod handlers;
pub mod key_phrases;
pub mod prompts;
pub mod response_repair;
pub mod scorer;
pub mod similarity;
pub mod skills;
