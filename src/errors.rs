use thiserror::Error;

#[derive(Error, Debug)]
pub enum BabyError {
    #[error("no API key configured. Set BABYCODING_API_KEY (or OPENAI_API_KEY), pass --api-key, or add `api_key` to babycoding.toml")]
    MissingApiKey,
    #[error("provider error: {0}")] Provider(String),
    #[error("Failed to generate a valid plan. Please try again.")]
    PlanGeneration { reason: String },
    #[error("terminal error: {0}")] Terminal(String),
    #[error("config error: {0}")] Config(String),
}

impl BabyError {
    pub fn plan_generation(reason: impl Into<String>) -> Self {
        BabyError::PlanGeneration { reason: reason.into() }
    }
}
