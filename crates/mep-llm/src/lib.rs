pub mod error;
pub mod ollama;
pub mod prompt;
pub mod provider;
pub mod supersede;

pub use error::{LlmError, LlmResult};
pub use ollama::{OllamaClient, OllamaConfig};
pub use prompt::ReasoningPrompt;
pub use provider::{GenerationBackend, GenerationRequest};
pub use supersede::{SlotTicket, SupersedingSlot};
