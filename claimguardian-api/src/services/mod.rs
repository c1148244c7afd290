pub mod chat_proxy;
pub mod cpt;
pub mod inference;
pub mod metrics;
pub mod orchestrator;
pub mod store;
pub mod verification;

pub use chat_proxy::ChatProxyClient;
pub use inference::{GenerationParams, HostedModelClient, MockTextGenerator, TextGenerator};
pub use orchestrator::OrchestratorClient;
pub use store::{AnalysisStore, MockAnalysisStore, RedisAnalysisStore};
