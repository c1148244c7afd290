pub mod chat;
pub mod cpt;
pub mod download;
pub mod history;
pub mod inference;
pub mod workflow;

pub use chat::{ChatMessage, ChatReply, ChatRequest, ChatStatusResponse};
pub use cpt::{CptLookupRequest, CptLookupResponse};
pub use download::{attachment_filename, DownloadFormat, DownloadRequest};
pub use history::{
    HistoryParams, HistoryResponse, NewAnalysisRequest, NewSessionResponse, RecordedAnalysisResponse,
};
pub use inference::{InferenceRequest, InferenceResponse, VerifyRequest};
pub use workflow::{ExecutionResultResponse, ResultsParams, TaskResult, TriggerRequest, TriggerResponse};
