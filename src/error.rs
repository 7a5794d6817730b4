use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required artifact {artifact} is missing; run `mcqbank {stage}` first")]
    MissingInput { artifact: String, stage: &'static str },

    #[error("failed to acquire text from {filename}: {reason}")]
    Acquisition { filename: String, reason: String },
}
