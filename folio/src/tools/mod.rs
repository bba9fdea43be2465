//! Built-in tools.
//!
//! - [`ExtractTitleTool`]: sends the latest upload to a model and returns
//!   its title.
//! - [`LoadArtifactsTool`]: lists or inspects the uploads of a session.

mod extract_title;
mod load_artifacts;

pub use extract_title::{
    DEFAULT_MODEL, ExtractTitleArgs, ExtractTitleTool, FAILURE_PREFIX, FALLBACK_MIME_TYPE,
    TITLE_PROMPT, extract_title,
};
pub use load_artifacts::{
    ArtifactInfo, LoadArtifactsArgs, LoadArtifactsOutput, LoadArtifactsTool, LoadOutcome,
};
