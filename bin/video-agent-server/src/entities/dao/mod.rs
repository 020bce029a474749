pub mod chat;
pub mod section;
pub mod session;
pub mod task;
pub mod transcript;
pub mod video;

pub use chat::ChatMessage;
pub use section::Section;
pub use session::ChatSession;
pub use task::TaskRecord;
pub use transcript::{TranscriptSentence, VideoTranscript};
pub use video::{Thumbnail, Video};
