pub mod backend;
pub mod capture;
pub mod chunk;
pub mod synthetic;

pub use backend::{
    default_mime_preferences, select_mime_type, CaptureConfig, CaptureDevice, MediaCaptureProvider,
    MediaChunk,
};
pub use capture::{DeviceHandle, MediaCapture, RecordingHandle};
pub use chunk::{collect_chunks, ChunkBuffer};
pub use synthetic::SyntheticCaptureProvider;
