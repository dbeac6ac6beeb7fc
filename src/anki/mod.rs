pub mod api;
pub mod types;

pub use api::AnkiClient;
pub use types::{
    ApiResponse,
    Field,
    NewNote,
    NoteInfo,
    NoteOptions,
};
