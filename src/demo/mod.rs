//! Live Demo state: loaded content, the view toggle, and per-visitor sessions.

mod content;
mod session;
mod toggle;

pub use content::ContentItem;
pub use session::{
    DemoServices, DemoSession, GenerationTicket, SessionSnapshot, SharedSession, SpeechStart,
    ToggleStart, regenerate, set_text, submit_url, toggle, toggle_speech, upload, url_changed,
};
pub use toggle::{ToggleAction, ViewMode, plan_toggle};
