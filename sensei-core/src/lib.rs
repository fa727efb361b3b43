//! sensei-core: state and service layer for the sensei code-review assistant.
//!
//! Holds everything that does not touch the terminal: the data model, the
//! decoration mapper, the selection / conversation / card-view state, the
//! session controller that composes them, and the HTTP client for the
//! analysis service.

pub mod annotations;
pub mod client;
pub mod conversation;
pub mod error;
pub mod report_view;
pub mod selection;
pub mod session;
pub mod types;

pub use error::{ApiError, ConversationError};
pub use session::{PendingAnalysis, SessionController, SessionStatus};
