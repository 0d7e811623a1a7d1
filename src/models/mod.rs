pub mod session;

pub use session::{generate_session_id, Session, UNCATEGORIZED};
