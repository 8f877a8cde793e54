use crate::{Effect, Msg, Session, UsageError};

/// Applies a message to the session and returns the effects to execute.
///
/// Only `Start` and `Clear` can be refused; a refused message leaves the
/// session untouched.
pub fn update(session: &mut Session, msg: Msg) -> Result<Vec<Effect>, UsageError> {
    match msg {
        Msg::Start { urls, worker_count } => session.start(urls, worker_count),
        Msg::Stop => Ok(session.stop()),
        Msg::Clear => session.clear(),
        Msg::FetchCompleted { ticket, result } => Ok(session.on_fetch_completed(ticket, result)),
    }
}
