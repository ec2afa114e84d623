use std::fmt::Debug;

use roost_core::{HeaderSet, Request, Response};

use crate::cache::CacheEntry;

/// Pipeline state.
#[allow(missing_docs)]
pub enum State {
    /// Looking for a fresh entry (GET/HEAD only)
    CacheCheck { request: Request },
    /// Calling the transport, conditionally when a stale entry is known
    Fetching {
        request: Request,
        stale: Option<CacheEntry>,
    },
    /// Origin answered 304 for a stale entry
    Revalidating {
        request: Request,
        stale: CacheEntry,
        headers: HeaderSet,
    },
    /// A 3xx with a `Location` to follow
    Redirecting {
        request: Request,
        response: Response,
    },
    /// Final response
    Done(Response),
}

impl State {
    /// Name used for the state's tracing span.
    pub fn name(&self) -> &'static str {
        match self {
            State::CacheCheck { .. } => "CacheCheck",
            State::Fetching { .. } => "Fetching",
            State::Revalidating { .. } => "Revalidating",
            State::Redirecting { .. } => "Redirecting",
            State::Done(_) => "Done",
        }
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "State::{}", self.name())
    }
}
