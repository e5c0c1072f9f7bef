//! Page lifecycle state machine.
//!
//! Every fetch gets a [`RequestToken`]. Only the result of the most recently
//! issued fetch is applied, so overlapping fetches cannot leave a page on a
//! stale result or stuck in `Loading`. `Error` is terminal until remount.

use serde::Serialize;

/// What a mounted page is currently showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "lowercase")]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Empty,
    Error(String),
}

impl<T> PageState<T> {
    pub fn name(&self) -> &'static str {
        match self {
            PageState::Loading => "loading",
            PageState::Ready(_) => "ready",
            PageState::Empty => "empty",
            PageState::Error(_) => "error",
        }
    }

    /// The state a finished fetch leads to.
    pub fn from_outcome<E: std::fmt::Display>(outcome: Result<Option<T>, E>) -> Self {
        match outcome {
            Ok(Some(value)) => PageState::Ready(value),
            Ok(None) => PageState::Empty,
            Err(e) => PageState::Error(e.to_string()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PageState<U> {
        match self {
            PageState::Loading => PageState::Loading,
            PageState::Ready(v) => PageState::Ready(f(v)),
            PageState::Empty => PageState::Empty,
            PageState::Error(e) => PageState::Error(e),
        }
    }
}

/// Identifies one fetch issued by a [`PageMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Tracks state and fetch sequencing for one mounted page.
#[derive(Debug)]
pub struct PageMachine<T> {
    state: PageState<T>,
    issued: u64,
    mounted: bool,
}

impl<T> Default for PageMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageMachine<T> {
    /// A freshly mounted page, in `Loading` with no fetch issued yet.
    pub fn new() -> Self {
        Self {
            state: PageState::Loading,
            issued: 0,
            mounted: true,
        }
    }

    pub fn state(&self) -> &PageState<T> {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Start a fetch. Returns `None` when the page is in `Error` or has
    /// been unmounted.
    pub fn begin_fetch(&mut self) -> Option<RequestToken> {
        if !self.mounted || matches!(self.state, PageState::Error(_)) {
            return None;
        }
        self.issued += 1;
        self.state = PageState::Loading;
        Some(RequestToken(self.issued))
    }

    /// Apply the outcome of fetch `token`. Returns `true` when the state
    /// changed, `false` when the result was stale or the page is gone.
    pub fn resolve<E: std::fmt::Display>(
        &mut self,
        token: RequestToken,
        outcome: Result<Option<T>, E>,
    ) -> bool {
        if !self.mounted || token.0 != self.issued {
            return false;
        }
        self.state = PageState::from_outcome(outcome);
        true
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }
}
