//! Live pages: a mounted page that refetches whenever its table changes.
//!
//! A [`LivePage`] holds the channel registration of its subscription and
//! a background task holding the event stream and the [`PageMachine`].
//! Fetches run concurrently; the
//! machine's request tokens decide which result is shown. Applied states
//! go to a [`PageSink`] while the page is mounted, and never after
//! [`LivePage::unmount`] returns.

use std::sync::{Arc, RwLock};

use beyond_core::page::{PageMachine, PageState, RequestToken};
use beyond_events::{ChangeBus, ChangeReceiver, ChannelGuard};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SiteError;

/// One fetch of the page's content. `Ok(None)` renders as `Empty`.
pub type FetchFn<T> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Option<T>, SiteError>> + Send + Sync>;

/// Receives every state a live page applies.
pub trait PageSink<T>: Send + Sync + 'static {
    fn apply(&self, state: &PageState<T>);
}

impl<T: Clone + Send + Sync + 'static> PageSink<T> for watch::Sender<PageState<T>> {
    fn apply(&self, state: &PageState<T>) {
        self.send_replace(state.clone());
    }
}

/// Forwards states into an unbounded channel.
impl<T: Clone + Send + Sync + 'static> PageSink<T> for mpsc::UnboundedSender<PageState<T>> {
    fn apply(&self, state: &PageState<T>) {
        let _ = self.send(state.clone());
    }
}

/// A mounted page.
pub struct LivePage {
    channel: String,
    mounted: Arc<RwLock<bool>>,
    cancel: CancellationToken,
    refresh_tx: mpsc::UnboundedSender<()>,
    task: Option<JoinHandle<()>>,
    registration: Option<ChannelGuard>,
}

impl std::fmt::Debug for LivePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivePage")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl LivePage {
    /// Subscribe `channel` to `table`, then issue the initial fetch.
    ///
    /// Fails with [`SiteError::Event`] when `channel` is already in use.
    pub fn mount<T, S>(
        bus: &ChangeBus,
        channel: impl Into<String>,
        table: impl Into<String>,
        fetch: FetchFn<T>,
        sink: S,
    ) -> Result<Self, SiteError>
    where
        T: Send + 'static,
        S: PageSink<T>,
    {
        let channel = channel.into();
        let (events, registration) = bus.subscribe(channel.clone(), table)?.split();

        let mounted = Arc::new(RwLock::new(true));
        let cancel = CancellationToken::new();
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_page(
            events,
            fetch,
            sink,
            Arc::clone(&mounted),
            cancel.clone(),
            refresh_rx,
        ));
        tracing::debug!(channel = %channel, "Page mounted");

        Ok(Self {
            channel,
            mounted,
            cancel,
            refresh_tx,
            task: Some(task),
            registration: Some(registration),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_mounted(&self) -> bool {
        *self.mounted.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Refetch as if a change event had arrived (e.g. after a language
    /// switch).
    pub fn refresh(&self) {
        let _ = self.refresh_tx.send(());
    }

    /// Stop the page. Once this returns the sink is never called again
    /// and the channel name is free.
    pub fn unmount(&mut self) {
        {
            let mut mounted = self.mounted.write().unwrap_or_else(|e| e.into_inner());
            if !*mounted {
                return;
            }
            *mounted = false;
        }
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.registration = None;
        tracing::debug!(channel = %self.channel, "Page unmounted");
    }
}

impl Drop for LivePage {
    fn drop(&mut self) {
        self.unmount();
    }
}

type InFlight<T> = BoxFuture<'static, (RequestToken, Result<Option<T>, SiteError>)>;

fn start_fetch<T: Send + 'static>(
    machine: &mut PageMachine<T>,
    fetch: &FetchFn<T>,
    in_flight: &mut FuturesUnordered<InFlight<T>>,
) -> bool {
    let Some(token) = machine.begin_fetch() else {
        return false;
    };
    let fut = fetch();
    in_flight.push(Box::pin(async move { (token, fut.await) }));
    true
}

/// Forward `state` unless the page has been unmounted.
fn emit<T, S: PageSink<T>>(mounted: &RwLock<bool>, sink: &S, state: &PageState<T>) {
    let guard = mounted.read().unwrap_or_else(|e| e.into_inner());
    if *guard {
        sink.apply(state);
    }
}

async fn run_page<T, S>(
    mut events: ChangeReceiver,
    fetch: FetchFn<T>,
    sink: S,
    mounted: Arc<RwLock<bool>>,
    cancel: CancellationToken,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
) where
    T: Send + 'static,
    S: PageSink<T>,
{
    let mut machine = PageMachine::new();
    let mut in_flight: FuturesUnordered<InFlight<T>> = FuturesUnordered::new();
    let mut bus_open = true;

    if start_fetch(&mut machine, &fetch, &mut in_flight) {
        emit(&mounted, &sink, machine.state());
    }

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            Some((token, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                if let Err(e) = &outcome {
                    tracing::warn!(channel = events.channel(), error = %e, "Page fetch failed");
                }
                if machine.resolve(token, outcome) {
                    emit(&mounted, &sink, machine.state());
                } else {
                    tracing::trace!(channel = events.channel(), "Discarded stale fetch result");
                }
            }

            event = events.recv(), if bus_open => match event {
                Some(event) => {
                    tracing::debug!(channel = events.channel(), %event, "Change received, refetching");
                    if start_fetch(&mut machine, &fetch, &mut in_flight) {
                        emit(&mounted, &sink, machine.state());
                    }
                }
                None => bus_open = false,
            },

            Some(()) = refresh_rx.recv() => {
                if start_fetch(&mut machine, &fetch, &mut in_flight) {
                    emit(&mounted, &sink, machine.state());
                }
            }
        }
    }

    machine.unmount();
}
