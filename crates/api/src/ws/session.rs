//! Wiring between a websocket connection and its [`LivePage`].

use std::sync::{Arc, RwLock};

use axum::extract::ws::Message;
use beyond_core::language::Language;
use beyond_core::page::PageState;
use beyond_events::ChangeBus;
use beyond_site::live::FetchFn;
use beyond_site::{LivePage, PageSink, PageView, SiteContent, SiteError, SitePage};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::handlers::pages::PageBody;
use crate::ws::manager::WsSender;

/// Language of one session; changed by `set_language` messages.
pub type SharedLanguage = Arc<RwLock<Language>>;

fn current(language: &SharedLanguage) -> Language {
    *language.read().unwrap_or_else(|e| e.into_inner())
}

/// Frames sent to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Page(PageBody),
    Error { message: String },
}

impl ServerFrame {
    pub fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize frame");
                None
            }
        }
    }
}

/// Messages accepted from the client.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Re-render the page in another language.
    SetLanguage { language: Language },
    /// Refetch now.
    Refresh,
}

/// Forwards page states to the socket writer.
pub struct SocketSink {
    page: SitePage,
    language: SharedLanguage,
    sender: WsSender,
}

impl SocketSink {
    pub fn new(page: SitePage, language: SharedLanguage, sender: WsSender) -> Self {
        Self {
            page,
            language,
            sender,
        }
    }
}

impl PageSink<PageView> for SocketSink {
    fn apply(&self, state: &PageState<PageView>) {
        let body = PageBody::new(&self.page, state, current(&self.language));
        if let Some(msg) = ServerFrame::Page(body).to_message() {
            let _ = self.sender.send(msg);
        }
    }
}

/// Mount `page` for connection `conn_id`, rendering through `content` in
/// the session's current language.
pub fn mount(
    bus: &ChangeBus,
    content: SiteContent,
    page: SitePage,
    language: SharedLanguage,
    sender: WsSender,
    conn_id: &str,
) -> Result<LivePage, SiteError> {
    let fetch: FetchFn<PageView> = {
        let page = page.clone();
        let language = Arc::clone(&language);
        Arc::new(move || {
            let content = content.clone();
            let page = page.clone();
            let lang = current(&language);
            async move { content.render(&page, lang).await }.boxed()
        })
    };

    let channel = format!("ws-{}-{conn_id}", page.name());
    let table = page.watched_table();
    let sink = SocketSink::new(page, language, sender);
    LivePage::mount(bus, channel, table, fetch, sink)
}

/// Apply one client text message to the session.
pub fn handle_client_text(text: &str, language: &SharedLanguage, page: &LivePage) -> Option<ServerFrame> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::SetLanguage { language: next }) => {
            *language.write().unwrap_or_else(|e| e.into_inner()) = next;
            page.refresh();
            None
        }
        Ok(ClientMessage::Refresh) => {
            page.refresh();
            None
        }
        Err(e) => Some(ServerFrame::Error {
            message: format!("Unrecognised message: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn client_messages_parse() {
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"set_language","language":"ar"}"#)
                .unwrap(),
            ClientMessage::SetLanguage {
                language: Language::Ar
            }
        );
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"refresh"}"#).unwrap(),
            ClientMessage::Refresh
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"nope"}"#).is_err());
    }

    #[test]
    fn sink_sends_page_frame() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let language = Arc::new(RwLock::new(Language::Ar));
        let sink = SocketSink::new(SitePage::Contact, language, tx);

        sink.apply(&PageState::Loading);

        let Ok(Message::Text(text)) = rx.try_recv() else {
            panic!("expected a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["type"], "page");
        assert_eq!(json["page"], "contact");
        assert_eq!(json["state"], "loading");
        assert_eq!(json["document"]["dir"], "rtl");
    }
}
