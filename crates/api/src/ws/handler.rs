use std::sync::{Arc, RwLock};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use beyond_core::language::Language;
use beyond_site::SitePage;
use futures::{SinkExt, StreamExt};

use crate::error::AppResult;
use crate::handlers::pages::PageQuery;
use crate::preferences::RequestLanguage;
use crate::state::AppState;
use crate::ws::session::{self, ServerFrame};

/// GET /api/v1/ws/pages/{page}
///
/// Upgrade to a live page session. The page is validated before the
/// upgrade so an unknown page is a plain 400.
pub async fn page_session(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
    RequestLanguage(ctx): RequestLanguage,
) -> AppResult<impl IntoResponse> {
    let page = SitePage::parse(&name, query.slug, query.limit)?;
    let language = query.lang.unwrap_or(ctx.language());
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, page, language)))
}

/// Drive one live page connection until either side closes.
async fn handle_socket(socket: WebSocket, state: AppState, page: SitePage, language: Language) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let page_name = page.name();
    tracing::info!(conn_id = %conn_id, page = page_name, "Live page connected");

    let (tx, mut rx) = state.ws_manager.add(conn_id.clone(), page_name).await;
    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let language = Arc::new(RwLock::new(language));
    let mut live = match session::mount(
        &state.bus,
        state.content.clone(),
        page,
        Arc::clone(&language),
        tx.clone(),
        &conn_id,
    ) {
        Ok(live) => live,
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to mount live page");
            state.ws_manager.remove(&conn_id).await;
            send_task.abort();
            return;
        }
    };

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => {
                if let Some(reply) = session::handle_client_text(text.as_str(), &language, &live)
                    .and_then(|frame: ServerFrame| frame.to_message())
                {
                    let _ = tx.send(reply);
                }
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    live.unmount();
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, page = page_name, "Live page disconnected");
}
