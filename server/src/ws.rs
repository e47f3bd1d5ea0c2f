use anyhow::Context;
use futures::{FutureExt, StreamExt};
use msgs::{ClientServerMsg, ServerClientMsg};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

use crate::{
    context::TrackerContextRef,
    tracking::{apply_edit_name, apply_location_update, UpdateRejected},
};

pub async fn frontend_connection_process(ws: WebSocket, context_ref: TrackerContextRef) {
    let (frontend_ws_sender, mut frontend_ws_rcv) = ws.split();
    let (to_frontend_connection_process, front_end_connection_process_rcv) = mpsc::unbounded_channel();

    let front_end_connection_rcv_unbounded_receiver_stream = UnboundedReceiverStream::new(front_end_connection_process_rcv);
    tokio::task::spawn(front_end_connection_rcv_unbounded_receiver_stream.forward(frontend_ws_sender).map(|result| {
        if let Err(e) = result {
            tracing::warn!("error sending websocket msg: {e}");
        }
    }));

    let id = Uuid::new_v4().as_simple().to_string();

    context_ref.write().await.to_frontend_senders.insert(id.clone(), to_frontend_connection_process);

    tracing::info!("{id} connected");

    while let Some(result) = frontend_ws_rcv.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("error receiving ws message for {id}: {e}");
                break;
            }
        };
        if msg.is_close() {
            break;
        }
        if let Err(e) = client_msg(&id, msg, &context_ref).await {
            tracing::warn!("dropping message from {id}: {e:#}");
        }
    }

    context_ref.write().await.to_frontend_senders.remove(&id);
    tracing::info!("{id} disconnected");
}

pub async fn process_client_msg(
    client_msg: ClientServerMsg,
    context_ref: &TrackerContextRef,
) -> Result<ServerClientMsg, UpdateRejected> {
    match client_msg {
        ClientServerMsg::LocationUpdate(update) => apply_location_update(update, context_ref).await,
        ClientServerMsg::EditName(edit) => apply_edit_name(edit, context_ref).await,
    }
}

async fn client_msg(id: &str, msg: Message, context_ref: &TrackerContextRef) -> anyhow::Result<()> {
    // pings and binary frames carry nothing for us
    let Ok(message) = msg.to_str() else { return Ok(()) };
    tracing::debug!("received message from {id}: {message}");

    let Some(client_msg) = ClientServerMsg::decode(message.trim())? else {
        tracing::debug!("ignoring unsupported event from {id}");
        return Ok(());
    };

    let event = client_msg.event_name();
    process_client_msg(client_msg, context_ref).await.with_context(|| format!("{event} rejected"))?;
    Ok(())
}
