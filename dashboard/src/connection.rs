use anyhow::Context;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

/// Connects to the tracker server and spawns the task that owns the socket.
///
/// Text frames from the server are forwarded to `server_to_main`; strings sent
/// on the returned channel go out as text frames. When the connection ends
/// the task exits and `server_to_main` is closed.
pub async fn spawn_server_connection_process(
    url: &str,
    server_to_main: mpsc::Sender<String>,
) -> anyhow::Result<mpsc::Sender<String>> {
    let (ws_stream, _) = connect_async(url).await.with_context(|| format!("could not connect to {url}"))?;
    tracing::info!("connected to {url}");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (main_to_server, mut server_from_main) = mpsc::channel::<String>(100);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                result = ws_receiver.next() => {
                    let msg = match result {
                        Some(Ok(msg)) => msg,
                        Some(Err(e)) => {
                            tracing::error!("error while reading from server: {e}");
                            break;
                        }
                        None => {
                            tracing::info!("server closed the connection");
                            break;
                        }
                    };
                    match msg {
                        Message::Text(text) => {
                            if server_to_main.send(text.as_str().to_owned()).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => {
                            tracing::info!("server closed the connection");
                            break;
                        }
                        _ => {}
                    }
                }
                result = server_from_main.recv() => {
                    let Some(frame) = result else { break };
                    if let Err(e) = ws_sender.send(Message::text(frame)).await {
                        tracing::error!("error while writing to server: {e}");
                        break;
                    }
                }
            }
        }
    });

    Ok(main_to_server)
}
