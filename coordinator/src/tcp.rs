use log::{debug, error, info};
use shared::{
    config::RenderConfig,
    dtos::render_report::RenderReport,
    error::RenderResult,
    models::fragments::messages::{CoordinatorMessage, WorkerEvent, WorkerId},
    networking::{
        error::NetworkingError,
        protocol::{self, Message, Registration},
        result::NetworkingResult,
        server::ServerConfig,
    },
};
use tokio::{
    io::AsyncWriteExt,
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
    sync::mpsc::{self, Sender},
    task::JoinHandle,
};

use crate::render;

/// Accepts `server.worker_count` workers, then renders with them.
pub async fn run_coordinator(
    server: &ServerConfig,
    config: &RenderConfig,
) -> RenderResult<RenderReport> {
    let listener = start_server(&server.socket_address()).await?;
    info!(
        "Coordinator listening on {}, waiting for {} worker(s)",
        server.socket_address(),
        server.worker_count
    );
    serve(listener, server.worker_count, config).await
}

/// Same as [`run_coordinator`] on an already bound listener. Returns only after
/// every queued frame, Termination included, has been written.
pub async fn serve(
    listener: TcpListener,
    worker_count: usize,
    config: &RenderConfig,
) -> RenderResult<RenderReport> {
    let (event_tx, events) = mpsc::channel(worker_count.max(1));
    let mut links = Vec::with_capacity(worker_count);
    let mut writers = Vec::with_capacity(worker_count);
    let mut readers = Vec::with_capacity(worker_count);

    while links.len() < worker_count {
        let (mut socket, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let id = WorkerId(links.len());
        let registration = read_registration(&mut socket).await?;
        registration.check(config)?;
        info!(
            "Worker '{}' connected from {} as {}",
            registration.name, peer, id
        );

        let (reader, writer) = socket.into_split();
        let (link, handle) = spawn_writer(id, writer, event_tx.clone());
        links.push(link);
        writers.push(handle);
        readers.push(spawn_reader(id, reader, event_tx.clone()));
    }
    drop(event_tx);

    // The scheduler drops every link when it returns, so each writer stops
    // once its last frame is out.
    let result = render(config, links, events).await;
    for (index, writer) in writers.into_iter().enumerate() {
        if let Err(e) = writer.await {
            error!("Writer for worker {} failed: {}", WorkerId(index), e);
        }
    }
    for reader in readers {
        reader.abort();
    }
    result
}

async fn start_server(addr: &str) -> NetworkingResult<TcpListener> {
    Ok(TcpListener::bind(addr).await?)
}

async fn read_registration(socket: &mut TcpStream) -> NetworkingResult<Registration> {
    match protocol::receive(socket).await? {
        Message::Register(registration) => Ok(registration),
        other => Err(NetworkingError::UnexpectedMessage {
            expected: "Register",
            got: other.kind().to_string(),
        }),
    }
}

/// Forwards scheduler messages to the socket. A write failure is reported
/// as an event so the scheduler does not wait for a completion forever.
fn spawn_writer(
    id: WorkerId,
    mut writer: OwnedWriteHalf,
    events: Sender<WorkerEvent>,
) -> (Sender<CoordinatorMessage>, JoinHandle<()>) {
    let (link, mut outgoing) = mpsc::channel::<CoordinatorMessage>(1);
    let handle = tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let terminate = message == CoordinatorMessage::Terminate;
            if let Err(e) = protocol::send(&mut writer, &Message::from(message)).await {
                error!("Failed to send to worker {}: {}", id, e);
                _ = events
                    .send(WorkerEvent {
                        worker: id,
                        outcome: Err(e),
                    })
                    .await;
                return;
            }
            if terminate {
                _ = writer.shutdown().await;
                return;
            }
        }
    });
    (link, handle)
}

/// Turns completion frames from one worker into scheduler events.
fn spawn_reader(
    id: WorkerId,
    mut reader: OwnedReadHalf,
    events: Sender<WorkerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let outcome = match protocol::receive(&mut reader).await {
                Ok(Message::Completion(completion)) => Ok(completion),
                Ok(other) => Err(NetworkingError::UnexpectedMessage {
                    expected: "Completion",
                    got: other.kind().to_string(),
                }),
                Err(NetworkingError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    Err(NetworkingError::Disconnected(id))
                }
                Err(e) => Err(e),
            };

            let failed = outcome.is_err();
            if events
                .send(WorkerEvent {
                    worker: id,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!("Scheduler finished, dropping reader for worker {}", id);
                return;
            }
            if failed {
                return;
            }
        }
    })
}
