use std::{
    collections::VecDeque,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    oneshot,
};

use super::PoolConfig;
use crate::{
    Connection, Result,
    common::{error, verbose},
};

pub type AcquireSend = oneshot::Sender<Result<Connection>>;
pub type AcquireRecv = oneshot::Receiver<Result<Connection>>;

enum WorkerMessage {
    Acquire(AcquireSend),
    Release(Connection),
}

#[derive(Clone)]
pub struct WorkerHandle {
    send: UnboundedSender<WorkerMessage>,
}

impl WorkerHandle {
    pub fn new(config: PoolConfig) -> (Self, WorkerFuture) {
        let (send, recv) = mpsc::unbounded_channel();
        (
            Self { send },
            WorkerFuture {
                config,
                actives: 0,
                conns: VecDeque::new(),
                queue: VecDeque::with_capacity(1),
                recv,
                connecting: None,
            },
        )
    }

    pub fn acquire(&self) -> AcquireRecv {
        let (tx, rx) = oneshot::channel();
        // worker only exits once every handle is dropped
        self.send.send(WorkerMessage::Acquire(tx)).expect("pool worker closed");
        rx
    }

    pub fn release(&self, conn: Connection) {
        if self.send.send(WorkerMessage::Release(conn)).is_err() {
            verbose!("pool worker closed, connection dropped");
        }
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WorkerHandle")
    }
}

type ConnectFuture = Pin<Box<dyn Future<Output = Result<Connection>> + Send + 'static>>;

pub struct WorkerFuture {
    config: PoolConfig,
    /// connections handed out or idle
    actives: usize,
    /// front is the most recently used
    conns: VecDeque<Connection>,
    queue: VecDeque<AcquireSend>,
    recv: UnboundedReceiver<WorkerMessage>,
    connecting: Option<ConnectFuture>,
}

impl Future for WorkerFuture {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let WorkerFuture { config, actives, conns, queue, recv, connecting } = self.as_mut().get_mut();

        macro_rules! tracew {
            ($prefix:literal) => {
                verbose!(
                    "{:9}: Active={actives}, Idle={}, Connecting={}, Queued={}",
                    $prefix,
                    conns.len(),
                    connecting.is_some() as u8,
                    queue.len(),
                );
            };
        }

        loop {
            while let Poll::Ready(msg) = recv.poll_recv(cx) {
                let Some(msg) = msg else {
                    // all Pools handle are dropped
                    return Poll::Ready(());
                };

                match msg {
                    WorkerMessage::Acquire(send) => {
                        queue.push_back(send);
                        tracew!("Acquire");
                    }
                    WorkerMessage::Release(conn) => {
                        if conn.is_broken() {
                            *actives -= 1;
                            drop(conn);
                            tracew!("Discarded");
                        } else {
                            conns.push_front(conn);
                            tracew!("Released");
                        }
                    }
                }
            }

            if let Some(Poll::Ready(result)) = connecting.as_mut().map(|f| f.as_mut().poll(cx)) {
                connecting.take();
                match result {
                    Ok(conn) => {
                        *actives += 1;
                        conns.push_front(conn);
                        tracew!("New");
                    }
                    Err(err) => {
                        error!("failed to connect: {err}");
                        if let Some(send) = queue.pop_front() {
                            let _ = send.send(Err(err));
                        }
                    }
                }
            }

            let mut started = false;

            while let Some(send) = queue.pop_front() {
                if send.is_closed() {
                    continue;
                }
                match conns.pop_front() {
                    Some(conn) => {
                        if let Err(Ok(conn)) = send.send(Ok(conn)) {
                            conns.push_front(conn);
                        }
                    }
                    None => {
                        queue.push_front(send);
                        if connecting.is_none() && *actives < config.max_conn {
                            *connecting = Some(Box::pin(Connection::connect_with(config.conn.clone())));
                            started = true;
                        }
                        break;
                    }
                }
            }

            // poll the new connect future to register its waker
            if !started {
                return Poll::Pending;
            }
        }
    }
}
