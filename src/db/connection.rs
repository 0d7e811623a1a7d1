use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::{kv_store, schema::ensure_schema};

type Reply<T> = oneshot::Sender<Result<T>>;

/// One key-value operation, answered on its own oneshot.
enum Request {
    Get {
        key: String,
        reply: Reply<Option<String>>,
    },
    Set {
        key: String,
        value: String,
        reply: Reply<()>,
    },
    Remove {
        key: String,
        reply: Reply<bool>,
    },
}

impl Request {
    fn serve(self, conn: &Connection) {
        let delivered = match self {
            Request::Get { key, reply } => reply.send(kv_store::get(conn, &key)).is_ok(),
            Request::Set { key, value, reply } => {
                reply.send(kv_store::set(conn, &key, &value)).is_ok()
            }
            Request::Remove { key, reply } => reply.send(kv_store::remove(conn, &key)).is_ok(),
        };
        if !delivered {
            debug!("Storage caller went away before its reply");
        }
    }
}

struct Worker {
    requests: Option<mpsc::Sender<Request>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the channel ends the serve loop; join so the file is released.
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Storage thread panicked");
            }
        }
    }
}

/// Handle to the session database. Clones share one worker thread, which is
/// the only owner of the SQLite connection.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

impl Database {
    /// Opens (creating if needed) the database file and starts its worker.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let (requests, inbox) = mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let thread_path = path.clone();

        let thread = thread::Builder::new()
            .name("focusdeck-db".into())
            .spawn(move || {
                let conn = match open_connection(&thread_path) {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                if ready_tx.send(Ok(())).is_err() {
                    return;
                }

                for request in inbox {
                    request.serve(&conn);
                }
                debug!("Storage thread stopped");
            })
            .context("failed to spawn storage thread")?;

        ready_rx
            .recv()
            .context("storage thread exited during startup")??;
        info!("Session database ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                requests: Some(requests),
                thread: Some(thread),
            }),
        })
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.request(|reply| Request::Get {
            key: key.to_string(),
            reply,
        })
        .await
    }

    /// Inserts or replaces the value stored under `key`.
    pub async fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.request(|reply| Request::Set {
            key: key.to_string(),
            value,
            reply,
        })
        .await
    }

    /// Returns whether a value was removed.
    pub async fn remove_item(&self, key: &str) -> Result<bool> {
        self.request(|reply| Request::Remove {
            key: key.to_string(),
            reply,
        })
        .await
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Request) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.worker
            .requests
            .as_ref()
            .ok_or_else(|| anyhow!("storage thread has shut down"))?
            .send(build(reply))
            .map_err(|_| anyhow!("storage thread is not running"))?;

        response
            .await
            .map_err(|_| anyhow!("storage thread dropped the request"))?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        warn!("Could not enable WAL journal: {err}");
    }
    ensure_schema(&mut conn)?;
    Ok(conn)
}
