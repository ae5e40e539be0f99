use crate::gui_bridge::sessions::SessionStore;
use crate::workflow::runner::Runner;
use anyhow::{anyhow, Context};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{mpsc, Arc, Mutex},
    thread,
};
use stubblecore::prelude::FireError;
use stubblecore::session::{Action, DashboardView};
use tokio::runtime::Builder;
use warp::{
    http::StatusCode,
    reply::{self, Response},
    Filter, Rejection, Reply,
};

pub type SharedStore = Arc<Mutex<SessionStore>>;

/// Body returned by `POST /session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub id: u64,
    pub view: DashboardView,
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    reply::with_status(reply::json(&json!({ "error": message })), status).into_response()
}

fn poisoned() -> Response {
    error_reply(StatusCode::INTERNAL_SERVER_ERROR, "session store unavailable")
}

fn create_session(runner: Arc<Runner>, store: SharedStore) -> Response {
    let Ok(mut store) = store.lock() else {
        return poisoned();
    };
    let id = store.create(runner.start_session());
    let view = match store.get(id) {
        Some(entry) => runner.view(&entry.state, &entry.notices),
        None => return poisoned(),
    };
    info!("session {} started ({} live)", id, store.len());
    reply::json(&SessionCreated { id, view }).into_response()
}

fn session_view(id: u64, runner: Arc<Runner>, store: SharedStore) -> Response {
    let Ok(store) = store.lock() else {
        return poisoned();
    };
    match store.get(id) {
        Some(entry) => reply::json(&runner.view(&entry.state, &entry.notices)).into_response(),
        None => error_reply(StatusCode::NOT_FOUND, format!("unknown session {id}")),
    }
}

fn end_session(id: u64, store: SharedStore) -> Response {
    let Ok(mut store) = store.lock() else {
        return poisoned();
    };
    match store.remove(id) {
        Some(_) => {
            info!("session {} ended ({} live)", id, store.len());
            reply::json(&json!({ "ended": id })).into_response()
        }
        None => error_reply(StatusCode::NOT_FOUND, format!("unknown session {id}")),
    }
}

fn session_action(id: u64, action: Action, runner: Arc<Runner>, store: SharedStore) -> Response {
    let Ok(mut store) = store.lock() else {
        return poisoned();
    };
    let Some(entry) = store.get_mut(id) else {
        return error_reply(StatusCode::NOT_FOUND, format!("unknown session {id}"));
    };

    match runner.execute(&mut entry.state, action, &mut entry.rng) {
        Ok(outcome) => {
            entry.notices = outcome.notices;
            reply::json(&runner.view(&entry.state, &entry.notices)).into_response()
        }
        Err(err @ FireError::UnknownDistrict(_)) => {
            warn!("session {}: {}", id, err);
            error_reply(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!("session {}: {}", id, err);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// All dashboard routes.
pub fn routes(
    runner: Arc<Runner>,
    store: SharedStore,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let runner_filter = warp::any().map(move || runner.clone());
    let store_filter = warp::any().map(move || store.clone());

    let districts = warp::path!("districts")
        .and(warp::get())
        .and(runner_filter.clone())
        .map(|runner: Arc<Runner>| reply::json(&runner.table().names()).into_response());

    let create = warp::path!("session")
        .and(warp::post())
        .and(runner_filter.clone())
        .and(store_filter.clone())
        .map(create_session);

    let view = warp::path!("session" / u64 / "view")
        .and(warp::get())
        .and(runner_filter.clone())
        .and(store_filter.clone())
        .map(session_view);

    let end = warp::path!("session" / u64)
        .and(warp::delete())
        .and(store_filter.clone())
        .map(end_session);

    let action = warp::path!("session" / u64 / "action")
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter.clone())
        .and(store_filter)
        .map(session_action);

    let stats = warp::path!("stats")
        .and(warp::get())
        .and(runner_filter)
        .map(|runner: Arc<Runner>| reply::json(&runner.metrics()).into_response());

    districts
        .or(create)
        .unify()
        .or(view)
        .unify()
        .or(end)
        .unify()
        .or(action)
        .unify()
        .or(stats)
        .unify()
}

/// Hosts the dashboard HTTP endpoints on a background thread.
pub struct GuiBridge {
    store: SharedStore,
    address: SocketAddr,
}

impl GuiBridge {
    /// Binds `address` before returning; a bind failure is an error here,
    /// not a log line on the server thread.
    pub fn new(
        runner: Arc<Runner>,
        store: SessionStore,
        address: SocketAddr,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(Mutex::new(store));
        let filter = routes(runner, store.clone());
        let (bound_tx, bound_rx) = mpsc::channel::<Result<SocketAddr, String>>();

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = bound_tx.send(Err(format!("building bridge runtime: {err}")));
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(filter).try_bind_ephemeral(address) {
                    Ok((bound, server)) => {
                        let _ = bound_tx.send(Ok(bound));
                        server.await;
                    }
                    Err(err) => {
                        let _ = bound_tx.send(Err(err.to_string()));
                    }
                }
            });
        });

        let bound = bound_rx
            .recv()
            .context("bridge thread exited before binding")?
            .map_err(|err| anyhow!("cannot bind dashboard bridge to {}: {}", address, err))?;
        info!("dashboard bridge listening on http://{}", bound);

        Ok(Self {
            store,
            address: bound,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    pub fn live_sessions(&self) -> usize {
        self.store.lock().map(|store| store.len()).unwrap_or(0)
    }
}
