//! Shared fixtures: a loopback HTTP server and in-process fetchers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::channel::oneshot;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use server_list_lib::Fetcher;
use server_list_lib::PageMeta;
use server_list_lib::RowKey;
use server_list_lib::ServerResponse;
use server_list_lib::error::ApiError;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

pub fn user(id: i64) -> User {
    User {
        id,
        name: format!("user{id}"),
    }
}

pub fn user_key(u: &User) -> RowKey {
    u.id.into()
}

pub fn page(ids: &[i64], current: u32, last: u32, total: u64) -> ServerResponse<User> {
    ServerResponse::new(
        ids.iter().copied().map(user).collect(),
        PageMeta {
            total,
            per_page: 10,
            current_page: current,
            last_page: last,
        },
    )
}

pub fn page_json(ids: &[i64], current: u32, last: u32, total: u64) -> String {
    let data: Vec<_> = ids.iter().map(|&id| user(id)).collect();
    json!({
        "data": data,
        "meta": {
            "total": total,
            "perPage": 10,
            "currentPage": current,
            "lastPage": last,
        }
    })
    .to_string()
}

// =============================================================================
// Loopback server
// =============================================================================

type Route = dyn Fn(&str) -> (u16, String) + Send + Sync;

/// A running mock API.
pub struct MockServer {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    /// Serves every request with `route(path_and_query)`.
    pub async fn start(route: impl Fn(&str) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let io = TokioIo::new(stream);
                let route = route.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let route = route.clone();
                        let log = log.clone();
                        async move {
                            let target = req
                                .uri()
                                .path_and_query()
                                .map(|pq| pq.to_string())
                                .unwrap_or_default();
                            log.lock().unwrap().push(target.clone());
                            let (status, body) = route(&target);
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .header("Content-Type", "application/json")
                                    .body(Full::new(Bytes::from(body)))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}/api"),
            requests,
        }
    }

    /// Request targets received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

// =============================================================================
// Fetchers
// =============================================================================

type Reply = Result<ServerResponse<User>, ApiError>;

/// Answers each request from a closure over its parameters.
pub struct FnFetcher<F>(pub F);

#[async_trait]
impl<F> Fetcher<User> for FnFetcher<F>
where
    F: Fn(&[(String, String)]) -> Reply + Send + Sync,
{
    async fn get(&self, _endpoint: &str, params: &[(String, String)]) -> Reply {
        (self.0)(params)
    }
}

/// Answers requests in order with replies released by the test.
#[derive(Default)]
pub struct ScriptedFetcher {
    pending: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl ScriptedFetcher {
    /// Queues a reply slot for the next request.
    pub fn expect(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    /// Parameters of every request received so far.
    pub fn calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher<User> for ScriptedFetcher {
    async fn get(&self, _endpoint: &str, params: &[(String, String)]) -> Reply {
        self.calls.lock().unwrap().push(params.to_vec());
        let rx = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request");
        rx.await.unwrap_or_else(|_| Err(ApiError::parse("reply dropped")))
    }
}

pub fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}
