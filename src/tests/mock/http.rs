//! A mock HTTP server for integration tests. Tests declare the exact
//! sequence of requests they expect along with the canned responses; the
//! handle asserts on drop that every expectation was consumed.

use {
    axum::http::StatusCode,
    std::{
        net::SocketAddr,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, Mutex,
        },
    },
    tokio::task::JoinHandle,
};

#[derive(Clone, Debug)]
pub enum Expectation {
    Get {
        path: String,
        status: StatusCode,
        res: serde_json::Value,
    },
    Post {
        path: String,
        req: RequestBody,
        status: StatusCode,
        res: serde_json::Value,
    },
}

#[derive(Clone, Debug)]
pub enum RequestBody {
    /// The received body has to match the provided value exactly.
    Exact(serde_json::Value),
    /// Any body is accepted.
    Any,
}

/// Drop handle that verifies that no assertion inside the server task failed
/// and that all expectations have been met.
pub struct ServerHandle {
    /// The address that handles requests to this server.
    pub address: SocketAddr,
    handle: JoinHandle<()>,
    expectations: Arc<Mutex<Vec<Expectation>>>,
    assert_failed: Arc<AtomicBool>,
}

impl ServerHandle {
    pub fn url(&self) -> reqwest::Url {
        format!("http://{}", self.address).parse().unwrap()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // Don't cause mass hysteria!
        if std::thread::panicking() {
            return;
        }

        // Panics inside the server task don't fail the test on their own;
        // surface them here.
        assert!(!self.assert_failed.load(Ordering::SeqCst));
        assert!(
            !self.handle.is_finished(),
            "mock http server terminated before test ended"
        );
        assert_eq!(
            self.expectations.lock().unwrap().len(),
            0,
            "mock server did not receive enough requests"
        );
        self.handle.abort();
    }
}

/// Sets up a mock external HTTP API.
pub async fn setup(mut expectations: Vec<Expectation>) -> ServerHandle {
    // Reverse expectations so tests can specify them in natural order while
    // the handlers simply `.pop()` the last element.
    expectations.reverse();

    let expectations = Arc::new(Mutex::new(expectations));
    let assert_failed = Arc::new(AtomicBool::new(false));

    let app = axum::Router::new()
        .route(
            "/*path",
            axum::routing::get(
                |axum::extract::State(state), axum::extract::Path(path)| async move {
                    get(state, path)
                },
            )
            .post(
                |axum::extract::State(state),
                 axum::extract::Path(path),
                 axum::extract::Json(req)| async move { post(state, path, req) },
            ),
        )
        .with_state(State {
            expectations: expectations.clone(),
            assert_failed: assert_failed.clone(),
        });

    let server = axum::Server::bind(&"0.0.0.0:0".parse().unwrap()).serve(app.into_make_service());
    let address = server.local_addr();
    let handle = tokio::spawn(async move { server.await.unwrap() });

    ServerHandle {
        handle,
        expectations,
        address,
        assert_failed,
    }
}

#[derive(Clone)]
struct State {
    expectations: Arc<Mutex<Vec<Expectation>>>,
    assert_failed: Arc<AtomicBool>,
}

/// Runs the given assertions and records a failure instead of unwinding into
/// the server task.
fn check<F>(state: &State, assertions: F) -> (StatusCode, axum::Json<serde_json::Value>)
where
    F: FnOnce() -> (StatusCode, serde_json::Value) + std::panic::UnwindSafe,
{
    match std::panic::catch_unwind(assertions) {
        Ok((status, body)) => (status, axum::Json(body)),
        Err(_) => {
            state.assert_failed.store(true, Ordering::SeqCst);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::Value::Null),
            )
        }
    }
}

fn get(state: State, path: String) -> (StatusCode, axum::Json<serde_json::Value>) {
    let expectation = state.expectations.lock().unwrap().pop();
    check(&state, move || {
        let (expected_path, status, res) = match expectation {
            Some(Expectation::Get { path, status, res }) => (path, status, res),
            Some(other) => panic!("expected GET request but got {other:?}"),
            None => panic!("got another GET request, but didn't expect any more"),
        };
        assert_eq!(path, expected_path, "GET request has unexpected path");
        (status, res)
    })
}

fn post(
    state: State,
    path: String,
    req: serde_json::Value,
) -> (StatusCode, axum::Json<serde_json::Value>) {
    let expectation = state.expectations.lock().unwrap().pop();
    check(&state, move || {
        let (expected_path, expected_req, status, res) = match expectation {
            Some(Expectation::Post {
                path,
                req,
                status,
                res,
            }) => (path, req, status, res),
            Some(other) => panic!("expected POST request but got {other:?}"),
            None => panic!("got another POST request, but didn't expect any more"),
        };
        assert_eq!(path, expected_path, "POST request has unexpected path");
        match expected_req {
            RequestBody::Exact(value) => {
                assert_eq!(req, value, "POST request has unexpected body")
            }
            RequestBody::Any => (),
        }
        (status, res)
    })
}
