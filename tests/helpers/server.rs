//! An axum app answering canned JSON, so trackers can be tested without a network.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};

#[derive(Clone, Debug)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn ok(path: &str, body: &str) -> Self {
        Self::new(path, 200, body)
    }

    pub fn new(path: &str, status: u16, body: &str) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: body.to_string(),
        }
    }
}

/// One request as the server saw it. Header names are lowercase.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for RecordedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.method, self.uri)?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

/// Every request the server received, in order.
#[derive(Clone, Debug, Default)]
pub struct Requests(Arc<Mutex<Vec<RecordedRequest>>>);

impl Requests {
    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    /// The first request whose path is `path`.
    pub fn find(&self, path: &str) -> RecordedRequest {
        self.all()
            .into_iter()
            .find(|request| request.uri.path() == path)
            .unwrap_or_else(|| panic!("no request to {path} in {:?}", self.all()))
    }
}

#[derive(Clone)]
struct Stub {
    routes: Arc<Vec<Route>>,
    requests: Requests,
}

pub struct StubServer {
    pub base_url: String,
    pub requests: Requests,
}

impl StubServer {
    /// Serve `routes` on a random local port. Unknown paths get a 404.
    ///
    /// The server runs on the current Tokio runtime for as long as the test does.
    pub async fn start(routes: Vec<Route>) -> Self {
        let requests = Requests::default();
        let app = Router::new().fallback(respond).with_state(Stub {
            routes: Arc::new(routes),
            requests: requests.clone(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve") });
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }
}

async fn respond(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    stub.requests.0.lock().unwrap().push(RecordedRequest {
        method,
        uri,
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
    });

    let (status, body) = stub
        .routes
        .iter()
        .find(|route| route.path == path)
        .map_or((404, "{}".to_string()), |route| {
            (route.status, route.body.clone())
        });
    (
        StatusCode::from_u16(status).expect("valid status code"),
        [(CONTENT_TYPE, "application/json")],
        body,
    )
}
