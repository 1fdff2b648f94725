//! In-process network and platform fakes for policy tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;
use volta_client::Network;
use volta_core::{CacheDb, Error, Headers, Request, Response, ResponseType, WorkerConfig};

use crate::platform::{Notification, Platform, WindowClient};
use crate::worker::Worker;

pub const SCOPE: &str = "https://app.example/";

pub fn ok_html(body: &str) -> Response {
    let mut headers = Headers::new();
    headers.insert("Content-Type", "text/html");
    Response {
        status: 200,
        status_text: "OK".into(),
        headers,
        body: Bytes::from(body.to_string()),
        url: None,
        response_type: ResponseType::Basic,
    }
}

pub trait ResponseExt {
    fn with_status(self, status: u16) -> Self;
    fn with_type(self, response_type: ResponseType) -> Self;
}

impl ResponseExt for Response {
    fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }
}

pub fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
}

/// Serves canned responses by URL and records every call.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Option<Response>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn serve(&self, url: &str, response: Response) {
        self.routes.lock().unwrap().insert(url.to_string(), Some(response));
    }

    pub fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), None);
    }

    /// Serve a 200 for every manifest entry, typed by origin.
    pub fn serve_all_manifest(&self, worker: &Worker) {
        for url in worker.manifest() {
            let response_type = if url.origin() == worker.scope().origin() {
                ResponseType::Basic
            } else {
                ResponseType::Cors
            };
            self.serve(url.as_str(), ok_html(url.as_str()).with_type(response_type));
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        match self.routes.lock().unwrap().get(&url) {
            Some(Some(response)) => Ok(response.clone()),
            _ => Err(Error::Network(format!("{url}: connection refused"))),
        }
    }
}

/// Records notifications and window operations.
#[derive(Default)]
pub struct RecordingPlatform {
    pub periodic_sync: bool,
    windows: Mutex<Vec<WindowClient>>,
    pub shown: Mutex<Vec<Notification>>,
    pub closed: Mutex<Vec<Notification>>,
    pub focused: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<Url>>,
}

impl RecordingPlatform {
    pub fn with_periodic_sync() -> Self {
        Self { periodic_sync: true, ..Default::default() }
    }

    pub fn set_open_windows(&self, urls: &[&str]) {
        *self.windows.lock().unwrap() = urls
            .iter()
            .enumerate()
            .map(|(idx, url)| WindowClient { id: format!("window-{idx}"), url: Url::parse(url).unwrap(), focused: false })
            .collect();
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) {
        self.closed.lock().unwrap().push(notification.clone());
    }

    async fn match_all_windows(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.windows.lock().unwrap().clone())
    }

    async fn focus(&self, client: &WindowClient) -> Result<(), Error> {
        self.focused.lock().unwrap().push(client.id.clone());
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<Option<WindowClient>, Error> {
        self.opened.lock().unwrap().push(url.clone());
        Ok(Some(WindowClient { id: "window-new".into(), url: url.clone(), focused: true }))
    }

    async fn claim_clients(&self) -> Result<usize, Error> {
        Ok(self.windows.lock().unwrap().len())
    }

    fn supports_periodic_sync(&self) -> bool {
        self.periodic_sync
    }
}

pub struct Harness {
    pub worker: Worker,
    pub cache: CacheDb,
    pub network: Arc<ScriptedNetwork>,
    pub platform: Arc<RecordingPlatform>,
}

impl Harness {
    pub async fn with_manifest(entries: &[&str]) -> Self {
        Self::build(entries, RecordingPlatform::default()).await
    }

    pub async fn with_platform(entries: &[&str], platform: RecordingPlatform) -> Self {
        Self::build(entries, platform).await
    }

    /// Installed and activated, with every manifest entry cached.
    pub async fn activated(entries: &[&str]) -> Self {
        let harness = Self::with_manifest(entries).await;
        harness.network.serve_all_manifest(&harness.worker);
        harness.worker.install().await.unwrap();
        harness.worker.activate().await.unwrap();
        harness
    }

    async fn build(entries: &[&str], platform: RecordingPlatform) -> Self {
        let config = WorkerConfig {
            version_tag: "v3".into(),
            scope: SCOPE.into(),
            manifest: entries.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        };
        let cache = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(ScriptedNetwork::default());
        let platform = Arc::new(platform);
        let worker = Worker::new(Arc::new(config), cache.clone(), network.clone(), platform.clone()).unwrap();

        Self { worker, cache, network, platform }
    }
}
