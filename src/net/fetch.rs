//! Background range re-query worker
//!
//! Keeps the UI at frame rate while a range change is in flight: requests go
//! to a worker thread over a channel, the app polls for results every frame.
//! Each request carries the caller's sequence number; sequencing decisions
//! (stale-response discard) stay with the caller.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::constants::net::REQUEST_TIMEOUT_SECS;
use crate::data::payload::WirePayload;
use crate::error::{InsightError, Result};

/// Envelope of the insight data endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AjaxResponse {
    pub view_model: WirePayload,
    pub selected_range: String,
    #[serde(default)]
    pub custom_range_active: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Set when the backend served its fallback model
    #[serde(default)]
    pub error: bool,
}

/// Requests that can be sent to the fetch worker
pub enum FetchRequest {
    /// Re-query the insight endpoint
    Range { seq: u64, url: String },
    /// Shutdown the worker
    Shutdown,
}

/// Results returned from the fetch worker
pub enum FetchResult {
    Loaded { seq: u64, response: AjaxResponse },
    Failed { seq: u64, error: InsightError },
}

/// Background worker that performs fetches off the main thread
pub struct FetchWorker {
    tx: Sender<FetchRequest>,
    rx: Receiver<FetchResult>,
    handle: Option<JoinHandle<()>>,
}

impl FetchWorker {
    /// Spawn a new fetch worker thread
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = channel::<FetchRequest>();
        let (res_tx, res_rx) = channel::<FetchResult>();

        let handle = thread::spawn(move || {
            Self::worker_loop(req_rx, res_tx);
        });

        Self { tx: req_tx, rx: res_rx, handle: Some(handle) }
    }

    fn worker_loop(rx: Receiver<FetchRequest>, tx: Sender<FetchResult>) {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build();

        while let Ok(request) = rx.recv() {
            let result = match request {
                FetchRequest::Range { seq, url } => match &client {
                    Ok(client) => match Self::fetch(client, &url) {
                        Ok(response) => FetchResult::Loaded { seq, response },
                        Err(error) => FetchResult::Failed { seq, error },
                    },
                    Err(e) => FetchResult::Failed {
                        seq,
                        error: InsightError::Config(format!("http client: {e}")),
                    },
                },
                FetchRequest::Shutdown => break,
            };

            if tx.send(result).is_err() {
                break;
            }
        }
    }

    fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<AjaxResponse> {
        let response = client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::EndpointStatus { status: status.as_u16() });
        }
        Ok(response.json::<AjaxResponse>()?)
    }

    /// Send a request to the worker (non-blocking)
    pub fn request(&self, req: FetchRequest) {
        let _ = self.tx.send(req);
    }

    /// Poll for a completed fetch (non-blocking)
    pub fn poll(&self) -> Option<FetchResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(FetchRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve one canned HTTP response on a local port
    fn one_shot_server(body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn poll_blocking(worker: &FetchWorker) -> FetchResult {
        for _ in 0..200 {
            if let Some(result) = worker.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(25));
        }
        panic!("fetch worker did not answer in time");
    }

    #[test]
    fn test_envelope_decoding() {
        let json = serde_json::json!({
            "viewModel": {
                "metricOptions": [
                    { "metric": "A", "label": "a", "unit": "COUNT" }
                ],
                "series": [],
                "componentLabels": {}
            },
            "selectedRange": "recent-14",
            "customRangeActive": false,
            "startDate": "2024-02-26",
            "endDate": "2024-03-10",
            "error": false
        });
        let response: AjaxResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.selected_range, "recent-14");
        assert_eq!(
            response.start_date,
            NaiveDate::from_ymd_opt(2024, 2, 26)
        );
        assert!(!response.error);
    }

    #[test]
    fn test_worker_loads_canned_response() {
        let body = serde_json::json!({
            "viewModel": { "metricOptions": [], "series": [], "componentLabels": {} },
            "selectedRange": "all",
            "customRangeActive": false,
            "startDate": null,
            "endDate": null,
            "error": false
        })
        .to_string();
        let base = one_shot_server(body);

        let worker = FetchWorker::spawn();
        worker.request(FetchRequest::Range { seq: 7, url: format!("{base}/service-insight?range=all") });

        match poll_blocking(&worker) {
            FetchResult::Loaded { seq, response } => {
                assert_eq!(seq, 7);
                assert_eq!(response.selected_range, "all");
            }
            FetchResult::Failed { error, .. } => panic!("unexpected failure: {error}"),
        }
    }

    #[test]
    fn test_worker_reports_connection_failure() {
        // A listener that is immediately dropped leaves a refused port
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let worker = FetchWorker::spawn();
        worker.request(FetchRequest::Range {
            seq: 1,
            url: format!("http://127.0.0.1:{port}/service-insight"),
        });

        match poll_blocking(&worker) {
            FetchResult::Failed { seq, .. } => assert_eq!(seq, 1),
            FetchResult::Loaded { .. } => panic!("expected a transport failure"),
        }
    }
}
