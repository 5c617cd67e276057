use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::json;
use tracing::warn;

use crate::error::TelemetryError;
use crate::session::summary::SessionSummary;
use crate::telemetry::{AttemptRecord, TelemetrySink};

enum Event {
    SessionStarted { user_id: String, skill_id: u32 },
    Attempt(Box<AttemptRecord>),
    SessionFinished,
    Report(Box<SessionSummary>),
}

/// HTTP transport for attempt telemetry and end-of-session reports.
///
/// Engine calls only enqueue onto a channel; a background worker owns the
/// blocking client, resolves the backend session id, and performs the POSTs.
/// Every failure is logged and dropped, never retried. Dropping the handle
/// hangs up the channel; the worker then closes the backend session
/// best-effort and exits, so an abandoned session leaks nothing.
pub struct HttpTelemetry {
    tx: mpsc::Sender<Event>,
}

impl HttpTelemetry {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || run_worker(&base_url, rx));
        Self { tx }
    }

    fn send(&self, event: Event) -> Result<(), TelemetryError> {
        self.tx
            .send(event)
            .map_err(|_| TelemetryError::ChannelClosed)
    }
}

impl TelemetrySink for HttpTelemetry {
    fn session_started(&mut self, user_id: &str, skill_id: u32) -> Result<(), TelemetryError> {
        self.send(Event::SessionStarted {
            user_id: user_id.to_string(),
            skill_id,
        })
    }

    fn attempt(&mut self, attempt: &AttemptRecord) -> Result<(), TelemetryError> {
        self.send(Event::Attempt(Box::new(attempt.clone())))
    }

    fn session_finished(&mut self) -> Result<(), TelemetryError> {
        self.send(Event::SessionFinished)
    }

    fn report(&mut self, summary: &SessionSummary) -> Result<(), TelemetryError> {
        self.send(Event::Report(Box::new(summary.clone())))
    }
}

fn run_worker(base_url: &str, rx: mpsc::Receiver<Event>) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "telemetry client unavailable, discarding events");
            while rx.recv().is_ok() {}
            return;
        }
    };

    let mut session_id: Option<i64> = None;
    let mut finished = false;

    while let Ok(event) = rx.recv() {
        match event {
            Event::SessionStarted { user_id, skill_id } => {
                session_id = create_session(&client, base_url, &user_id, skill_id);
                finished = false;
            }
            Event::Attempt(attempt) => {
                let mut payload = match serde_json::to_value(&*attempt) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(error = %err, "attempt not serializable, dropped");
                        continue;
                    }
                };
                if let (Some(id), Some(map)) = (session_id, payload.as_object_mut()) {
                    map.insert("session_id".to_string(), json!(id));
                }
                post(&client, &format!("{base_url}/api/v1/practice/attempts"), &payload);
            }
            Event::SessionFinished => {
                if let Some(id) = session_id {
                    post(
                        &client,
                        &format!("{base_url}/api/v1/practice/sessions/{id}/finish"),
                        &json!({}),
                    );
                    finished = true;
                }
            }
            Event::Report(summary) => {
                let payload = json!({
                    "title": summary.skill_name,
                    "type": "practice",
                    "score": summary.score_percent,
                    "parameters": {
                        "skill_id": summary.skill_id,
                        "skill_name": summary.skill_name,
                        "total_questions": summary.total_questions,
                        "correct_answers": summary.correct_count,
                        "time_taken_seconds": summary.total_time_seconds,
                    },
                });
                post(&client, &format!("{base_url}/api/v1/reports"), &payload);
            }
        }
    }

    // Channel hung up with the session still open: close it on the way out.
    if let Some(id) = session_id {
        if !finished {
            post(
                &client,
                &format!("{base_url}/api/v1/practice/sessions/{id}/finish"),
                &json!({}),
            );
        }
    }
}

fn create_session(
    client: &reqwest::blocking::Client,
    base_url: &str,
    user_id: &str,
    skill_id: u32,
) -> Option<i64> {
    let payload = json!({ "user_id": user_id, "skill_id": skill_id });
    let response = client
        .post(format!("{base_url}/api/v1/practice/sessions"))
        .json(&payload)
        .send();
    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!(status = %r.status(), "session create rejected");
            return None;
        }
        Err(err) => {
            warn!(error = %err, "session create failed");
            return None;
        }
    };
    let body: serde_json::Value = match response.json() {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "session create response unreadable");
            return None;
        }
    };
    // Backend wraps payloads as { success, data }; tolerate both shapes.
    body.get("data")
        .unwrap_or(&body)
        .get("session_id")
        .and_then(|v| v.as_i64())
}

fn post(client: &reqwest::blocking::Client, url: &str, payload: &serde_json::Value) {
    match client.post(url).json(payload).send() {
        Ok(response) if !response.status().is_success() => {
            warn!(url, status = %response.status(), "telemetry post rejected");
        }
        Ok(_) => {}
        Err(err) => {
            warn!(url, error = %err, "telemetry post failed");
        }
    }
}
