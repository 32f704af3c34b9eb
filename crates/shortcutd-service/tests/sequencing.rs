//! End-to-end tests for the queuing and sequencing engine
//!
//! Drives [`ServiceCore`] directly with typed events and a recording pin
//! backend, checking the externally observable contract: which pin
//! requests go out and which results come back.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use shortcutd_core::{
    ControlSignal, PinOutcome, Result, ServiceEvent, ShortcutBatch, ShortcutDescriptor,
};
use shortcutd_service::{Flow, PinRequest, ServiceCore, ShortcutPinner};

#[derive(Default)]
struct RecordingPinner {
    unsupported: bool,
    requests: Mutex<Vec<PinRequest>>,
}

impl RecordingPinner {
    fn supported() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            unsupported: true,
            ..Self::default()
        })
    }

    fn submitted_ids(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.shortcut_id.clone())
            .collect()
    }
}

impl ShortcutPinner for RecordingPinner {
    fn is_pin_supported(&self) -> bool {
        !self.unsupported
    }

    fn request_pin(&self, request: &PinRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

struct Harness {
    core: ServiceCore,
    pinner: Arc<RecordingPinner>,
    results: mpsc::UnboundedReceiver<String>,
}

impl Harness {
    fn new(pinner: Arc<RecordingPinner>) -> Self {
        Self::with_idle_timeout(pinner, Duration::from_secs(30))
    }

    fn with_idle_timeout(pinner: Arc<RecordingPinner>, idle_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            core: ServiceCore::new(idle_timeout, pinner.clone(), tx),
            pinner,
            results: rx,
        }
    }

    fn feed(&mut self, event: ServiceEvent) {
        assert_eq!(self.core.handle_event(event), Flow::Continue);
    }

    fn complete(&mut self) {
        self.feed(ServiceEvent::PinResolved(PinOutcome::Confirmed));
    }

    /// Drain reported results; `None` entries are the null markers.
    fn reports(&mut self) -> VecDeque<Option<String>> {
        let mut out = VecDeque::new();
        while let Ok(line) = self.results.try_recv() {
            let payload = line.strip_prefix("/result ").expect("result topic");
            if payload == "null" {
                out.push_back(None);
            } else {
                let d: ShortcutDescriptor = serde_json::from_str(payload).unwrap();
                out.push_back(Some(d.display_name));
            }
        }
        out
    }
}

fn descriptor(name: &str) -> ShortcutDescriptor {
    ShortcutDescriptor {
        display_name: name.to_string(),
        icon_ref: format!("/icons/{name}.png"),
        action_link: format!("udp://10.0.0.2:8721/{name}"),
    }
}

fn batch(device: &str, names: &[&str]) -> ShortcutBatch {
    ShortcutBatch {
        device_label: format!("{device} - "),
        name_template: format!("{device} $sh$"),
        shortcuts: names.iter().map(|n| descriptor(n)).collect(),
    }
}

#[test]
fn lounge_example_reports_a_then_b_then_null() {
    // enqueue {device:"Lounge", shortcuts:[A,B]}, then three completions:
    // reports A, then B, then the empty marker.
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Lounge", &["A", "B"])));
    h.complete();
    h.complete();
    h.complete();

    assert_eq!(
        h.reports(),
        VecDeque::from(vec![Some("A".to_string()), Some("B".to_string()), None])
    );
    assert_eq!(h.pinner.submitted_ids(), vec!["Lounge - A", "Lounge - B"]);
}

#[test]
fn reports_match_confirmed_submissions() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Kitchen", &["A", "B", "C"])));
    h.complete();
    h.complete();
    h.complete();

    let reports = h.reports();
    let confirmed: Vec<_> = reports.iter().flatten().collect();
    assert_eq!(confirmed.len(), h.pinner.submitted_ids().len());
    assert_eq!(confirmed, vec!["A", "B", "C"]);
}

#[test]
fn batches_drain_in_fifo_order() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("One", &["A"])));
    h.feed(ServiceEvent::Batch(batch("Two", &["B"])));
    h.feed(ServiceEvent::Batch(batch("Three", &["C"])));
    h.complete();
    h.complete();
    h.complete();

    assert_eq!(
        h.pinner.submitted_ids(),
        vec!["One - A", "Two - B", "Three - C"]
    );
    assert_eq!(
        h.reports(),
        VecDeque::from(vec![
            Some("A".to_string()),
            Some("B".to_string()),
            Some("C".to_string())
        ])
    );
}

#[test]
fn completion_while_idle_is_stale_and_answers_null() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.complete();
    assert_eq!(h.reports(), VecDeque::from(vec![None]));
    assert!(h.pinner.submitted_ids().is_empty());
}

#[test]
fn next_skips_without_platform_confirmation() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Lounge", &["A", "B"])));
    h.feed(ServiceEvent::Control(ControlSignal::Next));
    h.complete();

    assert_eq!(
        h.reports(),
        VecDeque::from(vec![Some("A".to_string()), Some("B".to_string())])
    );
}

#[test]
fn repeat_resubmits_identical_request() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Lounge", &["A", "B"])));
    h.feed(ServiceEvent::Control(ControlSignal::Repeat));

    let requests = h.pinner.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].shortcut_id, requests[1].shortcut_id);
    assert_eq!(requests[0].label, requests[1].label);
    assert_eq!(requests[0].action_uri, requests[1].action_uri);
    // Distinct submissions still get distinct correlation tags
    assert_ne!(requests[0].correlation_tag, requests[1].correlation_tag);
    drop(requests);

    // The repeat did not consume B
    h.complete();
    h.complete();
    assert_eq!(
        h.reports(),
        VecDeque::from(vec![Some("A".to_string()), Some("B".to_string())])
    );
}

#[test]
fn stop_truncates_job_and_clears_queue() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Lounge", &["A", "B"])));
    h.feed(ServiceEvent::Batch(batch("Kitchen", &["C"])));
    h.feed(ServiceEvent::Control(ControlSignal::Stop));

    assert_eq!(h.reports(), VecDeque::from(vec![None]));
    // Only A was ever submitted
    assert_eq!(h.pinner.submitted_ids(), vec!["Lounge - A"]);

    // Controls after Stop have no effect
    h.feed(ServiceEvent::Control(ControlSignal::Next));
    h.feed(ServiceEvent::Control(ControlSignal::Repeat));
    assert!(h.reports().is_empty());

    // A late completion for the un-sendable pin prompt is stale
    h.complete();
    assert_eq!(h.reports(), VecDeque::from(vec![None]));
    assert_eq!(h.pinner.submitted_ids(), vec!["Lounge - A"]);
}

#[test]
fn rejection_advances_without_reporting() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Lounge", &["A", "B"])));
    h.feed(ServiceEvent::PinResolved(PinOutcome::Rejected));
    h.complete();

    // A was rejected: only B is reported, but both were submitted
    assert_eq!(h.reports(), VecDeque::from(vec![Some("B".to_string())]));
    assert_eq!(h.pinner.submitted_ids(), vec!["Lounge - A", "Lounge - B"]);
}

#[test]
fn unsupported_launcher_clears_everything_with_one_null() {
    let mut h = Harness::new(RecordingPinner::unsupported());
    h.feed(ServiceEvent::Batch(batch("Lounge", &["A", "B"])));
    h.feed(ServiceEvent::Batch(batch("Kitchen", &["C"])));

    assert_eq!(h.reports(), VecDeque::from(vec![None]));
    assert!(h.pinner.submitted_ids().is_empty());

    // The queue really is gone: nothing resumes on a completion signal
    h.complete();
    assert_eq!(h.reports(), VecDeque::from(vec![None]));
    assert!(h.pinner.submitted_ids().is_empty());
}

#[test]
fn stale_job_is_preempted_by_new_batch() {
    let mut h = Harness::with_idle_timeout(
        RecordingPinner::supported(),
        Duration::from_millis(20),
    );
    h.feed(ServiceEvent::Batch(batch("Stale", &["A", "B", "C"])));
    h.complete();
    // The prompt for B never resolves; the job goes stale
    std::thread::sleep(Duration::from_millis(50));

    h.feed(ServiceEvent::Batch(batch("Fresh", &["X"])));
    h.complete();

    // B and C were discarded without reports; only A and X made it
    assert_eq!(
        h.reports(),
        VecDeque::from(vec![Some("A".to_string()), Some("X".to_string())])
    );
    assert_eq!(
        h.pinner.submitted_ids(),
        vec!["Stale - A", "Stale - B", "Fresh - X"]
    );
}

#[test]
fn empty_batches_never_become_jobs() {
    let mut h = Harness::new(RecordingPinner::supported());
    h.feed(ServiceEvent::Batch(batch("Empty", &[])));
    assert!(h.pinner.submitted_ids().is_empty());
    assert!(h.reports().is_empty());

    // And an empty batch between real ones is skipped
    h.feed(ServiceEvent::Batch(batch("One", &["A"])));
    h.feed(ServiceEvent::Batch(batch("Gap", &[])));
    h.feed(ServiceEvent::Batch(batch("Two", &["B"])));
    h.complete();
    h.complete();
    assert_eq!(h.pinner.submitted_ids(), vec!["One - A", "Two - B"]);
}

#[test]
fn quit_shuts_the_loop_down() {
    let pinner = RecordingPinner::supported();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut core = ServiceCore::new(Duration::from_secs(30), pinner, tx);
    assert_eq!(core.handle_event(ServiceEvent::Quit), Flow::Shutdown);
}
