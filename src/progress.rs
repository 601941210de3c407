use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::{Method, StatusCode};
use url::Url;

pub struct Progress {
    enabled: bool,
    start: Instant,

    mp: Option<MultiProgress>,
    stage: ProgressBar,
    requests: ProgressBar,

    in_flight: AtomicU64,
    done: AtomicU64,
    failed: AtomicU64,
    bytes: AtomicU64,
    last_label: Mutex<String>,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let start = Instant::now();

        if !enabled {
            return Arc::new(Self {
                enabled: false,
                start,
                mp: None,
                stage: ProgressBar::hidden(),
                requests: ProgressBar::hidden(),
                in_flight: AtomicU64::new(0),
                done: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                bytes: AtomicU64::new(0),
                last_label: Mutex::new(String::new()),
            });
        }

        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let stage = mp.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]") {
            stage.set_style(style);
        }
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("준비 중");

        let requests = mp.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            requests.set_style(style);
        }
        requests.enable_steady_tick(Duration::from_millis(120));

        Arc::new(Self {
            enabled: true,
            start,
            mp: Some(mp),
            stage,
            requests,
            in_flight: AtomicU64::new(0),
            done: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            last_label: Mutex::new(String::new()),
        })
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn http_start(&self, method: &Method, url: &Url) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("{method} {}", url.path()));
            self.refresh();
        }
    }

    pub fn http_done(&self, method: &Method, url: &Url, status: StatusCode, bytes: usize) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.done.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("{method} {} {status} {bytes}B", url.path()));
            self.refresh();
        }
    }

    pub fn http_err(&self, method: &Method, url: &Url) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("{method} {} failed", url.path()));
            self.refresh();
        }
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.refresh();
        self.stage.finish_and_clear();
        self.requests.finish_and_clear();
        if let Some(mp) = &self.mp {
            let _ = mp.println(format!("Done in {}", HumanDuration(self.start.elapsed())));
        }
    }

    fn set_label(&self, label: String) {
        if let Ok(mut last) = self.last_label.lock() {
            *last = label;
        }
    }

    fn refresh(&self) {
        let last = self
            .last_label
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        self.requests.set_message(format!(
            "HTTP: done {done} | in-flight {in_flight} | failed {failed} | {bytes} | {last}",
            done = self.done.load(Ordering::Relaxed),
            in_flight = self.in_flight.load(Ordering::Relaxed),
            failed = self.failed.load(Ordering::Relaxed),
            bytes = HumanBytes(self.bytes.load(Ordering::Relaxed)),
        ));
    }
}
