//! Minimal metrics registry for the gateway.
//!
//! Counter and gauge families with dynamic labels backed by `DashMap`. Label
//! sets are flattened into sorted key vectors so rendering is deterministic
//! per series.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn series(name: &str, key: &LabelKey) -> String {
    if key.is_empty() {
        return name.to_string();
    }
    let labels = key
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}{{{labels}}}")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        for r in self.map.iter() {
            let _ = writeln!(out, "{} {}", series(name, r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0))
            .fetch_add(v, Ordering::Relaxed);
    }

    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0))
            .store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} gauge");
        for r in self.map.iter() {
            let _ = writeln!(out, "{} {}", series(name, r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

#[derive(Default)]
pub struct GatewayMetrics {
    pub ws_upgrades: CounterVec,
    pub ws_sessions: GaugeVec,
    pub inbound_events: CounterVec,
    pub malformed_frames: CounterVec,
    pub broadcasts: CounterVec,
    pub online_users: GaugeVec,
    draining: AtomicBool,
}

impl GatewayMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render all registered metrics plus any extra lines provided by callers.
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.ws_upgrades.render("folio_ws_upgrades_total", &mut out);
        self.ws_sessions.render("folio_ws_sessions_active", &mut out);
        self.inbound_events.render("folio_inbound_events_total", &mut out);
        self.malformed_frames.render("folio_malformed_frames_total", &mut out);
        self.broadcasts.render("folio_broadcasts_total", &mut out);
        self.online_users.render("folio_online_users", &mut out);

        let _ = writeln!(
            out,
            "# TYPE folio_draining gauge\nfolio_draining {}",
            u8::from(self.is_draining())
        );
        for (k, v) in extra {
            let _ = writeln!(out, "{k} {v}");
        }
        out
    }
}
