use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_gauge_vec, Counter,
    CounterVec, Gauge, GaugeVec,
};

use crate::models::announcement::{AnnouncementStatus, AnnouncementView};

lazy_static! {
    // ── Event counters ──────────────────────────────────────────────────────
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_logins_total",
        "Login attempts by status",
        &["status"]
    ).unwrap();

    pub static ref ANNOUNCEMENT_WRITES_COUNTER: CounterVec = register_counter_vec!(
        "api_announcement_writes_total",
        "Announcement mutations by operation",
        &["op"]
    ).unwrap();

    pub static ref MAINTENANCE_WRITES_COUNTER: Counter = register_counter!(
        "api_maintenance_writes_total",
        "Maintenance settings replacements"
    ).unwrap();

    // ── Business gauges (refreshed with each feed snapshot) ─────────────────
    pub static ref ANNOUNCEMENTS_GAUGE: GaugeVec = register_gauge_vec!(
        "admin_announcements_total",
        "Announcements by projected status",
        &["status"]
    ).unwrap();

    pub static ref MAINTENANCE_GAUGE: Gauge = register_gauge!(
        "admin_maintenance_enabled",
        "Whether the maintenance gate is currently enabled"
    ).unwrap();
}

/// Refresh the per-status gauges from a projected snapshot.
pub fn observe_announcements(views: &[AnnouncementView]) {
    for status in [
        AnnouncementStatus::Draft,
        AnnouncementStatus::Active,
        AnnouncementStatus::Inactive,
        AnnouncementStatus::Expired,
    ] {
        let count = views.iter().filter(|v| v.status == status).count();
        ANNOUNCEMENTS_GAUGE
            .with_label_values(&[&status.to_string()])
            .set(count as f64);
    }
}

pub fn observe_maintenance(enabled: bool) {
    MAINTENANCE_GAUGE.set(if enabled { 1.0 } else { 0.0 });
}
