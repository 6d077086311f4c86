use serde::Serialize;

use crate::models::{
    announcement::{AnnouncementStatus, AnnouncementView},
    maintenance::MaintenanceSettings,
};

/// Counters shown on the console dashboard, computed from the projected
/// feed snapshots rather than raw rows so the statuses match what the
/// operator sees in the list views.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub announcements_total: usize,
    pub announcements_draft: usize,
    pub announcements_active: usize,
    pub announcements_inactive: usize,
    pub announcements_expired: usize,
    pub maintenance_enabled: bool,
}

pub fn compute(
    announcements: &[AnnouncementView],
    maintenance: &MaintenanceSettings,
) -> DashboardStats {
    let count = |status: AnnouncementStatus| {
        announcements.iter().filter(|a| a.status == status).count()
    };
    DashboardStats {
        announcements_total: announcements.len(),
        announcements_draft: count(AnnouncementStatus::Draft),
        announcements_active: count(AnnouncementStatus::Active),
        announcements_inactive: count(AnnouncementStatus::Inactive),
        announcements_expired: count(AnnouncementStatus::Expired),
        maintenance_enabled: maintenance.enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::announcement::LocalizedText;
    use chrono::Utc;
    use uuid::Uuid;

    fn view(status: AnnouncementStatus) -> AnnouncementView {
        let now = Utc::now();
        AnnouncementView {
            id: Uuid::new_v4(),
            title: LocalizedText::new("お知らせ", None),
            content: LocalizedText::new("内容", None),
            status,
            publish_at: now,
            expires_at: None,
            created_by: "op-1".into(),
            updated_by: "op-1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn counts_follow_projected_statuses() {
        let views = vec![
            view(AnnouncementStatus::Active),
            view(AnnouncementStatus::Active),
            view(AnnouncementStatus::Draft),
            view(AnnouncementStatus::Expired),
        ];
        let maintenance = MaintenanceSettings::default_disabled(Utc::now());
        let stats = compute(&views, &maintenance);

        assert_eq!(stats.announcements_total, 4);
        assert_eq!(stats.announcements_active, 2);
        assert_eq!(stats.announcements_draft, 1);
        assert_eq!(stats.announcements_inactive, 0);
        assert_eq!(stats.announcements_expired, 1);
        assert!(!stats.maintenance_enabled);
    }
}
