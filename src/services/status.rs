use chrono::{DateTime, Utc};

use crate::models::announcement::AnnouncementStatus;

/// Derive the display status of an announcement from its stored state and
/// the current instant.
///
/// Sticky statuses (`draft`, `inactive`) pass through untouched. Everything
/// else collapses to `expired` once `expires_at` has been reached, `active`
/// otherwise. The stored value of a non-sticky status is never authoritative:
/// this runs on every feed snapshot and before every rewrite, so a record
/// flips between `active` and `expired` in both directions as `now` moves
/// across `expires_at`.
///
/// Total and idempotent: projecting a projected status yields the same value.
pub fn project(
    stored: AnnouncementStatus,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AnnouncementStatus {
    if stored.is_sticky() {
        return stored;
    }
    match expires_at {
        Some(deadline) if deadline <= now => AnnouncementStatus::Expired,
        _ => AnnouncementStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const NON_STICKY: [AnnouncementStatus; 2] =
        [AnnouncementStatus::Active, AnnouncementStatus::Expired];

    #[test]
    fn idempotent_with_now_held_constant() {
        let now = Utc::now();
        let deadline = Some(now + Duration::hours(1));
        for stored in [
            AnnouncementStatus::Draft,
            AnnouncementStatus::Active,
            AnnouncementStatus::Inactive,
            AnnouncementStatus::Expired,
        ] {
            let once = project(stored, deadline, now);
            let twice = project(once, deadline, now);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn expires_exactly_at_the_deadline() {
        let deadline = Utc::now();
        for stored in NON_STICKY {
            assert_eq!(
                project(stored, Some(deadline), deadline - Duration::seconds(1)),
                AnnouncementStatus::Active
            );
            assert_eq!(
                project(stored, Some(deadline), deadline),
                AnnouncementStatus::Expired
            );
            assert_eq!(
                project(stored, Some(deadline), deadline + Duration::seconds(1)),
                AnnouncementStatus::Expired
            );
        }
    }

    #[test]
    fn reactivates_when_the_deadline_moves_forward() {
        // An expired record becomes active again once re-observed with a
        // deadline that now lies in the future.
        let now = Utc::now();
        assert_eq!(
            project(
                AnnouncementStatus::Expired,
                Some(now + Duration::hours(1)),
                now
            ),
            AnnouncementStatus::Active
        );
    }

    #[test]
    fn no_deadline_means_active() {
        let now = Utc::now();
        for stored in NON_STICKY {
            assert_eq!(project(stored, None, now), AnnouncementStatus::Active);
        }
    }

    #[test]
    fn sticky_statuses_ignore_the_clock() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        assert_eq!(
            project(AnnouncementStatus::Draft, past, now),
            AnnouncementStatus::Draft
        );
        assert_eq!(
            project(AnnouncementStatus::Inactive, past, now),
            AnnouncementStatus::Inactive
        );
    }
}
