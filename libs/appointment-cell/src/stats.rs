//! Dashboard counters derived from the unfiltered appointment snapshot.

use chrono::{Local, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::{Appointment, AppointmentStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub today: i32,
    pub this_week: i32,
    pub pending: i32,
    pub confirmed: i32,
}

/// Summary counts for the dashboard, evaluated against the current calendar
/// day in the server's local time zone. Pure: recomputing is always valid,
/// just redundant work when the snapshot has not changed.
pub fn summarize(appointments: &[Appointment]) -> DashboardStats {
    summarize_at(appointments, Local::now().date_naive())
}

/// Same as [`summarize`] with the reference day passed in. The week runs
/// Monday through Sunday.
pub fn summarize_at(appointments: &[Appointment], today: NaiveDate) -> DashboardStats {
    let week = today.week(Weekday::Mon);
    let mut stats = DashboardStats::default();

    for appointment in appointments {
        if appointment.date == today {
            stats.today += 1;
        }
        if appointment.date >= week.first_day() && appointment.date <= week.last_day() {
            stats.this_week += 1;
        }
        match appointment.status {
            AppointmentStatus::Scheduled => stats.pending += 1,
            AppointmentStatus::Confirmed => stats.confirmed += 1,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, Utc};
    use uuid::Uuid;

    fn appointment(date: NaiveDate, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            status,
            reason: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            patient: None,
            doctor: None,
        }
    }

    #[test]
    fn empty_snapshot_yields_all_zero_counts() {
        let today = "2024-03-15".parse().unwrap();
        assert_eq!(summarize_at(&[], today), DashboardStats::default());
    }

    #[test]
    fn counts_today_week_and_statuses() {
        // 2024-03-15 is a Friday; its week runs Mon 2024-03-11 .. Sun 2024-03-17.
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let snapshot = vec![
            appointment(today, AppointmentStatus::Scheduled),
            appointment(today + Duration::days(8), AppointmentStatus::Confirmed),
        ];

        let stats = summarize_at(&snapshot, today);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.confirmed, 1);
        // 2024-03-23 falls in the following week.
        assert_eq!(stats.this_week, 1);
    }

    #[test]
    fn week_is_monday_through_sunday() {
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let snapshot = vec![
            appointment("2024-03-11".parse().unwrap(), AppointmentStatus::Completed),
            appointment("2024-03-17".parse().unwrap(), AppointmentStatus::Completed),
            appointment("2024-03-10".parse().unwrap(), AppointmentStatus::Completed),
            appointment("2024-03-18".parse().unwrap(), AppointmentStatus::Completed),
        ];

        let stats = summarize_at(&snapshot, today);
        assert_eq!(stats.this_week, 2);
        assert_eq!(stats.today, 0);
    }

    #[test]
    fn cancelled_and_completed_never_count_as_pending_or_confirmed() {
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let snapshot = vec![
            appointment(today, AppointmentStatus::Cancelled),
            appointment(today, AppointmentStatus::Completed),
            appointment(today, AppointmentStatus::Scheduled),
        ];

        let stats = summarize_at(&snapshot, today);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.confirmed, 0);
        assert_eq!(stats.today, 3);
    }
}
