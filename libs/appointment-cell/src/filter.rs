//! In-memory narrowing of an appointment snapshot.
//!
//! The data store hands back the full denormalized collection for the board
//! view; the criteria here cut it down without another round trip. All four
//! predicates are ANDed and an unset criterion matches everything.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{Appointment, AppointmentStatus};

/// User-adjustable board criteria. `Default` is the cleared state: every
/// appointment matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
    /// Matched case-insensitively against patient first/last name and DNI,
    /// and doctor first/last name.
    pub search: Option<String>,
    /// Exact calendar day.
    pub date: Option<NaiveDate>,
    /// Exact specialty name (case-sensitive).
    pub specialty: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl FilterCriteria {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        !has_text(&self.search)
            && self.date.is_none()
            && !has_text(&self.specialty)
            && self.status.is_none()
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.matches_search(appointment)
            && self.matches_date(appointment)
            && self.matches_specialty(appointment)
            && self.matches_status(appointment)
    }

    fn matches_search(&self, appointment: &Appointment) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => normalize(t),
            _ => return true,
        };

        // A missing embed makes its side non-matching, never an error.
        let patient_hit = appointment.patient.as_ref().is_some_and(|p| {
            normalize(&p.first_name).contains(&term)
                || normalize(&p.last_name).contains(&term)
                || p.dni
                    .as_deref()
                    .is_some_and(|dni| normalize(dni).contains(&term))
        });
        let doctor_hit = appointment.doctor.as_ref().is_some_and(|d| {
            normalize(&d.first_name).contains(&term) || normalize(&d.last_name).contains(&term)
        });

        patient_hit || doctor_hit
    }

    fn matches_date(&self, appointment: &Appointment) -> bool {
        self.date.is_none_or(|date| appointment.date == date)
    }

    fn matches_specialty(&self, appointment: &Appointment) -> bool {
        let wanted = match self.specialty.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => return true,
        };
        appointment
            .doctor
            .as_ref()
            .and_then(|d| d.specialty.as_ref())
            .is_some_and(|s| s.name == wanted)
    }

    fn matches_status(&self, appointment: &Appointment) -> bool {
        self.status.is_none_or(|status| appointment.status == status)
    }
}

/// Narrow a snapshot by the given criteria. Stable: the result is an
/// order-preserving subsequence of the input. An absent snapshot yields an
/// empty view rather than an error.
pub fn apply(appointments: Option<&[Appointment]>, criteria: &FilterCriteria) -> Vec<Appointment> {
    let Some(appointments) = appointments else {
        return Vec::new();
    };
    appointments
        .iter()
        .filter(|a| criteria.matches(a))
        .cloned()
        .collect()
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Lower-case and fold the Latin diacritics that show up in local names, so
/// "garcia" finds "García" and "munoz" finds "Muñoz". Deliberately a small
/// table, not a general Unicode normalizer.
fn normalize(input: &str) -> String {
    input.to_lowercase().chars().map(fold_diacritic).collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoctorRef, PatientRef, SpecialtyRef};
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    fn appointment(
        date: &str,
        status: AppointmentStatus,
        patient: Option<PatientRef>,
        doctor: Option<DoctorRef>,
    ) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: date.parse().unwrap(),
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            status,
            reason: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            patient,
            doctor,
        }
    }

    fn patient(first: &str, last: &str, dni: Option<&str>) -> Option<PatientRef> {
        Some(PatientRef {
            first_name: first.to_string(),
            last_name: last.to_string(),
            dni: dni.map(str::to_string),
        })
    }

    fn doctor(first: &str, last: &str, specialty: Option<&str>) -> Option<DoctorRef> {
        Some(DoctorRef {
            first_name: first.to_string(),
            last_name: last.to_string(),
            specialty: specialty.map(|name| SpecialtyRef {
                name: name.to_string(),
            }),
        })
    }

    fn sample_board() -> Vec<Appointment> {
        vec![
            appointment(
                "2024-03-15",
                AppointmentStatus::Scheduled,
                patient("María", "García", Some("28456789")),
                doctor("Carlos", "Pérez", Some("Cardiología")),
            ),
            appointment(
                "2024-03-16",
                AppointmentStatus::Confirmed,
                patient("Juan", "Ibáñez", Some("30111222")),
                doctor("Ana", "Suárez", Some("Pediatría")),
            ),
            appointment(
                "2024-03-15",
                AppointmentStatus::Completed,
                patient("Lucía", "Fernández", None),
                // Doctor embed missing: excluded by any specialty criterion.
                None,
            ),
        ]
    }

    #[test]
    fn empty_criteria_is_identity() {
        let board = sample_board();
        let filtered = apply(Some(&board), &FilterCriteria::default());

        assert_eq!(filtered.len(), board.len());
        let ids: Vec<_> = filtered.iter().map(|a| a.id).collect();
        let expected: Vec<_> = board.iter().map(|a| a.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn absent_input_yields_empty_view() {
        let criteria = FilterCriteria {
            search: Some("garcia".to_string()),
            ..Default::default()
        };
        assert!(apply(None, &criteria).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let board = sample_board();
        let criteria = FilterCriteria {
            date: Some("2024-03-15".parse().unwrap()),
            ..Default::default()
        };

        let once = apply(Some(&board), &criteria);
        let twice = apply(Some(&once), &criteria);

        assert_eq!(once.len(), twice.len());
        assert!(once
            .iter()
            .zip(twice.iter())
            .all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn result_preserves_relative_order() {
        let board = sample_board();
        let criteria = FilterCriteria {
            date: Some("2024-03-15".parse().unwrap()),
            ..Default::default()
        };

        let filtered = apply(Some(&board), &criteria);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, board[0].id);
        assert_eq!(filtered[1].id, board[2].id);
    }

    #[test]
    fn search_folds_case_and_diacritics() {
        let board = sample_board();
        let criteria = FilterCriteria {
            search: Some("garcia".to_string()),
            ..Default::default()
        };

        let filtered = apply(Some(&board), &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(
            filtered[0].patient.as_ref().unwrap().last_name,
            "García"
        );
    }

    #[test]
    fn search_matches_doctor_and_dni() {
        let board = sample_board();

        let by_doctor = apply(
            Some(&board),
            &FilterCriteria {
                search: Some("suarez".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_doctor.len(), 1);
        assert_eq!(by_doctor[0].doctor.as_ref().unwrap().last_name, "Suárez");

        let by_dni = apply(
            Some(&board),
            &FilterCriteria {
                search: Some("28456".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_dni.len(), 1);
    }

    #[test]
    fn search_treats_missing_embeds_as_non_matching() {
        let board = vec![appointment(
            "2024-03-15",
            AppointmentStatus::Scheduled,
            None,
            None,
        )];
        let criteria = FilterCriteria {
            search: Some("garcia".to_string()),
            ..Default::default()
        };
        assert!(apply(Some(&board), &criteria).is_empty());
    }

    #[test]
    fn date_criterion_is_calendar_exact() {
        let board = sample_board();
        let criteria = FilterCriteria {
            date: Some("2024-03-16".parse().unwrap()),
            ..Default::default()
        };

        let filtered = apply(Some(&board), &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date, "2024-03-16".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn specialty_criterion_excludes_missing_specialty() {
        let board = sample_board();
        let criteria = FilterCriteria {
            specialty: Some("Cardiología".to_string()),
            ..Default::default()
        };

        let filtered = apply(Some(&board), &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(
            filtered[0].doctor.as_ref().unwrap().specialty.as_ref().unwrap().name,
            "Cardiología"
        );
    }

    #[test]
    fn specialty_criterion_is_case_sensitive() {
        let board = sample_board();
        let criteria = FilterCriteria {
            specialty: Some("cardiología".to_string()),
            ..Default::default()
        };
        assert!(apply(Some(&board), &criteria).is_empty());
    }

    #[test]
    fn status_criterion_matches_exactly() {
        let board = sample_board();
        let criteria = FilterCriteria {
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        };

        let filtered = apply(Some(&board), &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn criteria_are_anded() {
        let board = sample_board();
        let criteria = FilterCriteria {
            search: Some("garcia".to_string()),
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        };
        assert!(apply(Some(&board), &criteria).is_empty());
    }

    #[test]
    fn clear_resets_to_match_everything() {
        let board = sample_board();
        let mut criteria = FilterCriteria {
            search: Some("garcia".to_string()),
            date: Some("2024-03-15".parse().unwrap()),
            specialty: Some("Cardiología".to_string()),
            status: Some(AppointmentStatus::Scheduled),
        };
        assert!(!criteria.is_empty());

        criteria.clear();
        assert!(criteria.is_empty());
        assert_eq!(apply(Some(&board), &criteria).len(), board.len());
    }

    #[test]
    fn blank_search_and_specialty_match_everything() {
        let board = sample_board();
        let criteria = FilterCriteria {
            search: Some("   ".to_string()),
            specialty: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(apply(Some(&board), &criteria).len(), board.len());
    }
}
