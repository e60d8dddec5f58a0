use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use notification_cell::models::{BookingNotice, OutboxMessage};
use notification_cell::services::outbox::OutboxService;
use notification_cell::services::scheduler::ReminderScheduler;
use patient_cell::services::roster::PatientRosterService;
use schedule_cell::services::ledger::SlotLedgerService;
use shared_config::AppConfig;

use crate::models::{
    AppointmentRecord, AppointmentStatus, BookAppointmentRequest, BookingConfirmation,
    BookingError, VisitPolicy,
};
use crate::services::records::AppointmentRecordsService;

/// The booking workflow: everything that happens between "the patient picked
/// a start time" and "the appointment is confirmed". The slot ledger stays
/// the single source of truth for availability; this service orchestrates
/// around it.
pub struct BookingService {
    ledger: SlotLedgerService,
    roster: PatientRosterService,
    records: AppointmentRecordsService,
    outbox: OutboxService,
    reminders: Arc<ReminderScheduler>,
    policy: VisitPolicy,
    intake_form_path: String,
}

impl BookingService {
    pub fn new(config: &AppConfig, reminders: Arc<ReminderScheduler>) -> Self {
        Self {
            ledger: SlotLedgerService::new(config),
            roster: PatientRosterService::new(config),
            records: AppointmentRecordsService::new(config),
            outbox: OutboxService::new(config),
            reminders,
            policy: VisitPolicy::default(),
            intake_form_path: config.intake_form_path.clone(),
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookingConfirmation, BookingError> {
        info!(
            "Booking appointment for {} with {} at {} on {}",
            request.patient_name, request.doctor, request.location, request.date
        );

        // Step 1: roster lookup decides the visit class and duration.
        let lookup = self
            .roster
            .find_patient(&request.patient_name, request.date_of_birth)
            .await
            .map_err(|e| BookingError::PatientLookup(e.to_string()))?;
        let duration_minutes = self.policy.required_minutes(lookup.patient_type);

        info!(
            "Patient classified as {} ({} minutes)",
            lookup.patient_type, duration_minutes
        );

        // Step 2: reserve the contiguous run. Any failure here aborts the
        // whole booking with the ledger untouched.
        let outcome = self
            .ledger
            .reserve(
                &request.doctor,
                &request.location,
                request.date,
                request.start_time,
                duration_minutes,
            )
            .await?;

        // Contact details from the form win over the roster's stored ones.
        let phone = request.phone.clone().unwrap_or(lookup.phone);
        let email = request.email.clone().unwrap_or(lookup.email);

        // Step 3: persist the confirmed appointment.
        let record = AppointmentRecord {
            appointment_id: Uuid::new_v4(),
            patient_name: request.patient_name.clone(),
            date_of_birth: request.date_of_birth,
            patient_type: lookup.patient_type,
            doctor: request.doctor.clone(),
            location: request.location.clone(),
            date: request.date,
            start_time: request.start_time,
            end_time: outcome.end_time,
            duration_minutes,
            insurance_carrier: request.insurance_carrier.clone(),
            member_id: request.member_id.clone(),
            group_number: request.group_number.clone(),
            phone,
            email,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now(),
        };
        self.records
            .append_appointment(&record)
            .await
            .map_err(|e| BookingError::Persistence(e.to_string()))?;

        // Step 4: confirmation + reminders. The booking is already durable,
        // so notification problems are logged rather than unwound.
        if let Err(e) = self.outbox.deliver(&confirmation_email(&record, &self.intake_form_path)).await
        {
            warn!(
                "Failed to write confirmation for appointment {}: {}",
                record.appointment_id, e
            );
        }
        self.reminders.schedule_booking(&booking_notice(&record)).await;

        info!(
            "Appointment {} confirmed for {} on {} at {}-{}",
            record.appointment_id,
            record.patient_name,
            record.date,
            record.start_time.format("%H:%M"),
            record.end_time.format("%H:%M")
        );

        Ok(BookingConfirmation {
            appointment_id: record.appointment_id,
            patient_type: record.patient_type,
            doctor: record.doctor,
            location: record.location,
            date: record.date,
            start_time: record.start_time,
            end_time: record.end_time,
            duration_minutes,
        })
    }
}

fn confirmation_email(record: &AppointmentRecord, intake_form_path: &str) -> OutboxMessage {
    let body = format!(
        "Dear {},\n\nYour appointment is confirmed.\nDoctor: {}\nDate: {}\nTime: {}-{}\nLocation: {}\n\nPlease fill the attached intake form.\n\nRegards,\nClinic",
        record.patient_name,
        record.doctor,
        record.date,
        record.start_time.format("%H:%M"),
        record.end_time.format("%H:%M"),
        record.location
    );

    OutboxMessage::email(&record.email, "Appointment Confirmation", body)
        .with_attachment(intake_form_path)
}

fn booking_notice(record: &AppointmentRecord) -> BookingNotice {
    BookingNotice {
        appointment_id: record.appointment_id,
        patient_name: record.patient_name.clone(),
        doctor: record.doctor.clone(),
        location: record.location.clone(),
        date: record.date,
        start_time: record.start_time,
        end_time: record.end_time,
        phone: record.phone.clone(),
        email: record.email.clone(),
    }
}
