//! PostgreSQL implementation of CaptureStore.
//!
//! The session/record pair is written inside one transaction so an inbound
//! event either lands completely or not at all.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::capture::{
    Answer, ArrivalMethod, BranchState, CaptureSession, SessionStep, TravelMode, TravelRecord,
};
use crate::domain::foundation::{DomainError, RegistrationId, Timestamp};
use crate::ports::CaptureStore;

/// PostgreSQL implementation of CaptureStore.
#[derive(Clone)]
pub struct PostgresCaptureStore {
    pool: PgPool,
}

impl PostgresCaptureStore {
    /// Creates a new PostgresCaptureStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: &RegistrationId,
    ) -> Result<Option<CaptureSession>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT registration_id, step, last_prompt_step, state, is_complete,
                   last_message_at, created_at
            FROM travel_capture_sessions
            WHERE registration_id = $1
            "#,
        )
        .bind(registration_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch capture session: {}", e)))?;

        row.map(row_to_session).transpose()
    }

    async fn fetch_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: &RegistrationId,
    ) -> Result<Option<TravelRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT registration_id, travel_type, arrival, arrival_date, arrival_time,
                   airline, flight_number, pnr, arrival_details,
                   hotel_arrival_time, hotel_arrival_time_skipped,
                   hotel_departure_time, hotel_departure_time_skipped,
                   return_travel, departure, departure_date, departure_time,
                   departure_airline, departure_flight_number, departure_pnr,
                   departure_details
            FROM travel_records
            WHERE registration_id = $1
            "#,
        )
        .bind(registration_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch travel record: {}", e)))?;

        row.map(row_to_record).transpose()
    }
}

#[async_trait]
impl CaptureStore for PostgresCaptureStore {
    async fn load_or_create(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<(CaptureSession, TravelRecord), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to open transaction: {}", e)))?;

        sqlx::query(
            "INSERT INTO travel_capture_sessions (registration_id) VALUES ($1) \
             ON CONFLICT (registration_id) DO NOTHING",
        )
        .bind(registration_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to create capture session: {}", e)))?;

        sqlx::query(
            "INSERT INTO travel_records (registration_id) VALUES ($1) \
             ON CONFLICT (registration_id) DO NOTHING",
        )
        .bind(registration_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to create travel record: {}", e)))?;

        let session = self
            .fetch_session(&mut tx, registration_id)
            .await?
            .ok_or_else(|| DomainError::database("Capture session missing after upsert"))?;
        let record = self
            .fetch_record(&mut tx, registration_id)
            .await?
            .ok_or_else(|| DomainError::database("Travel record missing after upsert"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit: {}", e)))?;

        Ok((session, record))
    }

    async fn find_session(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<CaptureSession>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT registration_id, step, last_prompt_step, state, is_complete,
                   last_message_at, created_at
            FROM travel_capture_sessions
            WHERE registration_id = $1
            "#,
        )
        .bind(registration_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch capture session: {}", e)))?;

        row.map(row_to_session).transpose()
    }

    async fn save(
        &self,
        session: &CaptureSession,
        record: &TravelRecord,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to open transaction: {}", e)))?;

        let state = serde_json::to_value(session.state())
            .map_err(|e| DomainError::database(format!("Failed to encode branch state: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO travel_capture_sessions (
                registration_id, step, last_prompt_step, state, is_complete,
                last_message_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (registration_id) DO UPDATE SET
                step = EXCLUDED.step,
                last_prompt_step = EXCLUDED.last_prompt_step,
                state = EXCLUDED.state,
                is_complete = EXCLUDED.is_complete,
                last_message_at = EXCLUDED.last_message_at
            "#,
        )
        .bind(session.registration_id().as_uuid())
        .bind(session.step().as_str())
        .bind(
            session
                .last_prompt_step()
                .map(|s| s.as_str())
                .unwrap_or(""),
        )
        .bind(state)
        .bind(session.is_complete())
        .bind(session.last_message_at().as_datetime())
        .bind(session.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save capture session: {}", e)))?;

        let (hotel_arrival, hotel_arrival_skipped) = time_answer_cols(&record.hotel_arrival_time);
        let (hotel_departure, hotel_departure_skipped) =
            time_answer_cols(&record.hotel_departure_time);

        sqlx::query(
            r#"
            INSERT INTO travel_records (
                registration_id, travel_type, arrival, arrival_date, arrival_time,
                airline, flight_number, pnr, arrival_details,
                hotel_arrival_time, hotel_arrival_time_skipped,
                hotel_departure_time, hotel_departure_time_skipped,
                return_travel, departure, departure_date, departure_time,
                departure_airline, departure_flight_number, departure_pnr,
                departure_details
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                      $14, $15, $16, $17, $18, $19, $20, $21)
            ON CONFLICT (registration_id) DO UPDATE SET
                travel_type = EXCLUDED.travel_type,
                arrival = EXCLUDED.arrival,
                arrival_date = EXCLUDED.arrival_date,
                arrival_time = EXCLUDED.arrival_time,
                airline = EXCLUDED.airline,
                flight_number = EXCLUDED.flight_number,
                pnr = EXCLUDED.pnr,
                arrival_details = EXCLUDED.arrival_details,
                hotel_arrival_time = EXCLUDED.hotel_arrival_time,
                hotel_arrival_time_skipped = EXCLUDED.hotel_arrival_time_skipped,
                hotel_departure_time = EXCLUDED.hotel_departure_time,
                hotel_departure_time_skipped = EXCLUDED.hotel_departure_time_skipped,
                return_travel = EXCLUDED.return_travel,
                departure = EXCLUDED.departure,
                departure_date = EXCLUDED.departure_date,
                departure_time = EXCLUDED.departure_time,
                departure_airline = EXCLUDED.departure_airline,
                departure_flight_number = EXCLUDED.departure_flight_number,
                departure_pnr = EXCLUDED.departure_pnr,
                departure_details = EXCLUDED.departure_details
            "#,
        )
        .bind(record.registration_id.as_uuid())
        .bind(record.travel_type.map(|m| m.as_str()))
        .bind(record.arrival.map(|m| m.as_str()))
        .bind(record.arrival_date)
        .bind(record.arrival_time)
        .bind(record.airline.as_deref())
        .bind(record.flight_number.as_deref())
        .bind(record.pnr.to_optional_text())
        .bind(record.arrival_details.to_optional_text())
        .bind(hotel_arrival)
        .bind(hotel_arrival_skipped)
        .bind(hotel_departure)
        .bind(hotel_departure_skipped)
        .bind(record.return_travel)
        .bind(record.departure.map(|m| m.as_str()))
        .bind(record.departure_date)
        .bind(record.departure_time)
        .bind(record.departure_airline.to_optional_text())
        .bind(record.departure_flight_number.to_optional_text())
        .bind(record.departure_pnr.to_optional_text())
        .bind(record.departure_details.to_optional_text())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save travel record: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit: {}", e)))?;

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════

fn db_err(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<CaptureSession, DomainError> {
    let id: uuid::Uuid = row
        .try_get("registration_id")
        .map_err(|e| db_err("Failed to get registration_id", e))?;

    let step_str: String = row
        .try_get("step")
        .map_err(|e| db_err("Failed to get step", e))?;
    let step = SessionStep::parse(&step_str).map_err(|e| db_err("Invalid stored step", e))?;

    let last_prompt_str: String = row
        .try_get("last_prompt_step")
        .map_err(|e| db_err("Failed to get last_prompt_step", e))?;
    let last_prompt_step = if last_prompt_str.is_empty() {
        None
    } else {
        Some(
            SessionStep::parse(&last_prompt_str)
                .map_err(|e| db_err("Invalid stored last_prompt_step", e))?,
        )
    };

    let state_value: serde_json::Value = row
        .try_get("state")
        .map_err(|e| db_err("Failed to get state", e))?;
    let state: BranchState = serde_json::from_value(state_value)
        .map_err(|e| db_err("Invalid stored branch state", e))?;

    let is_complete: bool = row
        .try_get("is_complete")
        .map_err(|e| db_err("Failed to get is_complete", e))?;

    let last_message_at: chrono::DateTime<chrono::Utc> = row
        .try_get("last_message_at")
        .map_err(|e| db_err("Failed to get last_message_at", e))?;

    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_err("Failed to get created_at", e))?;

    Ok(CaptureSession::reconstitute(
        RegistrationId::from_uuid(id),
        step,
        last_prompt_step,
        state,
        is_complete,
        Timestamp::from_datetime(last_message_at),
        Timestamp::from_datetime(created_at),
    ))
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<TravelRecord, DomainError> {
    let id: uuid::Uuid = row
        .try_get("registration_id")
        .map_err(|e| db_err("Failed to get registration_id", e))?;
    let mut record = TravelRecord::new(RegistrationId::from_uuid(id));

    let travel_type: Option<String> = row
        .try_get("travel_type")
        .map_err(|e| db_err("Failed to get travel_type", e))?;
    record.travel_type = travel_type
        .map(|s| str_to_travel_mode(&s))
        .transpose()?;

    let arrival: Option<String> = row
        .try_get("arrival")
        .map_err(|e| db_err("Failed to get arrival", e))?;
    record.arrival = arrival.map(|s| str_to_method(&s)).transpose()?;

    record.arrival_date = row
        .try_get::<Option<NaiveDate>, _>("arrival_date")
        .map_err(|e| db_err("Failed to get arrival_date", e))?;
    record.arrival_time = row
        .try_get::<Option<NaiveTime>, _>("arrival_time")
        .map_err(|e| db_err("Failed to get arrival_time", e))?;
    record.airline = row
        .try_get::<Option<String>, _>("airline")
        .map_err(|e| db_err("Failed to get airline", e))?;
    record.flight_number = row
        .try_get::<Option<String>, _>("flight_number")
        .map_err(|e| db_err("Failed to get flight_number", e))?;

    record.pnr = Answer::from_optional_text(
        row.try_get::<Option<String>, _>("pnr")
            .map_err(|e| db_err("Failed to get pnr", e))?,
    );
    record.arrival_details = Answer::from_optional_text(
        row.try_get::<Option<String>, _>("arrival_details")
            .map_err(|e| db_err("Failed to get arrival_details", e))?,
    );

    record.hotel_arrival_time = time_answer(
        row.try_get::<Option<NaiveTime>, _>("hotel_arrival_time")
            .map_err(|e| db_err("Failed to get hotel_arrival_time", e))?,
        row.try_get("hotel_arrival_time_skipped")
            .map_err(|e| db_err("Failed to get hotel_arrival_time_skipped", e))?,
    );
    record.hotel_departure_time = time_answer(
        row.try_get::<Option<NaiveTime>, _>("hotel_departure_time")
            .map_err(|e| db_err("Failed to get hotel_departure_time", e))?,
        row.try_get("hotel_departure_time_skipped")
            .map_err(|e| db_err("Failed to get hotel_departure_time_skipped", e))?,
    );

    record.return_travel = row
        .try_get("return_travel")
        .map_err(|e| db_err("Failed to get return_travel", e))?;

    let departure: Option<String> = row
        .try_get("departure")
        .map_err(|e| db_err("Failed to get departure", e))?;
    record.departure = departure.map(|s| str_to_method(&s)).transpose()?;

    record.departure_date = row
        .try_get::<Option<NaiveDate>, _>("departure_date")
        .map_err(|e| db_err("Failed to get departure_date", e))?;
    record.departure_time = row
        .try_get::<Option<NaiveTime>, _>("departure_time")
        .map_err(|e| db_err("Failed to get departure_time", e))?;

    record.departure_airline = Answer::from_optional_text(
        row.try_get::<Option<String>, _>("departure_airline")
            .map_err(|e| db_err("Failed to get departure_airline", e))?,
    );
    record.departure_flight_number = Answer::from_optional_text(
        row.try_get::<Option<String>, _>("departure_flight_number")
            .map_err(|e| db_err("Failed to get departure_flight_number", e))?,
    );
    record.departure_pnr = Answer::from_optional_text(
        row.try_get::<Option<String>, _>("departure_pnr")
            .map_err(|e| db_err("Failed to get departure_pnr", e))?,
    );
    record.departure_details = Answer::from_optional_text(
        row.try_get::<Option<String>, _>("departure_details")
            .map_err(|e| db_err("Failed to get departure_details", e))?,
    );

    Ok(record)
}

fn str_to_travel_mode(s: &str) -> Result<TravelMode, DomainError> {
    match s {
        "Air" => Ok(TravelMode::Air),
        "Train" => Ok(TravelMode::Train),
        "Car" => Ok(TravelMode::Car),
        other => Err(DomainError::database(format!(
            "Invalid travel mode: {}",
            other
        ))),
    }
}

fn str_to_method(s: &str) -> Result<ArrivalMethod, DomainError> {
    match s {
        "commercial" => Ok(ArrivalMethod::Commercial),
        "local_pickup" => Ok(ArrivalMethod::LocalPickup),
        "self" => Ok(ArrivalMethod::SelfArranged),
        other => Err(DomainError::database(format!(
            "Invalid arrival method: {}",
            other
        ))),
    }
}

fn time_answer(time: Option<NaiveTime>, skipped: bool) -> Answer<NaiveTime> {
    match (time, skipped) {
        (Some(t), _) => Answer::Given(t),
        (None, true) => Answer::Skipped,
        (None, false) => Answer::Unanswered,
    }
}

fn time_answer_cols(answer: &Answer<NaiveTime>) -> (Option<NaiveTime>, bool) {
    match answer {
        Answer::Given(t) => (Some(*t), false),
        Answer::Skipped => (None, true),
        Answer::Unanswered => (None, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_mode_conversion_round_trips() {
        for mode in [TravelMode::Air, TravelMode::Train, TravelMode::Car] {
            assert_eq!(str_to_travel_mode(mode.as_str()).unwrap(), mode);
        }
        assert!(str_to_travel_mode("Boat").is_err());
    }

    #[test]
    fn arrival_method_conversion_round_trips() {
        for method in [
            ArrivalMethod::Commercial,
            ArrivalMethod::LocalPickup,
            ArrivalMethod::SelfArranged,
        ] {
            assert_eq!(str_to_method(method.as_str()).unwrap(), method);
        }
        assert!(str_to_method("taxi").is_err());
    }

    #[test]
    fn time_answer_columns_round_trip() {
        let given = Answer::Given(NaiveTime::from_hms_opt(13, 45, 0).unwrap());
        for answer in [Answer::Unanswered, Answer::Skipped, given] {
            let (time, skipped) = time_answer_cols(&answer);
            assert_eq!(time_answer(time, skipped), answer);
        }
    }
}
