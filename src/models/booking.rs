use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use sqlx::FromRow;

use crate::database::executor::{QueryExecutor, SqlParam};
use crate::errors::QueryError;

const BOOKING_COLUMNS: &str = "id, uniqueId, customerName, contactNumber, eventDate, eventTime, \
     branch, selectedPackage, amount, celebrationType";

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub unique_id: Option<String>,
    pub customer_name: String,
    pub contact_number: String,
    #[serde(serialize_with = "serialize_date")]
    pub event_date: NaiveDate,
    #[serde(serialize_with = "serialize_time")]
    pub event_time: NaiveTime,
    pub branch: String,
    pub selected_package: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub celebration_type: Option<String>,
}

/// A validated create/update request, ready to be bound.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub customer_name: String,
    pub contact_number: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub branch: String,
    pub selected_package: String,
    pub amount: Decimal,
    pub celebration_type: String,
}

impl NewBooking {
    fn params(&self) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(self.customer_name.clone()),
            SqlParam::Text(self.contact_number.clone()),
            SqlParam::Date(self.event_date),
            SqlParam::Time(self.event_time),
            SqlParam::Text(self.branch.clone()),
            SqlParam::Text(self.selected_package.clone()),
            SqlParam::Decimal(self.amount),
            SqlParam::Text(self.celebration_type.clone()),
        ]
    }
}

/// Public identifier: the internal id, zero-padded to five digits.
pub fn format_unique_id(id: u64) -> String {
    format!("{:05}", id)
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%d-%m-%Y"))
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M"))
}

impl Booking {
    pub async fn all(db: &QueryExecutor) -> Result<Vec<Booking>, QueryError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY eventDate, eventTime");
        db.fetch_all(&sql, &[]).await
    }

    /// Runs a predicate built by [`crate::services::filter::build_filter`].
    pub async fn filtered(
        db: &QueryExecutor,
        predicate: &str,
        params: &[SqlParam],
    ) -> Result<Vec<Booking>, QueryError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {predicate} ORDER BY eventDate, eventTime"
        );
        db.fetch_all(&sql, params).await
    }

    pub async fn find_by_id(db: &QueryExecutor, id: i64) -> Result<Option<Booking>, QueryError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?");
        db.fetch_optional(&sql, &[SqlParam::Int(id)]).await
    }

    pub async fn on_date(db: &QueryExecutor, date: NaiveDate) -> Result<Vec<Booking>, QueryError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE eventDate = ? ORDER BY eventTime"
        );
        db.fetch_all(&sql, &[SqlParam::Date(date)]).await
    }

    async fn exists(db: &QueryExecutor, id: i64) -> Result<bool, QueryError> {
        let row: Option<(i64,)> = db
            .fetch_optional("SELECT id FROM bookings WHERE id = ?", &[SqlParam::Int(id)])
            .await?;
        Ok(row.is_some())
    }

    /// Inserts the booking and stamps its `uniqueId` in one transaction.
    /// Returns the formatted identifier.
    pub async fn create(db: &QueryExecutor, booking: &NewBooking) -> Result<String, QueryError> {
        let params = booking.params();

        db.run("create booking", |pool| {
            let params = params.clone();
            async move {
                let mut tx = pool.begin().await?;

                let inserted = sqlx::query_with(
                    "INSERT INTO bookings (customerName, contactNumber, eventDate, eventTime, \
                     branch, selectedPackage, amount, celebrationType) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    QueryExecutor::bind(&params)?,
                )
                .execute(&mut *tx)
                .await?;

                let id = inserted.last_insert_id();
                let unique_id = format_unique_id(id);

                sqlx::query("UPDATE bookings SET uniqueId = ? WHERE id = ?")
                    .bind(unique_id.clone())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                tx.commit().await?;
                Ok::<_, sqlx::Error>(unique_id)
            }
        })
        .await
    }

    /// Replaces every field except `id` and `uniqueId`. Returns `false` when
    /// no booking has this id.
    pub async fn update(
        db: &QueryExecutor,
        id: i64,
        booking: &NewBooking,
    ) -> Result<bool, QueryError> {
        let mut params = booking.params();
        params.push(SqlParam::Int(id));

        let result = db
            .execute(
                "UPDATE bookings SET customerName = ?, contactNumber = ?, eventDate = ?, \
                 eventTime = ?, branch = ?, selectedPackage = ?, amount = ?, celebrationType = ? \
                 WHERE id = ?",
                &params,
            )
            .await?;

        // MySQL may count an update that changes nothing as zero affected rows
        if result.rows_affected() > 0 {
            Ok(true)
        } else {
            Self::exists(db, id).await
        }
    }

    /// Returns `false` when no booking has this id.
    pub async fn delete(db: &QueryExecutor, id: i64) -> Result<bool, QueryError> {
        let result = db
            .execute("DELETE FROM bookings WHERE id = ?", &[SqlParam::Int(id)])
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Booking {
        Booking {
            id: 42,
            unique_id: Some("00042".into()),
            customer_name: "Asha Rao".into(),
            contact_number: "9876543210".into(),
            event_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            event_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            branch: "Downtown".into(),
            selected_package: "Gold".into(),
            amount: Decimal::from_str("15000.50").unwrap(),
            celebration_type: Some("Birthday".into()),
        }
    }

    #[test]
    fn unique_id_is_zero_padded_to_five_digits() {
        assert_eq!(format_unique_id(1), "00001");
        assert_eq!(format_unique_id(42), "00042");
        assert_eq!(format_unique_id(99999), "99999");
        assert_eq!(format_unique_id(123456), "123456");
    }

    #[test]
    fn booking_renders_dates_and_times_for_clients() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["uniqueId"], "00042");
        assert_eq!(json["customerName"], "Asha Rao");
        assert_eq!(json["contactNumber"], "9876543210");
        assert_eq!(json["eventDate"], "10-03-2025");
        assert_eq!(json["eventTime"], "18:30");
        assert_eq!(json["selectedPackage"], "Gold");
        assert_eq!(json["amount"], 15000.5);
        assert_eq!(json["celebrationType"], "Birthday");
    }

    #[test]
    fn legacy_rows_without_optional_columns_render_null() {
        let mut booking = sample();
        booking.unique_id = None;
        booking.celebration_type = None;

        let json = serde_json::to_value(booking).unwrap();
        assert!(json["uniqueId"].is_null());
        assert!(json["celebrationType"].is_null());
    }

    #[test]
    fn new_booking_params_follow_column_order() {
        let booking = NewBooking {
            customer_name: "Asha Rao".into(),
            contact_number: "9876543210".into(),
            event_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            event_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            branch: "Downtown".into(),
            selected_package: "Gold".into(),
            amount: Decimal::from(15000),
            celebration_type: "Birthday".into(),
        };

        let params = booking.params();
        assert_eq!(params.len(), 8);
        assert_eq!(params[0], SqlParam::Text("Asha Rao".into()));
        assert_eq!(params[2], SqlParam::Date(booking.event_date));
        assert_eq!(params[6], SqlParam::Decimal(Decimal::from(15000)));
        assert_eq!(params[7], SqlParam::Text("Birthday".into()));
    }
}
