//! Price store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the user/week/observation persistence operations.
//! - Map stored rows to typed entities, rejecting undecodable state.
//!
//! # Invariants
//! - Upserts are single `INSERT .. ON CONFLICT .. RETURNING` statements, so
//!   a check-then-act race cannot create duplicate rows; the returned id is
//!   stable across overwrites and the last writer wins on price.
//! - Week starts are normalized here, never trusted from the caller.

use crate::calendar::week_start;
use crate::db::{migrations, DbError};
use crate::model::entity::{Observation, ObservationId, User, UserId, Week, WeekId};
use crate::model::slot::{HalfDay, Weekday};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

const WEEK_SELECT_SQL: &str = "SELECT
    week_id,
    user_id,
    week_start,
    base_price
FROM weeks";

const OBSERVATION_SELECT_SQL: &str = "SELECT
    observation_id,
    week_id,
    day,
    half_day,
    price
FROM observations";

const REQUIRED_TABLES: [&str; 3] = ["users", "weeks", "observations"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for price store persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backing store transport failure.
    Db(DbError),
    /// No week row for (user, week start): the base price has not been
    /// submitted yet.
    WeekNotFound {
        user_id: UserId,
        week_start: NaiveDate,
    },
    /// No week row with this id.
    WeekIdNotFound(WeekId),
    /// A persisted row failed to decode into its entity.
    InvalidData(String),
    /// The connection has not been migrated to the expected schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A migrated connection is missing one of the store's tables.
    MissingRequiredTable(&'static str),
}

impl StoreError {
    /// True for the recoverable absence family, as opposed to store failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WeekNotFound { .. } | Self::WeekIdNotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WeekNotFound {
                user_id,
                week_start,
            } => write!(
                f,
                "no week starting {week_start} recorded for user {user_id}"
            ),
            Self::WeekIdNotFound(id) => write!(f, "week not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted row: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection at schema version {actual_version}, expected {expected_version}; \
                 open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for the weekly price cycle.
///
/// All operations are short synchronous round-trips; each write is atomic on
/// its natural key.
pub trait PriceRepository {
    /// Looks up a user by external identity, creating the row on first
    /// contact. The stored display name is refreshed on every call.
    fn get_or_create_user(&self, external_id: &str, display_name: &str) -> StoreResult<UserId>;

    /// Read-only user lookup; `None` when the identity has never submitted.
    fn find_user(&self, external_id: &str) -> StoreResult<Option<User>>;

    /// Inserts or overwrites the base price for the week `event_date` falls
    /// in. At most one week row ever exists per (user, week start).
    fn upsert_week(&self, user_id: UserId, event_date: NaiveDate, base_price: u32)
        -> StoreResult<WeekId>;

    /// Resolves the week `event_date` falls in; `WeekNotFound` is the gate
    /// that forces a base price before observations are accepted.
    fn get_week(&self, user_id: UserId, event_date: NaiveDate) -> StoreResult<Week>;

    /// Direct week lookup by id.
    fn get_week_by_id(&self, week_id: WeekId) -> StoreResult<Week>;

    /// Inserts or overwrites the observation for (week, day, half-day);
    /// the id is stable across overwrites. Week existence is enforced by
    /// the foreign key.
    fn upsert_observation(
        &self,
        week_id: WeekId,
        day: Weekday,
        half_day: HalfDay,
        price: u32,
    ) -> StoreResult<ObservationId>;

    /// All observations for a week, ordered by slot position.
    fn list_observations(&self, week_id: WeekId) -> StoreResult<Vec<Observation>>;
}

/// SQLite-backed price repository over an explicit, migrated connection.
pub struct SqlitePriceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePriceRepository<'conn> {
    /// Wraps a connection after verifying it carries the expected schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not match
    ///   the latest migration.
    /// - `MissingRequiredTable` when the schema lost one of the store tables.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = migrations::latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in REQUIRED_TABLES {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(StoreError::MissingRequiredTable(table));
            }
        }

        Ok(Self { conn })
    }
}

impl PriceRepository for SqlitePriceRepository<'_> {
    fn get_or_create_user(&self, external_id: &str, display_name: &str) -> StoreResult<UserId> {
        let id = self.conn.query_row(
            "INSERT INTO users (external_id, display_name)
             VALUES (?1, ?2)
             ON CONFLICT (external_id) DO UPDATE SET display_name = excluded.display_name
             RETURNING user_id;",
            params![external_id, display_name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn find_user(&self, external_id: &str) -> StoreResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, external_id, display_name
             FROM users
             WHERE external_id = ?1;",
        )?;
        let mut rows = stmt.query([external_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(User {
                id: row.get("user_id")?,
                external_id: row.get("external_id")?,
                display_name: row.get("display_name")?,
            }));
        }
        Ok(None)
    }

    fn upsert_week(
        &self,
        user_id: UserId,
        event_date: NaiveDate,
        base_price: u32,
    ) -> StoreResult<WeekId> {
        let sunday = week_start(event_date);
        let id = self.conn.query_row(
            "INSERT INTO weeks (user_id, week_start, base_price)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, week_start) DO UPDATE SET base_price = excluded.base_price
             RETURNING week_id;",
            params![user_id, sunday.format(DATE_FORMAT).to_string(), base_price],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_week(&self, user_id: UserId, event_date: NaiveDate) -> StoreResult<Week> {
        let sunday = week_start(event_date);
        let mut stmt = self
            .conn
            .prepare(&format!("{WEEK_SELECT_SQL} WHERE user_id = ?1 AND week_start = ?2;"))?;
        let mut rows = stmt.query(params![user_id, sunday.format(DATE_FORMAT).to_string()])?;
        match rows.next()? {
            Some(row) => parse_week_row(row),
            None => Err(StoreError::WeekNotFound {
                user_id,
                week_start: sunday,
            }),
        }
    }

    fn get_week_by_id(&self, week_id: WeekId) -> StoreResult<Week> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WEEK_SELECT_SQL} WHERE week_id = ?1;"))?;
        let mut rows = stmt.query([week_id])?;
        match rows.next()? {
            Some(row) => parse_week_row(row),
            None => Err(StoreError::WeekIdNotFound(week_id)),
        }
    }

    fn upsert_observation(
        &self,
        week_id: WeekId,
        day: Weekday,
        half_day: HalfDay,
        price: u32,
    ) -> StoreResult<ObservationId> {
        let id = self.conn.query_row(
            "INSERT INTO observations (week_id, day, half_day, price)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (week_id, day, half_day) DO UPDATE SET price = excluded.price
             RETURNING observation_id;",
            params![week_id, day.ordinal() as i64, half_day_to_db(half_day), price],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn list_observations(&self, week_id: WeekId) -> StoreResult<Vec<Observation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBSERVATION_SELECT_SQL} WHERE week_id = ?1 ORDER BY day, half_day;"
        ))?;
        let mut rows = stmt.query([week_id])?;
        let mut observations = Vec::new();
        while let Some(row) = rows.next()? {
            observations.push(parse_observation_row(row)?);
        }
        Ok(observations)
    }
}

fn parse_week_row(row: &Row<'_>) -> StoreResult<Week> {
    let week_start_text: String = row.get("week_start")?;
    let week_start = NaiveDate::parse_from_str(&week_start_text, DATE_FORMAT).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid date `{week_start_text}` in weeks.week_start"
        ))
    })?;

    Ok(Week {
        id: row.get("week_id")?,
        user_id: row.get("user_id")?,
        week_start,
        base_price: parse_price(row.get("base_price")?, "weeks.base_price")?,
    })
}

fn parse_observation_row(row: &Row<'_>) -> StoreResult<Observation> {
    let day_ordinal: i64 = row.get("day")?;
    let day = usize::try_from(day_ordinal)
        .ok()
        .and_then(Weekday::from_ordinal)
        .ok_or_else(|| {
            StoreError::InvalidData(format!(
                "invalid day ordinal `{day_ordinal}` in observations.day"
            ))
        })?;

    let half_day_text: String = row.get("half_day")?;
    let half_day = parse_half_day(&half_day_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid half_day value `{half_day_text}` in observations.half_day"
        ))
    })?;

    Ok(Observation {
        id: row.get("observation_id")?,
        week_id: row.get("week_id")?,
        day,
        half_day,
        price: parse_price(row.get("price")?, "observations.price")?,
    })
}

fn parse_price(value: i64, column: &str) -> StoreResult<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid price `{value}` in {column}")))
}

fn half_day_to_db(half_day: HalfDay) -> &'static str {
    match half_day {
        HalfDay::Morning => "am",
        HalfDay::Afternoon => "pm",
    }
}

fn parse_half_day(value: &str) -> Option<HalfDay> {
    match value {
        "am" => Some(HalfDay::Morning),
        "pm" => Some(HalfDay::Afternoon),
        _ => None,
    }
}
