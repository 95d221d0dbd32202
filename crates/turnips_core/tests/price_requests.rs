use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use turnips_core::db::open_db_in_memory;
use turnips_core::{
    BasePriceEntry, HalfDay, ObservationEntry, PriceRepository, PriceService, RequestError,
    SqlitePriceRepository, Weekday, CHART_BASE_URL,
};

const EXTERNAL_ID: &str = "chat-1001";

// 2020-03-29 was a Sunday; 2020-04-01 a Wednesday; 2020-04-04 a Saturday.
fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, if day >= 29 { 3 } else { 4 }, day, hour, 0, 0)
        .unwrap()
}

fn base_entry(event_time: DateTime<Utc>, price: u32) -> BasePriceEntry {
    BasePriceEntry {
        external_id: EXTERNAL_ID.to_string(),
        display_name: "Daisy".to_string(),
        event_time,
        price,
    }
}

fn observation_entry(
    event_time: DateTime<Utc>,
    day: Option<&str>,
    half_day: Option<&str>,
    price: u32,
) -> ObservationEntry {
    ObservationEntry {
        external_id: EXTERNAL_ID.to_string(),
        display_name: "Daisy".to_string(),
        event_time,
        day: day.map(str::to_string),
        half_day: half_day.map(str::to_string),
        price,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn base_price_then_observation_then_chart() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    service.record_base_price(&base_entry(at(29, 8), 100)).unwrap();
    service
        .record_observation(&observation_entry(at(1, 9), Some("monday"), Some("am"), 90))
        .unwrap();
    service
        .record_observation(&observation_entry(at(4, 15), None, None, 110))
        .unwrap();

    let url = service.chart_url(EXTERNAL_ID, at(4, 16)).unwrap();
    assert_eq!(url, format!("{CHART_BASE_URL}100-90-0-0-0-0-0-0-0-0-0-0-110"));
}

#[test]
fn observation_without_base_price_hits_the_gate_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    let err = service
        .record_observation(&observation_entry(at(1, 9), None, None, 90))
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        RequestError::NoBasePrice { week_start } => {
            assert_eq!(week_start.to_string(), "2020-03-29");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count(&conn, "observations"), 0);
}

#[test]
fn wednesday_morning_event_infers_the_wednesday_am_slot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePriceRepository::try_new(&conn).unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    service.record_base_price(&base_entry(at(29, 8), 100)).unwrap();
    service
        .record_observation(&observation_entry(at(1, 9), None, None, 87))
        .unwrap();

    let user = repo.find_user(EXTERNAL_ID).unwrap().unwrap();
    let week = repo.get_week(user.id, at(1, 9).date_naive()).unwrap();
    let observations = repo.list_observations(week.id).unwrap();
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].day, Weekday::Wednesday);
    assert_eq!(observations[0].half_day, HalfDay::Morning);
}

#[test]
fn invalid_day_name_is_rejected_before_any_store_access() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    let err = service
        .record_observation(&observation_entry(at(1, 9), Some("someday"), None, 90))
        .unwrap_err();

    assert!(matches!(err, RequestError::InvalidInput(_)));
    assert_eq!(count(&conn, "users"), 0);
}

#[test]
fn resubmitting_a_base_price_overwrites_the_week() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    let first = service.record_base_price(&base_entry(at(29, 8), 100)).unwrap();
    let second = service.record_base_price(&base_entry(at(2, 10), 95)).unwrap();

    assert_eq!(first, second);
    let url = service.chart_url(EXTERNAL_ID, at(2, 10)).unwrap();
    assert!(url.starts_with(&format!("{CHART_BASE_URL}95-")));
}

#[test]
fn resubmitting_an_observation_overwrites_the_slot() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    service.record_base_price(&base_entry(at(29, 8), 100)).unwrap();
    let first = service
        .record_observation(&observation_entry(at(1, 9), Some("tue"), Some("pm"), 80))
        .unwrap();
    let second = service
        .record_observation(&observation_entry(at(1, 10), Some("tuesday"), Some("pm"), 72))
        .unwrap();

    assert_eq!(first, second);
    let url = service.chart_url(EXTERNAL_ID, at(1, 10)).unwrap();
    assert_eq!(url, format!("{CHART_BASE_URL}100-0-0-0-72-0-0-0-0-0-0-0-0"));
}

#[test]
fn chart_for_unknown_user_reports_no_base_price_and_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    let err = service.chart_url("stranger", at(1, 9)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(count(&conn, "users"), 0);
}

#[test]
fn display_name_refreshes_without_changing_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePriceRepository::try_new(&conn).unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    service.record_base_price(&base_entry(at(29, 8), 100)).unwrap();
    let mut renamed = base_entry(at(2, 10), 100);
    renamed.display_name = "Daisy Mae".to_string();
    service.record_base_price(&renamed).unwrap();

    let user = repo.find_user(EXTERNAL_ID).unwrap().unwrap();
    assert_eq!(user.display_name, "Daisy Mae");
    assert_eq!(count(&conn, "users"), 1);
}

#[test]
fn a_new_week_starts_fresh_after_the_next_sunday() {
    let conn = open_db_in_memory().unwrap();
    let service = PriceService::new(SqlitePriceRepository::try_new(&conn).unwrap());

    service.record_base_price(&base_entry(at(29, 8), 100)).unwrap();
    service
        .record_observation(&observation_entry(at(1, 9), None, None, 90))
        .unwrap();

    // The following Sunday (2020-04-05) opens a new, observation-free week.
    let next_sunday = Utc.with_ymd_and_hms(2020, 4, 5, 8, 0, 0).unwrap();
    service.record_base_price(&base_entry(next_sunday, 103)).unwrap();

    let url = service.chart_url(EXTERNAL_ID, next_sunday).unwrap();
    assert_eq!(url, format!("{CHART_BASE_URL}103-0-0-0-0-0-0-0-0-0-0-0-0"));

    let monday_after = Utc.with_ymd_and_hms(2020, 4, 6, 9, 0, 0).unwrap();
    let result = service.chart_url(EXTERNAL_ID, monday_after);
    assert!(result.is_ok(), "Monday still belongs to the new week");
}
