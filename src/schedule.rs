//! Schedule resolution and registration.
//!
//! A request may reference existing schedules by id or carry inline
//! schedule definitions. Basic schedules (types 0-6) stand alone; smart
//! schedules (types 7-11) are a coupled full+increment pair sharing
//! the same sub-type. The resolver output is the
//! (schedule_id, schedule_id_advanced) pair stored on the job.

use crate::entities::schedule;
use crate::errors::BackhaulError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::Deserialize;

pub const BASIC_TYPE_MIN: i32 = 0;
pub const BASIC_TYPE_MAX: i32 = 6;
pub const SMART_TYPE_MIN: i32 = 7;
pub const SMART_TYPE_MAX: i32 = 11;

/// Optional schedule block of a registration request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleSpec {
    pub full: Option<ScheduleSlot>,
    pub increment: Option<ScheduleSlot>,
    #[serde(rename = "type")]
    pub schedule_type: Option<i32>,
}

/// One slot: either a numeric-reference string naming an existing
/// schedule, or an inline definition to register.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScheduleSlot {
    Reference(String),
    Inline(ScheduleDetail),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetail {
    /// "HH:MM"
    pub time: Option<String>,
    /// "YYYY-MM-DD"
    pub date: Option<String>,
    /// 0 (Sunday) through 6
    pub weekday: Option<i32>,
    /// Day of month, 1-31
    pub day: Option<i32>,
    /// Week ordinal within the month, 1-5
    pub week: Option<i32>,
    pub interval_value: Option<i32>,
    /// "minute" or "hour"
    pub interval_unit: Option<String>,
}

/// The cadence shape a schedule type demands of its detail fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    Manual,
    Once,
    Daily,
    Weekly,
    MonthlyDay,
    MonthlyWeek,
    Interval,
}

fn basic_cadence(schedule_type: i32) -> Option<Cadence> {
    match schedule_type {
        0 => Some(Cadence::Manual),
        1 => Some(Cadence::Once),
        2 => Some(Cadence::Daily),
        3 => Some(Cadence::Weekly),
        4 => Some(Cadence::MonthlyDay),
        5 => Some(Cadence::MonthlyWeek),
        6 => Some(Cadence::Interval),
        _ => None,
    }
}

/// The (full, increment) cadence shapes of a smart type.
fn smart_cadences(schedule_type: i32) -> Option<(Cadence, Cadence)> {
    match schedule_type {
        7 => Some((Cadence::Daily, Cadence::Interval)),
        8 => Some((Cadence::Weekly, Cadence::Daily)),
        9 => Some((Cadence::MonthlyDay, Cadence::Daily)),
        10 => Some((Cadence::MonthlyWeek, Cadence::Weekly)),
        11 => Some((Cadence::Interval, Cadence::Interval)),
        _ => None,
    }
}

fn require_time(detail: &ScheduleDetail, slot: &str) -> Result<(), BackhaulError> {
    let time = detail
        .time
        .as_deref()
        .ok_or_else(|| BackhaulError::Validation(format!("{} schedule requires a time", slot)))?;
    let valid = matches!(time.split_once(':'), Some((h, m))
        if h.parse::<u32>().map(|h| h < 24).unwrap_or(false)
        && m.parse::<u32>().map(|m| m < 60).unwrap_or(false));
    if !valid {
        return Err(BackhaulError::Validation(format!(
            "{} schedule time must be HH:MM, got {:?}",
            slot, time
        )));
    }
    Ok(())
}

fn validate_detail(
    detail: &ScheduleDetail,
    cadence: Cadence,
    slot: &str,
) -> Result<(), BackhaulError> {
    match cadence {
        Cadence::Manual => Ok(()),
        Cadence::Once => {
            if detail.date.is_none() {
                return Err(BackhaulError::Validation(format!(
                    "{} schedule requires a date",
                    slot
                )));
            }
            require_time(detail, slot)
        }
        Cadence::Daily => require_time(detail, slot),
        Cadence::Weekly => {
            match detail.weekday {
                Some(0..=6) => {}
                _ => {
                    return Err(BackhaulError::Validation(format!(
                        "{} schedule requires a weekday in 0-6",
                        slot
                    )))
                }
            }
            require_time(detail, slot)
        }
        Cadence::MonthlyDay => {
            match detail.day {
                Some(1..=31) => {}
                _ => {
                    return Err(BackhaulError::Validation(format!(
                        "{} schedule requires a day of month in 1-31",
                        slot
                    )))
                }
            }
            require_time(detail, slot)
        }
        Cadence::MonthlyWeek => {
            match detail.week {
                Some(1..=5) => {}
                _ => {
                    return Err(BackhaulError::Validation(format!(
                        "{} schedule requires a week ordinal in 1-5",
                        slot
                    )))
                }
            }
            match detail.weekday {
                Some(0..=6) => {}
                _ => {
                    return Err(BackhaulError::Validation(format!(
                        "{} schedule requires a weekday in 0-6",
                        slot
                    )))
                }
            }
            require_time(detail, slot)
        }
        Cadence::Interval => {
            match detail.interval_value {
                Some(v) if v > 0 => {}
                _ => {
                    return Err(BackhaulError::Validation(format!(
                        "{} schedule requires a positive interval value",
                        slot
                    )))
                }
            }
            match detail.interval_unit.as_deref() {
                Some("minute") | Some("hour") => Ok(()),
                _ => Err(BackhaulError::Validation(format!(
                    "{} schedule interval unit must be \"minute\" or \"hour\"",
                    slot
                ))),
            }
        }
    }
}

fn parse_reference(reference: &str) -> Result<i64, BackhaulError> {
    reference.parse::<i64>().map_err(|_| {
        BackhaulError::Validation(format!(
            "schedule reference must be numeric, got {:?}",
            reference
        ))
    })
}

async fn lookup_schedule<C: ConnectionTrait>(
    conn: &C,
    reference: &str,
) -> Result<schedule::Model, BackhaulError> {
    let id = parse_reference(reference)?;
    schedule::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| BackhaulError::NotFound(format!("schedule #{}", id)))
}

async fn register_schedule<C: ConnectionTrait>(
    conn: &C,
    schedule_type: i32,
    detail: &ScheduleDetail,
    center_id: i64,
    owner_user: i64,
) -> Result<i64, BackhaulError> {
    let now = Utc::now().timestamp();

    let entry = schedule::ActiveModel {
        schedule_type: Set(schedule_type),
        center_id: Set(center_id),
        owner_user: Set(owner_user),
        time: Set(detail.time.clone()),
        date: Set(detail.date.clone()),
        weekday: Set(detail.weekday),
        day: Set(detail.day),
        week: Set(detail.week),
        interval_value: Set(detail.interval_value),
        interval_unit: Set(detail.interval_unit.clone()),
        created_at: Set(now),
        ..Default::default()
    };

    let inserted = entry.insert(conn).await?;
    Ok(inserted.id)
}

/// Resolve the request's schedule block to the job's
/// (schedule_id, schedule_id_advanced) pair.
///
/// Legal slot combinations are reference/reference, object/object, a
/// single slot of either shape, or nothing at all; mixing a reference
/// with an inline object is rejected.
pub async fn resolve_schedule<C: ConnectionTrait>(
    conn: &C,
    spec: Option<&ScheduleSpec>,
    center_id: i64,
    owner_user: i64,
) -> Result<(i64, i64), BackhaulError> {
    let spec = match spec {
        Some(spec) => spec,
        None => return Ok((0, 0)),
    };

    match (&spec.full, &spec.increment) {
        (None, None) => Ok((0, 0)),

        // Coupled pair of existing schedules: both must carry the same
        // smart type.
        (Some(ScheduleSlot::Reference(full)), Some(ScheduleSlot::Reference(increment))) => {
            let full = lookup_schedule(conn, full).await?;
            let increment = lookup_schedule(conn, increment).await?;
            if full.schedule_type != increment.schedule_type {
                return Err(BackhaulError::Validation(format!(
                    "schedule type mismatch: full is type {}, increment is type {}",
                    full.schedule_type, increment.schedule_type
                )));
            }
            if full.schedule_type < SMART_TYPE_MIN {
                return Err(BackhaulError::Validation(format!(
                    "paired schedules must be smart (type >= {}), got type {}",
                    SMART_TYPE_MIN, full.schedule_type
                )));
            }
            Ok((full.id, increment.id))
        }

        // Coupled pair of inline definitions: register both under one
        // explicit smart type.
        (Some(ScheduleSlot::Inline(full)), Some(ScheduleSlot::Inline(increment))) => {
            let schedule_type = spec.schedule_type.ok_or_else(|| {
                BackhaulError::Validation(
                    "inline schedule pair requires an explicit type".to_string(),
                )
            })?;
            let (full_cadence, increment_cadence) =
                smart_cadences(schedule_type).ok_or_else(|| {
                    BackhaulError::Validation(format!(
                        "inline schedule pair requires a smart type ({}-{}), got {}",
                        SMART_TYPE_MIN, SMART_TYPE_MAX, schedule_type
                    ))
                })?;
            validate_detail(full, full_cadence, "full")?;
            validate_detail(increment, increment_cadence, "increment")?;

            let full_id = register_schedule(conn, schedule_type, full, center_id, owner_user).await?;
            let increment_id =
                register_schedule(conn, schedule_type, increment, center_id, owner_user).await?;
            Ok((full_id, increment_id))
        }

        // A single existing schedule: any basic or smart sub-schedule
        // is accepted as-is.
        (Some(ScheduleSlot::Reference(reference)), None) => {
            let entry = lookup_schedule(conn, reference).await?;
            Ok((entry.id, 0))
        }
        (None, Some(ScheduleSlot::Reference(reference))) => {
            let entry = lookup_schedule(conn, reference).await?;
            Ok((0, entry.id))
        }

        // A single inline definition must be a basic type.
        (Some(ScheduleSlot::Inline(detail)), None) => {
            let id = register_standalone(conn, spec, detail, center_id, owner_user).await?;
            Ok((id, 0))
        }
        (None, Some(ScheduleSlot::Inline(detail))) => {
            let id = register_standalone(conn, spec, detail, center_id, owner_user).await?;
            Ok((0, id))
        }

        // Reference in one slot, inline object in the other.
        _ => Err(BackhaulError::Validation(
            "schedule slots must be both references or both inline definitions".to_string(),
        )),
    }
}

async fn register_standalone<C: ConnectionTrait>(
    conn: &C,
    spec: &ScheduleSpec,
    detail: &ScheduleDetail,
    center_id: i64,
    owner_user: i64,
) -> Result<i64, BackhaulError> {
    let schedule_type = spec.schedule_type.ok_or_else(|| {
        BackhaulError::Validation("inline schedule requires an explicit type".to_string())
    })?;
    let cadence = basic_cadence(schedule_type).ok_or_else(|| {
        BackhaulError::Validation(format!(
            "standalone inline schedule requires a basic type ({}-{}), got {}",
            BASIC_TYPE_MIN, BASIC_TYPE_MAX, schedule_type
        ))
    })?;
    validate_detail(detail, cadence, "inline")?;
    register_schedule(conn, schedule_type, detail, center_id, owner_user).await
}

/// The "schedule usage" label derived from which schedule-id slots are
/// non-zero.
pub fn schedule_usage(schedule_id: i64, schedule_id_advanced: i64) -> &'static str {
    match (schedule_id != 0, schedule_id_advanced != 0) {
        (false, false) => "none",
        (true, false) => "full",
        (false, true) => "increment",
        (true, true) => "smart",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily() -> ScheduleDetail {
        ScheduleDetail {
            time: Some("03:00".to_string()),
            ..Default::default()
        }
    }

    fn interval() -> ScheduleDetail {
        ScheduleDetail {
            interval_value: Some(30),
            interval_unit: Some("minute".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_cadence_table_covers_basic_range() {
        for t in BASIC_TYPE_MIN..=BASIC_TYPE_MAX {
            assert!(basic_cadence(t).is_some(), "type {} missing", t);
        }
        assert!(basic_cadence(SMART_TYPE_MIN).is_none());
    }

    #[test]
    fn test_smart_cadence_table_covers_smart_range() {
        for t in SMART_TYPE_MIN..=SMART_TYPE_MAX {
            assert!(smart_cadences(t).is_some(), "type {} missing", t);
        }
        assert!(smart_cadences(BASIC_TYPE_MAX).is_none());
        assert!(smart_cadences(SMART_TYPE_MAX + 1).is_none());
    }

    #[test]
    fn test_daily_requires_time() {
        assert!(validate_detail(&daily(), Cadence::Daily, "full").is_ok());
        assert!(validate_detail(&ScheduleDetail::default(), Cadence::Daily, "full").is_err());
    }

    #[test]
    fn test_time_format_checked() {
        let bad = ScheduleDetail {
            time: Some("25:99".to_string()),
            ..Default::default()
        };
        assert!(validate_detail(&bad, Cadence::Daily, "full").is_err());

        let also_bad = ScheduleDetail {
            time: Some("0300".to_string()),
            ..Default::default()
        };
        assert!(validate_detail(&also_bad, Cadence::Daily, "full").is_err());
    }

    #[test]
    fn test_weekly_requires_weekday_in_range() {
        let out_of_range = ScheduleDetail {
            time: Some("03:00".to_string()),
            weekday: Some(7),
            ..Default::default()
        };
        assert!(validate_detail(&out_of_range, Cadence::Weekly, "full").is_err());

        let sunday = ScheduleDetail {
            time: Some("03:00".to_string()),
            weekday: Some(0),
            ..Default::default()
        };
        assert!(validate_detail(&sunday, Cadence::Weekly, "full").is_ok());
    }

    #[test]
    fn test_monthly_week_requires_week_weekday_and_time() {
        let detail = ScheduleDetail {
            time: Some("01:30".to_string()),
            week: Some(2),
            weekday: Some(3),
            ..Default::default()
        };
        assert!(validate_detail(&detail, Cadence::MonthlyWeek, "full").is_ok());

        let missing_week = ScheduleDetail {
            time: Some("01:30".to_string()),
            weekday: Some(3),
            ..Default::default()
        };
        assert!(validate_detail(&missing_week, Cadence::MonthlyWeek, "full").is_err());
    }

    #[test]
    fn test_interval_unit_restricted() {
        assert!(validate_detail(&interval(), Cadence::Interval, "increment").is_ok());

        let bad_unit = ScheduleDetail {
            interval_value: Some(2),
            interval_unit: Some("fortnight".to_string()),
            ..Default::default()
        };
        assert!(validate_detail(&bad_unit, Cadence::Interval, "increment").is_err());

        let zero = ScheduleDetail {
            interval_value: Some(0),
            interval_unit: Some("hour".to_string()),
            ..Default::default()
        };
        assert!(validate_detail(&zero, Cadence::Interval, "increment").is_err());
    }

    #[test]
    fn test_reference_must_be_numeric() {
        assert_eq!(parse_reference("42").unwrap(), 42);
        assert!(parse_reference("daily-3am").is_err());
    }

    #[test]
    fn test_schedule_usage_labels() {
        assert_eq!(schedule_usage(0, 0), "none");
        assert_eq!(schedule_usage(5, 0), "full");
        assert_eq!(schedule_usage(0, 9), "increment");
        assert_eq!(schedule_usage(5, 9), "smart");
    }

    #[test]
    fn test_slot_deserializes_reference_or_inline() {
        let slot: ScheduleSlot = serde_json::from_str("\"12\"").expect("reference slot");
        assert!(matches!(slot, ScheduleSlot::Reference(ref s) if s == "12"));

        let slot: ScheduleSlot =
            serde_json::from_str(r#"{"time": "03:00"}"#).expect("inline slot");
        assert!(matches!(slot, ScheduleSlot::Inline(_)));
    }
}
