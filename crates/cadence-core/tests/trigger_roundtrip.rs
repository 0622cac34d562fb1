//! Wire roundtrip and JsonSchema validation tests for every trigger kind.

use cadence_core::codec::{WireTrigger, decode, encode};
use cadence_core::{
    DaysOfMonth, DaysOfWeek, Duration, MonthsOfYear, Repetition, SessionStateChange,
    TriggerDescriptor, TriggerKind, TriggerPayload, WeeksOfMonth, classify,
};
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn plain(payload: TriggerPayload) -> TriggerDescriptor {
    TriggerDescriptor {
        start: at(2015, 4, 11, 7, 14),
        end: None,
        random_delay: None,
        repetition: None,
        payload,
    }
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $kind:expr, $instance:expr) => {
        #[test]
        fn $name() {
            let descriptor: TriggerDescriptor = $instance;
            assert_eq!(descriptor.kind(), $kind);

            // Codec roundtrip
            let wire = encode(&descriptor);
            assert_eq!(wire.trigger_type, $kind.code());
            let recovered = decode(&wire).unwrap();
            assert_eq!(recovered, descriptor, "codec roundtrip failed for {}", $kind);

            // Wire serde roundtrip
            let json_str = serde_json::to_string_pretty(&wire).unwrap();
            let wire_back: WireTrigger = serde_json::from_str(&json_str).unwrap();
            assert_eq!(wire_back, wire);

            // Schema validation of both shapes
            for (schema, instance) in [
                (
                    serde_json::to_value(schema_for!(WireTrigger)).unwrap(),
                    serde_json::to_value(&wire).unwrap(),
                ),
                (
                    serde_json::to_value(schema_for!(TriggerDescriptor)).unwrap(),
                    serde_json::to_value(&descriptor).unwrap(),
                ),
            ] {
                let errors = validate_against_schema(&schema, &instance);
                assert!(
                    errors.is_empty(),
                    "Schema validation failed for {}: {:?}",
                    $kind,
                    errors
                );
            }

            // Descriptor serde roundtrip
            let json_str = serde_json::to_string(&descriptor).unwrap();
            let back: TriggerDescriptor = serde_json::from_str(&json_str).unwrap();
            assert_eq!(back, descriptor);
        }
    };
}

roundtrip_and_validate!(once_roundtrip, TriggerKind::Once, plain(TriggerPayload::Once));

roundtrip_and_validate!(
    once_with_everything_roundtrip,
    TriggerKind::Once,
    TriggerDescriptor {
        start: at(2030, 12, 31, 23, 59),
        end: NaiveDate::from_ymd_opt(2031, 1, 1),
        random_delay: Some(Duration::parse("P1DT2H")),
        repetition: Some(Repetition {
            interval: Some(Duration::from_minutes(10)),
            duration: Some(Duration::parse("P1Y2M3DT4H5M6S")),
            stop_at_duration_end: true,
        }),
        payload: TriggerPayload::Once,
    }
);

roundtrip_and_validate!(
    daily_roundtrip,
    TriggerKind::Daily,
    plain(TriggerPayload::Daily { days_interval: 3 })
);

roundtrip_and_validate!(
    weekly_roundtrip,
    TriggerKind::Weekly,
    plain(TriggerPayload::Weekly {
        weeks_interval: 2,
        days_of_week: DaysOfWeek::SUNDAY | DaysOfWeek::MONDAY,
    })
);

roundtrip_and_validate!(
    monthly_by_date_roundtrip,
    TriggerKind::MonthlyByDate,
    TriggerDescriptor {
        end: NaiveDate::from_ymd_opt(2016, 2, 29),
        ..plain(TriggerPayload::MonthlyByDate {
            months: MonthsOfYear::ALL,
            days_of_month: DaysOfMonth::DAY_1 | DaysOfMonth::DAY_31 | DaysOfMonth::LAST,
            run_on_last_day_of_month: true,
        })
    }
);

roundtrip_and_validate!(
    monthly_by_day_of_week_roundtrip,
    TriggerKind::MonthlyByDayOfWeek,
    plain(TriggerPayload::MonthlyByDayOfWeek {
        months: MonthsOfYear::FEBRUARY | MonthsOfYear::NOVEMBER,
        days_of_week: DaysOfWeek::SATURDAY,
        weeks_of_month: WeeksOfMonth::LAST,
        run_on_last_week_of_month: false,
    })
);

roundtrip_and_validate!(
    at_logon_roundtrip,
    TriggerKind::AtLogon,
    plain(TriggerPayload::AtLogon {
        delay: Some(Duration::from_minutes(5)),
        user_id: Some("DOMAIN\\alice".into()),
    })
);

roundtrip_and_validate!(
    at_logon_any_user_roundtrip,
    TriggerKind::AtLogon,
    plain(TriggerPayload::AtLogon {
        delay: None,
        user_id: None,
    })
);

roundtrip_and_validate!(
    at_system_start_roundtrip,
    TriggerKind::AtSystemStart,
    plain(TriggerPayload::AtSystemStart {
        delay: Some(Duration::from_seconds(90)),
    })
);

roundtrip_and_validate!(
    on_idle_roundtrip,
    TriggerKind::OnIdle,
    plain(TriggerPayload::OnIdle {
        execution_time_limit: Some(Duration::parse("PT72H")),
    })
);

roundtrip_and_validate!(
    on_session_state_change_roundtrip,
    TriggerKind::OnSessionStateChange,
    plain(TriggerPayload::OnSessionStateChange {
        state_change: SessionStateChange::RemoteDisconnect,
        delay: Some(Duration::from_minutes(1)),
        user_id: Some("S-1-5-21-1004".into()),
    })
);

#[test]
fn classify_is_idempotent_over_codes() {
    for kind in TriggerKind::ALL {
        let code = serde_json::json!(kind.code());
        assert_eq!(classify(&code).unwrap(), kind);
    }
}

#[test]
fn wire_json_shape() {
    let wire = encode(&plain(TriggerPayload::Weekly {
        weeks_interval: 1,
        days_of_week: DaysOfWeek::FRIDAY,
    }));
    assert_eq!(
        serde_json::to_value(&wire).unwrap(),
        serde_json::json!({
            "trigger_type": 3,
            "start_boundary": "2015-04-11T07:14:00",
            "weeks_interval": 1,
            "days_of_week": 32,
        })
    );
}
