use chrono::NaiveDate;
use slotmeet_core::db::open_db_in_memory;
use slotmeet_core::grid::valid_slots;
use slotmeet_core::{
    sqlite_confirm_service, EngineConfig, EngineError, Event, IntensityConfig, Participant,
    SlotId,
};
use std::collections::BTreeSet;
use uuid::Uuid;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn slot(d: u32, hour: u32, minute: u32) -> SlotId {
    SlotId::at(date(d), hour, minute).unwrap()
}

fn two_day_event() -> Event {
    Event::new(Uuid::new_v4(), "team lunch", date(1), date(2), 8, 10, 30).unwrap()
}

fn alice() -> Participant {
    Participant::new("1001", "alice")
}

fn bob() -> Participant {
    Participant::new("1002", "bob")
}

#[test]
fn scenario_a_first_confirm_shows_two_occupied_slots() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();

    assert_eq!(valid_slots(&event).unwrap().len(), 8);

    let heatmap = service
        .confirm(event.id, &alice(), [slot(1, 8, 0), slot(1, 8, 30)])
        .unwrap();

    assert_eq!(heatmap.occupied_len(), 2);
    assert_eq!(heatmap.count(&slot(1, 8, 0)), 1);
    assert_eq!(heatmap.count(&slot(1, 8, 30)), 1);
    for other in valid_slots(&event)
        .unwrap()
        .into_iter()
        .filter(|candidate| *candidate != slot(1, 8, 0) && *candidate != slot(1, 8, 30))
    {
        assert_eq!(heatmap.count(&other), 0);
    }
}

#[test]
fn scenario_b_reconfirm_replaces_instead_of_merging() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();

    service
        .confirm(event.id, &alice(), [slot(1, 8, 0), slot(1, 8, 30)])
        .unwrap();
    let heatmap = service.confirm(event.id, &alice(), [slot(1, 8, 0)]).unwrap();

    assert_eq!(heatmap.count(&slot(1, 8, 0)), 1);
    assert_eq!(heatmap.count(&slot(1, 8, 30)), 0);
    assert!(heatmap.get(&slot(1, 8, 30)).is_none());
    assert_eq!(
        service.selection(event.id, &alice().id).unwrap(),
        BTreeSet::from([slot(1, 8, 0)])
    );
}

#[test]
fn scenario_c_two_participants_share_a_slot() {
    let conn = open_db_in_memory().unwrap();
    let config = EngineConfig::default();
    let service = sqlite_confirm_service(&conn, &config).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();

    service.confirm(event.id, &alice(), [slot(1, 8, 0)]).unwrap();
    let heatmap = service.confirm(event.id, &bob(), [slot(1, 8, 0)]).unwrap();

    let shared = heatmap.get(&slot(1, 8, 0)).unwrap();
    assert_eq!(shared.participant_count, 2);
    assert_eq!(shared.participant_nicknames(), vec!["alice", "bob"]);
    let expected = config.intensity.base + 2.0 * config.intensity.step;
    assert!((shared.intensity - expected).abs() < 1e-9);
}

#[test]
fn scenario_d_out_of_range_slot_fails_without_mutation() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();
    service
        .confirm(event.id, &alice(), [slot(1, 9, 0), slot(2, 8, 0)])
        .unwrap();
    let before = service.selection(event.id, &alice().id).unwrap();

    let err = service
        .confirm(event.id, &alice(), [slot(1, 8, 0), slot(3, 8, 0)])
        .unwrap_err();

    assert!(matches!(err, EngineError::SlotOutOfRange { slot, .. } if slot == self::slot(3, 8, 0)));
    assert!(!err.is_retryable());
    assert_eq!(service.selection(event.id, &alice().id).unwrap(), before);
    assert_eq!(service.aggregate(event.id).unwrap().count(&slot(1, 8, 0)), 0);
}

#[test]
fn confirming_the_same_candidate_twice_counts_once() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();
    let candidate = [slot(1, 8, 0), slot(2, 9, 30)];

    let first = service.confirm(event.id, &alice(), candidate).unwrap();
    let second = service.confirm(event.id, &alice(), candidate).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.count(&slot(1, 8, 0)), 1);
    assert_eq!(second.count(&slot(2, 9, 30)), 1);
    assert_eq!(
        service.selection(event.id, &alice().id).unwrap(),
        candidate.into_iter().collect::<BTreeSet<_>>()
    );
}

#[test]
fn repeated_slots_in_one_candidate_are_collapsed() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();

    let heatmap = service
        .confirm(
            event.id,
            &alice(),
            vec![slot(1, 8, 0), slot(1, 8, 0), slot(1, 8, 0)],
        )
        .unwrap();

    let aggregate = heatmap.get(&slot(1, 8, 0)).unwrap();
    assert_eq!(aggregate.participant_count, 1);
    assert_eq!(aggregate.participants.len(), 1);
}

#[test]
fn unknown_event_is_not_found_everywhere() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.confirm(missing, &alice(), [slot(1, 8, 0)]),
        Err(EngineError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.aggregate(missing),
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        service.selection(missing, &alice().id),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn aggregate_is_stable_between_writes() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();
    service.confirm(event.id, &alice(), [slot(1, 8, 0)]).unwrap();
    service.confirm(event.id, &bob(), [slot(2, 8, 0)]).unwrap();

    assert_eq!(
        service.aggregate(event.id).unwrap(),
        service.aggregate(event.id).unwrap()
    );
    assert_eq!(
        service.participants(event.id).unwrap(),
        vec![alice().id, bob().id]
    );
}

#[test]
fn intensity_follows_configuration_and_saturates() {
    let conn = open_db_in_memory().unwrap();
    let config = EngineConfig {
        intensity: IntensityConfig {
            base: 0.2,
            step: 0.3,
        },
        ..EngineConfig::default()
    };
    let service = sqlite_confirm_service(&conn, &config).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();

    let mut previous = 0.0;
    for index in 0..5 {
        let participant = Participant::new(format!("p{index}"), format!("user{index}"));
        let heatmap = service
            .confirm(event.id, &participant, [slot(1, 8, 0)])
            .unwrap();
        let intensity = heatmap.intensity(&slot(1, 8, 0));
        assert!(intensity >= previous);
        assert!(intensity <= 1.0);
        previous = intensity;
    }
    assert_eq!(previous, 1.0);
}

#[test]
fn unusable_intensity_settings_are_rejected_before_any_confirm() {
    let conn = open_db_in_memory().unwrap();
    for intensity in [
        IntensityConfig {
            base: f64::NAN,
            step: 0.1,
        },
        IntensityConfig {
            base: 0.5,
            step: -0.5,
        },
    ] {
        let config = EngineConfig {
            intensity,
            ..EngineConfig::default()
        };
        let err = sqlite_confirm_service(&conn, &config).err().unwrap();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "invalid_config");
    }

    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();
    let heatmap = service.confirm(event.id, &alice(), [slot(1, 8, 0)]).unwrap();
    let intensity = heatmap.intensity(&slot(1, 8, 0));
    assert!((0.0..=1.0).contains(&intensity));
}

#[test]
fn events_without_a_display_name_accept_confirms() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = Event::new(Uuid::new_v4(), "", date(1), date(2), 8, 10, 30).unwrap();
    service.register_event(&event).unwrap();

    let heatmap = service.confirm(event.id, &alice(), [slot(2, 9, 0)]).unwrap();
    assert_eq!(heatmap.count(&slot(2, 9, 0)), 1);
}

#[test]
fn dense_heatmap_lists_every_cell_with_labels() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();
    service.confirm(event.id, &alice(), [slot(2, 9, 30)]).unwrap();

    let cells = service.aggregate(event.id).unwrap().dense();
    assert_eq!(cells.len(), 8);
    let last = cells.last().unwrap();
    assert_eq!(last.slot.to_string(), "2024-05-02T09:30");
    assert_eq!(last.end_time.format("%H:%M").to_string(), "10:00");
    assert_eq!(last.participant_nicknames, vec!["alice".to_string()]);
}

#[test]
fn heatmap_serializes_slots_as_text_keys() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_confirm_service(&conn, &EngineConfig::default()).unwrap();
    let event = two_day_event();
    service.register_event(&event).unwrap();

    let heatmap = service.confirm(event.id, &alice(), [slot(1, 8, 0)]).unwrap();
    let json = serde_json::to_value(&heatmap).unwrap();

    let entry = &json["slots"]["2024-05-01T08:00"];
    assert_eq!(entry["participant_count"], 1);
    assert_eq!(entry["participants"][0]["nickname"], "alice");
}
