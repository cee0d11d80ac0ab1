//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `slotmeet_core` linkage without a presentation layer.
//! - Run one deterministic in-memory confirm round and print the heatmap.
//!
//! Usage: `slotmeet_cli [config.json]`

use chrono::NaiveDate;
use slotmeet_core::db::open_db_in_memory_with;
use slotmeet_core::{sqlite_confirm_service, EngineConfig, Event, Participant, SlotId};
use std::error::Error;
use uuid::Uuid;

fn main() -> Result<(), Box<dyn Error>> {
    println!("slotmeet_core ping={}", slotmeet_core::ping());
    println!("slotmeet_core version={}", slotmeet_core::core_version());

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    let conn = open_db_in_memory_with(&config.store)?;
    let service = sqlite_confirm_service(&conn, &config)?;

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).ok_or("invalid demo date")?;
    let event = Event::new(Uuid::nil(), "demo", day, day, 8, 10, 30)?;
    service.register_event(&event)?;

    let eight = SlotId::at(day, 8, 0).ok_or("invalid demo slot")?;
    let half_past = SlotId::at(day, 8, 30).ok_or("invalid demo slot")?;
    service.confirm(event.id, &Participant::new("1", "alice"), [eight, half_past])?;
    let heatmap = service.confirm(event.id, &Participant::new("2", "bob"), [eight])?;

    for cell in heatmap.dense() {
        println!(
            "{} - {} count={} intensity={:.2} who={}",
            cell.slot,
            cell.end_time.format("%H:%M"),
            cell.participant_count,
            cell.intensity,
            serde_json::to_string(&cell.participant_nicknames)?
        );
    }
    Ok(())
}
