use actix_web::{web, HttpResponse};
use caly_core::model::parse_date;
use caly_core::{find_free_slots, Event, Preferences, TimeSlot};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct SlotsRequest {
    pub date: String,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub preferences: Preferences,
    /// Slot length in minutes; defaults to the preferred task duration.
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

pub async fn handler(req: web::Json<SlotsRequest>) -> Result<HttpResponse> {
    let req = req.into_inner();
    let date =
        parse_date(&req.date).map_err(|e| AppError::InvalidSlotRequest(e.to_string()))?;
    let duration = req
        .duration
        .filter(|minutes| *minutes > 0)
        .unwrap_or(req.preferences.preferred_task_duration);

    let slots = find_free_slots(date, &req.events, &req.preferences, duration)
        .map_err(|e| AppError::InvalidSlotRequest(e.to_string()))?;
    log::debug!("{} free {}-minute slots on {}", slots.len(), duration, date);

    Ok(HttpResponse::Ok().json(SlotsResponse {
        date: date.format("%Y-%m-%d").to_string(),
        slots,
    }))
}
