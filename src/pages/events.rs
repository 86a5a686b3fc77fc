use chrono::{DateTime, NaiveDate, Utc};

use crate::api::{ApiClient, ApiError};
use crate::controller::{Messages, Resource};
use crate::forms::{blank_to_none, date_input, iso_millis, parse_date, required, FormError};
use crate::models::{Event, EventPayload, EventStatus};
use crate::table::{CellValue, Column, ColumnKind, Tabular};

pub const HEADER_PATH: &str = "/events/header";

/// Dates are `YYYY-MM-DD` strings, as entered in a date input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub start_date: String,
    pub end_date: String,
    pub status: EventStatus,
    pub event_type: String,
}

pub struct EventResource;

impl Resource for EventResource {
    type Record = Event;
    type Form = EventForm;
    type Payload = EventPayload;

    const PATH: &'static str = "/events";
    const CREATE_TITLE: &'static str = "Ajouter un événement";
    const EDIT_TITLE: &'static str = "Modifier l'événement";
    const MESSAGES: Messages = Messages {
        load_failed: "Impossible de charger les événements",
        created: "Événement créé avec succès",
        updated: "Événement mis à jour avec succès",
        deleted: "Événement supprimé avec succès",
    };
    const EMPTY_MESSAGE: &'static str = "Aucun événement trouvé";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Nom", ColumnKind::Composite { separator: " " }),
            Column::new("startDate", "Date de début", ColumnKind::Date),
            Column::new("endDate", "Date de fin", ColumnKind::Date),
            Column::new("status", "Statut", ColumnKind::Text),
            Column::new("eventType", "Type", ColumnKind::Text),
        ]
    }

    fn label(record: &Event) -> String {
        record.name.clone()
    }

    fn load_form(record: &Event) -> EventForm {
        EventForm {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            image_url: record.image_url.clone().unwrap_or_default(),
            start_date: date_input(record.start_date.as_ref()),
            end_date: date_input(record.end_date.as_ref()),
            status: record.status,
            event_type: record.event_type.clone().unwrap_or_default(),
        }
    }

    fn build_payload(form: &EventForm, editing: Option<&Event>) -> Result<EventPayload, FormError> {
        let start = parse_date("date de début", &form.start_date)?;
        let end = parse_date("date de fin", &form.end_date)?;
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(FormError::EndBeforeStart);
            }
        }

        let start_date = start
            .map(|date| {
                timestamp_for(date, editing.and_then(|e| e.start_date.as_ref()), start_of_day)
            })
            .transpose()?;
        let end_date = end
            .map(|date| timestamp_for(date, editing.and_then(|e| e.end_date.as_ref()), end_of_day))
            .transpose()?;

        Ok(EventPayload {
            name: required("nom", &form.name)?,
            description: blank_to_none(&form.description),
            image_url: blank_to_none(&form.image_url),
            start_date,
            end_date,
            status: form.status,
            event_type: blank_to_none(&form.event_type),
        })
    }
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_milli_opt(0, 0, 0, 0).map(|d| d.and_utc())
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_milli_opt(23, 59, 59, 999).map(|d| d.and_utc())
}

/// An unchanged day keeps the stored timestamp; a new day is pinned with `pin`.
fn timestamp_for(
    date: NaiveDate,
    stored: Option<&DateTime<Utc>>,
    pin: fn(NaiveDate) -> Option<DateTime<Utc>>,
) -> Result<String, FormError> {
    if let Some(stored) = stored.filter(|s| s.date_naive() == date) {
        return Ok(iso_millis(stored));
    }
    pin(date)
        .map(|timestamp| iso_millis(&timestamp))
        .ok_or_else(|| FormError::InvalidDate {
            field: "date",
            value: date.to_string(),
        })
}

impl Tabular for Event {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => {
                let mut parts = Vec::with_capacity(2);
                if self.image_url.is_some() {
                    parts.push("[image]".to_string());
                }
                parts.push(self.name.clone());
                CellValue::List(parts)
            }
            "startDate" => CellValue::Date(self.start_date),
            "endDate" => CellValue::Date(self.end_date),
            "status" => CellValue::text(self.status.label()),
            "eventType" => CellValue::optional(self.event_type.as_deref()),
            _ => CellValue::Text(None),
        }
    }
}

/// Public list shown in the site header. No credential required.
pub async fn header_events(api: &ApiClient) -> Result<Vec<Event>, ApiError> {
    api.get_json(HEADER_PATH).await
}
