use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveTime;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    #[default]
    #[serde(alias = "presencial", alias = "in-person")]
    InPerson,
    #[serde(alias = "virtual_visit", alias = "telehealth")]
    Virtual,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::InPerson => "in_person",
            VisitType::Virtual => "virtual",
        }
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
    /// Absent when the server does not say; only an explicit `false` rules
    /// the specialty out of virtual visits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_virtual: Option<bool>,
}

impl Specialty {
    pub fn offers_virtual(&self) -> bool {
        self.supports_virtual != Some(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialty_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

/// A bookable start time for one doctor on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub available: bool,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// Finds `time` in `slots` if it can still be booked.
pub fn find_available_slot(slots: &[TimeSlot], time: NaiveTime) -> Option<&TimeSlot> {
    slots.iter().find(|slot| slot.time == time && slot.available)
}

/// Slot times travel as "HH:MM"; "HH:MM:SS" is accepted on the way in.
pub mod slot_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| format!("invalid slot time '{}'", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visit_type_wire_names() {
        assert_eq!(serde_json::to_value(VisitType::Virtual).unwrap(), json!("virtual"));
        assert_eq!(serde_json::to_value(VisitType::InPerson).unwrap(), json!("in_person"));

        let parsed: VisitType = serde_json::from_value(json!("telehealth")).unwrap();
        assert_eq!(parsed, VisitType::Virtual);
    }

    #[test]
    fn test_specialty_without_virtual_flag_offers_virtual() {
        let plain: Specialty = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "name": "Psicología"
        }))
        .unwrap();
        assert_eq!(plain.supports_virtual, None);
        assert!(plain.offers_virtual());

        let in_person_only: Specialty = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "name": "Traumatología",
            "supportsVirtual": false
        }))
        .unwrap();
        assert!(!in_person_only.offers_virtual());
    }

    #[test]
    fn test_slot_time_formats() {
        let slot: TimeSlot = serde_json::from_value(json!({ "time": "09:45:00", "available": true })).unwrap();
        assert_eq!(slot.label(), "09:45");
        assert_eq!(serde_json::to_value(&slot).unwrap()["time"], json!("09:45"));

        assert!(serde_json::from_value::<TimeSlot>(json!({ "time": "9.45", "available": true })).is_err());
    }

    #[test]
    fn test_find_available_slot_skips_taken() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let nine_45 = NaiveTime::from_hms_opt(9, 45, 0).unwrap();
        let slots = vec![
            TimeSlot { time: nine, available: true },
            TimeSlot { time: nine_45, available: false },
        ];

        assert!(find_available_slot(&slots, nine).is_some());
        assert!(find_available_slot(&slots, nine_45).is_none());
        assert!(find_available_slot(&slots, NaiveTime::from_hms_opt(10, 0, 0).unwrap()).is_none());
    }
}
