// src/domain/table.rs

use crate::domain::property::{parse_date, PropertyRecord};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Address,
    FloorAreaSqFt,
    FloorAreaSqM,
    PricePerSqFt,
    PricePerSqM,
    EstimatedValue,
    HabitableRooms,
    InspectionDate,
}

pub struct Column {
    pub key: SortKey,
    pub label: &'static str,
    pub tooltip: &'static str,
}

pub const COLUMNS: &[Column] = &[
    Column {
        key: SortKey::Address,
        label: "Address",
        tooltip: "Full property address including house number and street name",
    },
    Column {
        key: SortKey::FloorAreaSqFt,
        label: "Floor Area (Square Feet)",
        tooltip: "Total floor area of the property measured in square feet from EPC data",
    },
    Column {
        key: SortKey::FloorAreaSqM,
        label: "Floor Area (Square Meters)",
        tooltip: "Total floor area of the property measured in square meters, converted from square feet",
    },
    Column {
        key: SortKey::PricePerSqFt,
        label: "Price per Sq Ft",
        tooltip: "Average sold price per square foot based on recent transactions in the area",
    },
    Column {
        key: SortKey::PricePerSqM,
        label: "Price per Sq M",
        tooltip: "Average sold price per square meter based on recent transactions in the area",
    },
    Column {
        key: SortKey::EstimatedValue,
        label: "Estimated Value",
        tooltip: "Estimated property value calculated using the floor area and local price per square foot",
    },
    Column {
        key: SortKey::HabitableRooms,
        label: "Habitable Rooms",
        tooltip: "Number of habitable rooms excluding bathrooms, toilets, halls, and storage spaces",
    },
    Column {
        key: SortKey::InspectionDate,
        label: "Inspection Date",
        tooltip: "Date when the property was last inspected for the EPC assessment",
    },
];

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Address => "address",
            SortKey::FloorAreaSqFt => "floor_area_sq_ft",
            SortKey::FloorAreaSqM => "floor_area_sq_m",
            SortKey::PricePerSqFt => "price_per_sq_ft",
            SortKey::PricePerSqM => "price_per_sq_m",
            SortKey::EstimatedValue => "estimated_value",
            SortKey::HabitableRooms => "habitable_rooms",
            SortKey::InspectionDate => "inspection_date",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COLUMNS
            .iter()
            .map(|c| c.key)
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Direction a click on `key`'s header should request next: an
    /// ascending column flips to descending, anything else starts ascending.
    pub fn next_for(current: Option<SortConfig>, key: SortKey) -> SortConfig {
        let direction = match current {
            Some(c) if c.key == key && c.direction == SortDirection::Asc => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        SortConfig { key, direction }
    }
}

enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

fn sort_value(p: &PropertyRecord, key: SortKey) -> Option<SortValue<'_>> {
    match key {
        SortKey::Address => Some(SortValue::Text(&p.address)),
        SortKey::FloorAreaSqFt => p.floor_area_sq_ft.map(SortValue::Number),
        SortKey::FloorAreaSqM => p.floor_area_sq_m.map(SortValue::Number),
        SortKey::PricePerSqFt => p.price_per_sq_ft.map(SortValue::Number),
        SortKey::PricePerSqM => p.price_per_sq_m.map(SortValue::Number),
        SortKey::EstimatedValue => p.estimated_value.map(SortValue::Number),
        SortKey::HabitableRooms => Some(SortValue::Number(p.habitable_rooms as f64)),
        SortKey::InspectionDate => Some(SortValue::Text(&p.inspection_date)),
    }
}

/// Stable sort; missing values always go last whatever the direction.
pub fn sort_properties(properties: &mut [PropertyRecord], config: SortConfig) {
    properties.sort_by(|a, b| {
        match (sort_value(a, config.key), sort_value(b, config.key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (SortValue::Number(x), SortValue::Number(y)) => {
                        x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                    }
                    (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
                    _ => Ordering::Equal,
                };
                match config.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    });
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole pounds with thousands separators, "N/A" when missing.
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let sign = if v < 0.0 { "-" } else { "" };
            format!("{sign}£{}", group_thousands(v.abs().round() as u64))
        }
        _ => "N/A".to_string(),
    }
}

/// Area with thousands separators and up to two decimals.
pub fn format_area(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => {
            let hundredths = (v.abs() * 100.0).round() as u64;
            let whole = group_thousands(hundredths / 100);
            let frac = hundredths % 100;
            let sign = if v < 0.0 { "-" } else { "" };
            match frac {
                0 => format!("{sign}{whole}"),
                f if f % 10 == 0 => format!("{sign}{whole}.{}", f / 10),
                f => format!("{sign}{whole}.{f:02}"),
            }
        }
        _ => "N/A".to_string(),
    }
}

pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}
