//! Inquiry-to-record mapping.
//!
//! A [`MappingProfile`] is an ordered rule table: which record values a deployment
//! derives, how each is computed from the raw inquiry, and which store property
//! receives it. The handler variants differ only in their profile.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::errors::ValidationError;
use crate::models::{InquiryInput, MappedRecord, ResultCategory};
use crate::notion_client::PropertyKind;

/// Record value a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Title,
    Timestamp,
    Size,
    Area,
    Price,
    Deposit,
    Loan,
    Result,
}

impl RecordField {
    /// Name of the inquiry field this value is read from, as callers send it.
    pub fn source_name(self) -> &'static str {
        match self {
            RecordField::Title => "complexName",
            RecordField::Timestamp => "timestamp",
            RecordField::Size => "pyeong",
            RecordField::Area => "area",
            RecordField::Price => "salePrice",
            RecordField::Deposit => "deposit",
            RecordField::Loan => "loan",
            RecordField::Result => "result",
        }
    }

    fn source<'a>(self, input: &'a InquiryInput) -> Option<&'a Value> {
        match self {
            RecordField::Area => input.area.as_ref(),
            RecordField::Price => input.sale_price.as_ref(),
            RecordField::Deposit => input.deposit.as_ref(),
            RecordField::Loan => input.loan.as_ref(),
            RecordField::Result => input.result.as_ref(),
            RecordField::Size => input.pyeong.as_ref(),
            RecordField::Title | RecordField::Timestamp => None,
        }
    }
}

/// How a raw value becomes a display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Trimmed text, dropped when blank.
    Text,
    /// `"<pyeong>평 <type>"`, dropped when both parts are blank.
    SizeJoin,
    /// `"<area>㎡"`.
    SquareMeters,
    /// `round(amount / 10000, 1)` followed by the profile's unit suffix.
    EokAmount,
    /// Recognized result categories mapped to their display label.
    ResultTable,
    /// Mapping time as ISO-8601.
    IsoTimestamp,
}

/// Store property receiving a derived value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: String,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: RecordField,
    pub required: bool,
    pub transform: Transform,
    pub property: PropertySpec,
}

impl FieldRule {
    pub fn new(field: RecordField, transform: Transform, name: &str, kind: PropertyKind) -> Self {
        Self {
            field,
            required: false,
            transform,
            property: PropertySpec {
                name: name.to_string(),
                kind,
            },
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingProfile {
    pub name: &'static str,
    pub success_message: &'static str,
    pub unit_suffix: String,
    pub rules: Vec<FieldRule>,
}

impl MappingProfile {
    /// Complex name and lookup time only.
    pub fn complex_only() -> Self {
        Self {
            name: "complex_only",
            success_message: "단지명이 성공적으로 저장되었습니다.",
            unit_suffix: String::new(),
            rules: vec![
                FieldRule::new(RecordField::Title, Transform::Text, "단지명", PropertyKind::Title)
                    .required(),
                FieldRule::new(
                    RecordField::Timestamp,
                    Transform::IsoTimestamp,
                    "조회일시",
                    PropertyKind::Date,
                ),
            ],
        }
    }

    /// Complex name, unit size, pricing tuple, guarantee result and lookup time.
    pub fn full_pricing(unit_suffix: impl Into<String>) -> Self {
        Self {
            name: "full_pricing",
            success_message: "조회 결과가 성공적으로 저장되었습니다.",
            unit_suffix: unit_suffix.into(),
            rules: vec![
                FieldRule::new(RecordField::Title, Transform::Text, "단지명", PropertyKind::Title)
                    .required(),
                FieldRule::new(RecordField::Size, Transform::SizeJoin, "평형", PropertyKind::RichText),
                FieldRule::new(
                    RecordField::Area,
                    Transform::SquareMeters,
                    "면적",
                    PropertyKind::RichText,
                ),
                FieldRule::new(
                    RecordField::Price,
                    Transform::EokAmount,
                    "KB시세",
                    PropertyKind::RichText,
                ),
                FieldRule::new(
                    RecordField::Deposit,
                    Transform::EokAmount,
                    "보증금",
                    PropertyKind::RichText,
                ),
                FieldRule::new(RecordField::Loan, Transform::EokAmount, "융자금", PropertyKind::RichText),
                FieldRule::new(
                    RecordField::Result,
                    Transform::ResultTable,
                    "결과",
                    PropertyKind::Select,
                ),
                FieldRule::new(
                    RecordField::Timestamp,
                    Transform::IsoTimestamp,
                    "조회일시",
                    PropertyKind::Date,
                ),
            ],
        }
    }

    /// Validates `input` and derives the record for this profile.
    ///
    /// `now` becomes the record timestamp. No other state is read.
    pub fn map_and_validate(
        &self,
        input: &InquiryInput,
        now: DateTime<Utc>,
    ) -> Result<MappedRecord, ValidationError> {
        let title = input
            .complex_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingField("complexName"))?;

        let mut record = MappedRecord::new(title.to_string(), now);

        for rule in &self.rules {
            if matches!(rule.field, RecordField::Title | RecordField::Timestamp) {
                continue;
            }

            let value = self.derive(rule, input);
            if value.is_none() && rule.required {
                return Err(ValidationError::MissingField(rule.field.source_name()));
            }

            let slot = match rule.field {
                RecordField::Size => &mut record.size_label,
                RecordField::Area => &mut record.area_label,
                RecordField::Price => &mut record.price_label,
                RecordField::Deposit => &mut record.deposit_label,
                RecordField::Loan => &mut record.loan_label,
                RecordField::Result => &mut record.result_label,
                RecordField::Title | RecordField::Timestamp => continue,
            };
            *slot = value;
        }

        Ok(record)
    }

    /// Store properties for `record`, one per rule whose value is present.
    pub fn to_properties(&self, record: &MappedRecord) -> Map<String, Value> {
        let mut properties = Map::new();

        for rule in &self.rules {
            let value = match rule.field {
                RecordField::Title => Some(record.title.clone()),
                RecordField::Timestamp => Some(record.timestamp_iso()),
                RecordField::Size => record.size_label.clone(),
                RecordField::Area => record.area_label.clone(),
                RecordField::Price => record.price_label.clone(),
                RecordField::Deposit => record.deposit_label.clone(),
                RecordField::Loan => record.loan_label.clone(),
                RecordField::Result => record.result_label.clone(),
            };

            if let Some(content) = value {
                properties.insert(rule.property.name.clone(), rule.property.kind.render(&content));
            }
        }

        properties
    }

    fn derive(&self, rule: &FieldRule, input: &InquiryInput) -> Option<String> {
        let raw = rule.field.source(input);

        match rule.transform {
            Transform::Text => raw.and_then(text_of),
            Transform::SizeJoin => size_label(input.pyeong.as_ref(), input.unit_type.as_ref()),
            Transform::SquareMeters => raw.and_then(text_of).map(|area| format!("{}㎡", area)),
            Transform::EokAmount => raw
                .and_then(parse_amount)
                .map(|amount| format_eok(amount, &self.unit_suffix)),
            Transform::ResultTable => raw
                .and_then(Value::as_str)
                .and_then(ResultCategory::parse)
                .map(|category| category.display_label().to_string()),
            // The timestamp is always taken from the record itself
            Transform::IsoTimestamp => None,
        }
    }
}

/// Trimmed string or number text; `None` for blanks and other JSON types.
fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Joins pyeong and unit type as `"<pyeong>평 <type>"`.
pub fn size_label(pyeong: Option<&Value>, unit_type: Option<&Value>) -> Option<String> {
    let pyeong = pyeong.and_then(text_of);
    let unit_type = unit_type.and_then(text_of);

    match (pyeong, unit_type) {
        (Some(p), Some(t)) => Some(format!("{}평 {}", p, t)),
        (Some(p), None) => Some(format!("{}평", p)),
        (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

/// Largest amount accepted (2^53). Above it `f64` no longer holds every integer and the
/// tenths count would not be exact.
pub const MAX_AMOUNT: f64 = 9_007_199_254_740_992.0;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("amount pattern is valid"))
}

/// Reads a non-negative amount from a JSON number or numeric string.
///
/// Thousands separators and surrounding whitespace are ignored in strings. Amounts above
/// [`MAX_AMOUNT`] count as not provided.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            if !amount_pattern().is_match(&cleaned) {
                return None;
            }
            cleaned.parse().ok()?
        }
        _ => return None,
    };

    (amount.is_finite() && (0.0..=MAX_AMOUNT).contains(&amount)).then_some(amount)
}

/// `round(amount / 10000, 1)` with one decimal and `unit` appended.
///
/// Computed in whole tenths (`amount / 1000`) so half-way values round up exactly.
pub fn format_eok(amount: f64, unit: &str) -> String {
    let tenths = (amount / 1000.0).round() as i64;
    format!("{}.{}{}", tenths / 10, tenths % 10, unit)
}
