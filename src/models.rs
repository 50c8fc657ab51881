use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

// ============ Inquiry Payload ============

/// One user-submitted real-estate inquiry.
///
/// Numeric descriptors are kept as raw JSON values: callers send both numbers and
/// numeric strings, and a field that fails to parse is dropped rather than rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryInput {
    #[serde(default)]
    pub complex_name: Option<String>,
    #[serde(default)]
    pub area: Option<Value>,
    #[serde(default)]
    pub pyeong: Option<Value>,
    #[serde(default, rename = "type")]
    pub unit_type: Option<Value>,
    /// Also accepted as `kbPrice`.
    #[serde(default, alias = "kbPrice")]
    pub sale_price: Option<Value>,
    #[serde(default)]
    pub deposit: Option<Value>,
    #[serde(default)]
    pub loan: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
}

/// Guarantee-insurance outcome of an inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCategory {
    BothPossible,
    SgiOnly,
    Impossible,
}

impl ResultCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "both_possible" => Some(ResultCategory::BothPossible),
            "sgi_only" => Some(ResultCategory::SgiOnly),
            "impossible" => Some(ResultCategory::Impossible),
            _ => None,
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            ResultCategory::BothPossible => "HUG·SGI 모두 가능",
            ResultCategory::SgiOnly => "SGI만 가능",
            ResultCategory::Impossible => "불가능",
        }
    }
}

// ============ Derived Record ============

/// Display-ready record derived from an [`InquiryInput`].
///
/// Optional labels are `None` when their source data is absent; they are never
/// written to the store as null or empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedRecord {
    pub title: String,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_label: Option<String>,
}

impl MappedRecord {
    pub fn new(title: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            title,
            timestamp,
            size_label: None,
            area_label: None,
            price_label: None,
            deposit_label: None,
            loan_label: None,
            result_label: None,
        }
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn serialize_iso_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Identifier the external store assigned to a created record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(RecordId)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// ============ API Response ============

/// Success body for an inquiry save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInquiryResponse {
    pub success: bool,
    pub message: String,
    pub complex_name: String,
    #[serde(flatten)]
    pub record: MappedRecord,
    pub record_id: RecordId,
}
