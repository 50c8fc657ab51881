use crate::errors::ExternalStoreError;
use crate::models::RecordId;
use crate::services::RecordStore;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Notion property types this service writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Select,
    Date,
}

impl PropertyKind {
    /// Wraps a display string in the Notion property value shape for this kind.
    pub fn render(self, content: &str) -> Value {
        match self {
            PropertyKind::Title => json!({ "title": [{ "text": { "content": content } }] }),
            PropertyKind::RichText => {
                json!({ "rich_text": [{ "text": { "content": content } }] })
            }
            PropertyKind::Select => json!({ "select": { "name": content } }),
            PropertyKind::Date => json!({ "date": { "start": content } }),
        }
    }
}

/// Error object returned by the Notion API.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for creating pages in a Notion database.
#[derive(Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    notion_version: String,
}

impl NotionClient {
    /// Creates a new `NotionClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The Notion API base URL, including the `/v1` prefix.
    /// * `api_key` - Integration secret sent as a bearer token.
    /// * `notion_version` - Value of the `Notion-Version` header.
    pub fn new(
        base_url: String,
        api_key: String,
        notion_version: String,
    ) -> Result<Self, ExternalStoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ExternalStoreError::Unknown(format!("Failed to create Notion client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            notion_version,
        })
    }

    /// Creates a page under `database_id` with the given properties.
    ///
    /// # Returns
    ///
    /// * `Result<RecordId, ExternalStoreError>` - The id of the created page.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<RecordId, ExternalStoreError> {
        let url = format!("{}/pages", self.base_url);
        tracing::debug!("Creating Notion page in database {}", database_id);

        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.notion_version)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_error(status, &error_text));
        }

        let response_data: Value = response.json().await.map_err(|e| {
            ExternalStoreError::Unknown(format!("Failed to parse Notion response: {}", e))
        })?;

        let raw_id = response_data
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| {
                ExternalStoreError::Unknown("Notion response missing 'id' field".to_string())
            })?;

        RecordId::parse(raw_id).ok_or_else(|| {
            ExternalStoreError::Unknown(format!("Notion returned a malformed page id: {}", raw_id))
        })
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn create_record(
        &self,
        container_id: &str,
        properties: Map<String, Value>,
    ) -> Result<RecordId, ExternalStoreError> {
        self.create_page(container_id, properties).await
    }
}

/// Maps a failed Notion response onto a store error kind.
///
/// The `code` in the error body decides; the HTTP status is the fallback when the
/// body is not a Notion error object.
pub fn classify_error(status: StatusCode, body: &str) -> ExternalStoreError {
    let parsed: Option<NotionErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.as_deref());
    let detail = match parsed.as_ref().and_then(|b| b.message.as_deref()) {
        Some(message) => format!("Notion returned {}: {}", status, message),
        None => format!("Notion returned {}: {}", status, body),
    };

    match code {
        Some("unauthorized") | Some("restricted_resource") => {
            ExternalStoreError::Authentication(detail)
        }
        Some("object_not_found") => ExternalStoreError::TargetNotFound(detail),
        Some("validation_error")
        | Some("invalid_json")
        | Some("invalid_request")
        | Some("invalid_request_url") => ExternalStoreError::Rejected(detail),
        Some(_) => ExternalStoreError::Unknown(detail),
        None => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ExternalStoreError::Authentication(detail)
            }
            StatusCode::NOT_FOUND => ExternalStoreError::TargetNotFound(detail),
            _ => ExternalStoreError::Unknown(detail),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = NotionClient::new(
            "https://example.com/v1/".to_string(),
            "token".to_string(),
            "2022-06-28".to_string(),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://example.com/v1");
    }

    #[test]
    fn test_render_property_shapes() {
        assert_eq!(
            PropertyKind::Title.render("단지"),
            json!({ "title": [{ "text": { "content": "단지" } }] })
        );
        assert_eq!(
            PropertyKind::Select.render("불가능"),
            json!({ "select": { "name": "불가능" } })
        );
        assert_eq!(
            PropertyKind::Date.render("2024-01-01T00:00:00.000Z"),
            json!({ "date": { "start": "2024-01-01T00:00:00.000Z" } })
        );
        assert_eq!(
            PropertyKind::RichText.render("1.0억"),
            json!({ "rich_text": [{ "text": { "content": "1.0억" } }] })
        );
    }

    #[test]
    fn test_classify_by_notion_code() {
        let body = |code: &str| {
            json!({"object": "error", "status": 400, "code": code, "message": "nope"}).to_string()
        };

        assert!(matches!(
            classify_error(StatusCode::UNAUTHORIZED, &body("unauthorized")),
            ExternalStoreError::Authentication(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, &body("restricted_resource")),
            ExternalStoreError::Authentication(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::NOT_FOUND, &body("object_not_found")),
            ExternalStoreError::TargetNotFound(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::BAD_REQUEST, &body("validation_error")),
            ExternalStoreError::Rejected(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, &body("rate_limited")),
            ExternalStoreError::Unknown(_)
        ));
    }

    #[test]
    fn test_classify_falls_back_to_status() {
        assert!(matches!(
            classify_error(StatusCode::UNAUTHORIZED, "<html>denied</html>"),
            ExternalStoreError::Authentication(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            ExternalStoreError::Unknown(_)
        ));
    }

    #[test]
    fn test_classify_keeps_notion_message() {
        let body = json!({"code": "validation_error", "message": "결과 is not a property"});
        let err = classify_error(StatusCode::BAD_REQUEST, &body.to_string());
        assert!(err.to_string().contains("결과 is not a property"));
    }
}
