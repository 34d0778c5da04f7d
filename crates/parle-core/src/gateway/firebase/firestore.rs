//! Firestore REST documents: create, structured query, commit.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{FirebaseSettings, error_message};
use crate::error::GatewayError;
use crate::model::{Document, FIELD_USER_ID, Flashcard, UserProfile, VOCABULARY_COLLECTION};

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// `projects/{project}/databases/(default)/documents`
fn database_documents(settings: &FirebaseSettings) -> String {
    format!(
        "projects/{}/databases/(default)/documents",
        settings.project_id
    )
}

fn documents_url(settings: &FirebaseSettings) -> String {
    format!(
        "{}/v1/{}",
        settings.firestore_base_url,
        database_documents(settings)
    )
}

/// Encodes a flat string map as Firestore `fields`.
fn encode_fields(doc: &Document) -> Value {
    let fields: Map<String, Value> = doc
        .iter()
        .map(|(key, value)| (key.clone(), json!({ "stringValue": value })))
        .collect();
    Value::Object(fields)
}

/// Keeps only string-valued fields.
fn decode_fields(fields: &Map<String, Value>) -> Document {
    fields
        .iter()
        .filter_map(|(key, value)| {
            value
                .get("stringValue")
                .and_then(Value::as_str)
                .map(|s| (key.clone(), s.to_string()))
        })
        .collect()
}

fn vocabulary_query(owner_id: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": VOCABULARY_COLLECTION }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": FIELD_USER_ID },
                    "op": "EQUAL",
                    "value": { "stringValue": owner_id }
                }
            }
        }
    })
}

fn decode_query_results(items: Vec<RunQueryItem>) -> Vec<Flashcard> {
    items
        .into_iter()
        .filter_map(|item| item.document)
        .filter_map(|doc| Flashcard::from_document(&decode_fields(&doc.fields)))
        .collect()
}

async fn store_error(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = error_message(&body).unwrap_or_else(|| status.to_string());
    GatewayError::store(format!("Store request failed (HTTP {}): {detail}", status.as_u16()))
}

fn network_error(err: &reqwest::Error) -> GatewayError {
    GatewayError::store(format!("Network error: {err}"))
}

async fn post(
    http: &reqwest::Client,
    url: &str,
    id_token: &str,
    body: &Value,
) -> Result<reqwest::Response, GatewayError> {
    let response = http
        .post(url)
        .bearer_auth(id_token)
        .json(body)
        .send()
        .await
        .map_err(|e| network_error(&e))?;

    if response.status().is_success() {
        Ok(response)
    } else {
        Err(store_error(response).await)
    }
}

pub(super) async fn create_vocabulary_document(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    id_token: &str,
    doc: &Document,
) -> Result<(), GatewayError> {
    let url = format!("{}/{VOCABULARY_COLLECTION}", documents_url(settings));
    post(http, &url, id_token, &json!({ "fields": encode_fields(doc) })).await?;
    Ok(())
}

pub(super) async fn run_query(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    id_token: &str,
    owner_id: &str,
) -> Result<Vec<Flashcard>, GatewayError> {
    let url = format!("{}:runQuery", documents_url(settings));
    let response = post(http, &url, id_token, &vocabulary_query(owner_id)).await?;
    let items: Vec<RunQueryItem> = response
        .json()
        .await
        .map_err(|e| GatewayError::store(format!("Malformed query response: {e}")))?;
    Ok(decode_query_results(items))
}

/// Writes the profile document, stamping `createdAt` with the server time.
pub(super) async fn commit_profile(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    id_token: &str,
    profile: &UserProfile,
) -> Result<(), GatewayError> {
    let url = format!("{}:commit", documents_url(settings));
    let body = json!({
        "writes": [{
            "update": {
                "name": format!("{}/{}", database_documents(settings), profile.document_path()),
                "fields": encode_fields(&profile.to_document()),
            },
            "updateTransforms": [{
                "fieldPath": "createdAt",
                "setToServerValue": "REQUEST_TIME",
            }],
        }]
    });
    post(http, &url, id_token, &body).await?;
    Ok(())
}
