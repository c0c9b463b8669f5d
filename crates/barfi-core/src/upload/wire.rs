//! JSON payloads exchanged with the file-hosting service.

use serde::{Deserialize, Serialize};

/// Body of `POST {endpoint}/f/`.
#[derive(Debug, Serialize)]
pub struct InitiateRequest<'a> {
    /// File name
    pub name: &'a str,
    /// File size in bytes
    pub size: u64,
}

/// Successful answer to the initiation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    /// Session identifier
    pub upload_id: String,
    /// One pre-signed URL per chunk, in chunk order
    pub upload_urls: Vec<String>,
}

/// One successfully transferred chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Integrity token returned for the byte range
    #[serde(rename = "ETag")]
    pub etag: String,
    /// 1-based part number
    #[serde(rename = "PartNumber")]
    pub part_number: usize,
}

/// Body of `POST {endpoint}/f/{uploadId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest<'a> {
    /// Destination directory, serialized as `null` when absent
    pub directory_id: Option<&'a str>,
    /// All parts, ordered by part number
    pub parts: &'a [Part],
}

/// Successful answer to the finalize request.
#[derive(Debug, Deserialize)]
pub struct CompleteResponse {
    /// Identifier of the stored object
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_request_shape() {
        let parts = vec![
            Part {
                etag: "\"a1\"".to_string(),
                part_number: 1,
            },
            Part {
                etag: "\"b2\"".to_string(),
                part_number: 2,
            },
        ];
        let body = CompleteRequest {
            directory_id: None,
            parts: &parts,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "directoryId": null,
                "parts": [
                    {"ETag": "\"a1\"", "PartNumber": 1},
                    {"ETag": "\"b2\"", "PartNumber": 2}
                ]
            })
        );
    }

    #[test]
    fn test_initiate_response_field_names() {
        let resp: InitiateResponse =
            serde_json::from_str(r#"{"uploadId":"u1","uploadUrls":["https://a","https://b"]}"#)
                .unwrap();
        assert_eq!(resp.upload_id, "u1");
        assert_eq!(resp.upload_urls.len(), 2);

        assert!(serde_json::from_str::<InitiateResponse>(r#"{"upload_id":"u1"}"#).is_err());
    }
}
