//! Claims extraction and the pre-token-generation claims override.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClaimsError;

/// Extract the subject identifier from an API Gateway proxy event.
///
/// Walks `requestContext.authorizer.claims.sub`; any missing segment is a
/// malformed event, an empty value is a missing subject.
pub fn extract_subject(event: &Value) -> Result<String, ClaimsError> {
    let mut node = event;
    for segment in ["requestContext", "authorizer", "claims"] {
        node = node
            .get(segment)
            .ok_or_else(|| ClaimsError::MalformedEvent(segment.to_string()))?;
    }

    let sub = node
        .get("sub")
        .and_then(Value::as_str)
        .ok_or_else(|| ClaimsError::MalformedEvent("sub".to_string()))?;

    if sub.is_empty() {
        return Err(ClaimsError::MissingSubject);
    }
    Ok(sub.to_string())
}

/// Cognito pre-token-generation trigger event.
///
/// Cognito requires the full event echoed back, so unknown fields at every
/// level are preserved through flattened maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenGenerationEvent {
    pub request: TokenGenerationRequest,
    #[serde(default)]
    pub response: TokenGenerationResponse,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGenerationRequest {
    #[serde(default)]
    pub user_attributes: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGenerationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_override_details: Option<ClaimsOverrideDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsOverrideDetails {
    #[serde(default)]
    pub claims_to_add_or_override: Map<String, Value>,
}

/// Add a `prefixed_sub` claim to the tokens Cognito is about to issue.
///
/// Pure transform: reads the subject from the request's user attributes and
/// writes `{prefix}_{sub}` into the claims override, leaving the rest of the
/// event untouched.
pub fn override_token_claims(
    mut event: PreTokenGenerationEvent,
    prefix: &str,
) -> Result<PreTokenGenerationEvent, ClaimsError> {
    let sub = event
        .request
        .user_attributes
        .get("sub")
        .and_then(Value::as_str)
        .ok_or(ClaimsError::MissingSubject)?;

    if sub.is_empty() {
        return Err(ClaimsError::MissingSubject);
    }
    let prefixed = format!("{}_{}", prefix, sub);

    event
        .response
        .claims_override_details
        .get_or_insert_with(Default::default)
        .claims_to_add_or_override
        .insert("prefixed_sub".to_string(), Value::String(prefixed));

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_subject() {
        let event = json!({
            "requestContext": {
                "authorizer": {
                    "claims": { "sub": "abc-123", "email": "a@example.com" }
                }
            }
        });
        assert_eq!(extract_subject(&event).unwrap(), "abc-123");
    }

    #[test]
    fn test_extract_subject_missing_request_context() {
        let event = json!({ "headers": {} });
        assert_eq!(
            extract_subject(&event).unwrap_err(),
            ClaimsError::MalformedEvent("requestContext".to_string())
        );
    }

    #[test]
    fn test_extract_subject_missing_claims() {
        let event = json!({ "requestContext": { "authorizer": {} } });
        assert_eq!(
            extract_subject(&event).unwrap_err(),
            ClaimsError::MalformedEvent("claims".to_string())
        );
    }

    #[test]
    fn test_extract_subject_empty_sub() {
        let event = json!({
            "requestContext": { "authorizer": { "claims": { "sub": "" } } }
        });
        assert_eq!(
            extract_subject(&event).unwrap_err(),
            ClaimsError::MissingSubject
        );
    }

    #[test]
    fn test_override_token_claims() {
        let event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "request": { "userAttributes": { "sub": "abc-123" } },
            "response": {}
        }))
        .unwrap();

        let event = override_token_claims(event, "pfx").unwrap();
        let details = event.response.claims_override_details.unwrap();
        assert_eq!(
            details.claims_to_add_or_override["prefixed_sub"],
            json!("pfx_abc-123")
        );
    }

    #[test]
    fn test_override_token_claims_preserves_unknown_fields() {
        let event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "version": "1",
            "triggerSource": "TokenGeneration_Authentication",
            "userName": "alice@example.com",
            "request": {
                "userAttributes": { "sub": "abc-123", "email": "a@example.com" },
                "groupConfiguration": { "groupsToOverride": [] }
            },
            "response": {}
        }))
        .unwrap();

        let event = override_token_claims(event, "pfx").unwrap();
        let round_tripped = serde_json::to_value(&event).unwrap();
        assert_eq!(round_tripped["triggerSource"], "TokenGeneration_Authentication");
        assert_eq!(round_tripped["request"]["userAttributes"]["email"], "a@example.com");
        assert_eq!(
            round_tripped["request"]["groupConfiguration"]["groupsToOverride"],
            json!([])
        );
        assert_eq!(
            round_tripped["response"]["claimsOverrideDetails"]["claimsToAddOrOverride"]
                ["prefixed_sub"],
            "pfx_abc-123"
        );
    }

    #[test]
    fn test_override_token_claims_missing_subject() {
        let event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "request": { "userAttributes": { "email": "a@example.com" } }
        }))
        .unwrap();

        assert_eq!(
            override_token_claims(event, "pfx").unwrap_err(),
            ClaimsError::MissingSubject
        );
    }
}
