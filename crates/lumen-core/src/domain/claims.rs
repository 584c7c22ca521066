use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ClaimsError;

/// Request-scoped key under which upstream authentication stores the claims map.
pub const USER_CLAIMS_KEY: &str = "userClaims";

/// Entry of the claims map that carries the user identifier.
pub const USER_ID_ENTRY: &str = "UserID";

/// Authenticated-user attributes produced by an upstream authentication layer.
///
/// Field names on the wire follow the identity provider's token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub email: String,
    #[serde(rename = "sub")]
    pub user_id: Uuid,
    #[serde(rename = "custom:organisationId")]
    pub organisation_id: Uuid,
    #[serde(rename = "custom:tenantId")]
    pub tenant_id: Uuid,
}

impl IdentityClaims {
    /// Render the claims as the generic map stored under [`USER_CLAIMS_KEY`].
    pub fn to_context_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("Email".to_string(), Value::String(self.email.clone()));
        map.insert(
            USER_ID_ENTRY.to_string(),
            Value::String(self.user_id.to_string()),
        );
        map.insert(
            "OrganisationID".to_string(),
            Value::String(self.organisation_id.to_string()),
        );
        map.insert(
            "TenantID".to_string(),
            Value::String(self.tenant_id.to_string()),
        );
        map
    }

    /// Rebuild typed claims from a context map.
    ///
    /// Only `UserID` is mandatory; missing organisation or tenant entries
    /// become the nil UUID and a missing email becomes empty.
    pub fn from_context_map(value: &Value) -> Result<Self, ClaimsError> {
        let map = value.as_object().ok_or(ClaimsError::NotAnObject)?;

        let user_id = map
            .get(USER_ID_ENTRY)
            .and_then(Value::as_str)
            .ok_or(ClaimsError::MissingUserId)?;

        Ok(Self {
            email: map
                .get("Email")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            user_id: parse_uuid(USER_ID_ENTRY, Some(user_id))?,
            organisation_id: parse_uuid(
                "OrganisationID",
                map.get("OrganisationID").and_then(Value::as_str),
            )?,
            tenant_id: parse_uuid("TenantID", map.get("TenantID").and_then(Value::as_str))?,
        })
    }
}

fn parse_uuid(claim: &'static str, raw: Option<&str>) -> Result<Uuid, ClaimsError> {
    match raw {
        Some(raw) => Uuid::parse_str(raw).map_err(|source| ClaimsError::InvalidUuid { claim, source }),
        None => Ok(Uuid::nil()),
    }
}

/// Extract the user identifier from whatever sits under [`USER_CLAIMS_KEY`].
///
/// Any shape other than an object with a string `UserID` yields `None`.
pub fn user_id_from_claims(value: &Value) -> Option<&str> {
    value.as_object()?.get(USER_ID_ENTRY)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> IdentityClaims {
        IdentityClaims {
            email: "ada@example.com".to_string(),
            user_id: Uuid::new_v4(),
            organisation_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_deserialize_from_token_claim_names() {
        let user = Uuid::new_v4();
        let org = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let claims: IdentityClaims = serde_json::from_value(json!({
            "email": "ada@example.com",
            "sub": user.to_string(),
            "custom:organisationId": org.to_string(),
            "custom:tenantId": tenant.to_string(),
        }))
        .unwrap();

        assert_eq!(claims.user_id, user);
        assert_eq!(claims.organisation_id, org);
        assert_eq!(claims.tenant_id, tenant);
    }

    #[test]
    fn test_context_map_carries_user_id_entry() {
        let claims = sample();
        let map = Value::Object(claims.to_context_map());
        assert_eq!(
            user_id_from_claims(&map),
            Some(claims.user_id.to_string().as_str())
        );
        assert_eq!(IdentityClaims::from_context_map(&map).unwrap(), claims);
    }

    #[test]
    fn test_user_id_ignores_other_shapes() {
        assert_eq!(user_id_from_claims(&json!("abc-123")), None);
        assert_eq!(user_id_from_claims(&json!({"Email": "a@b.c"})), None);
        assert_eq!(user_id_from_claims(&json!({"UserID": 42})), None);
        assert_eq!(user_id_from_claims(&json!(["UserID"])), None);
        assert_eq!(user_id_from_claims(&json!({"UserID": "abc-123"})), Some("abc-123"));
    }

    #[test]
    fn test_from_context_map_errors() {
        assert!(matches!(
            IdentityClaims::from_context_map(&json!(null)),
            Err(ClaimsError::NotAnObject)
        ));
        assert!(matches!(
            IdentityClaims::from_context_map(&json!({})),
            Err(ClaimsError::MissingUserId)
        ));
        assert!(matches!(
            IdentityClaims::from_context_map(&json!({"UserID": "not-a-uuid"})),
            Err(ClaimsError::InvalidUuid { claim: "UserID", .. })
        ));
    }
}
