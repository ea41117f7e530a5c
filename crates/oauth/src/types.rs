//! Credential records persisted by the token store.

use {
    secrecy::{ExposeSecret, SecretString},
    serde::{Deserialize, Serialize, Serializer},
};

/// Serialize a [`SecretString`] as its exposed value.
///
/// `secrecy` deliberately does not implement `Serialize`; fields that must
/// reach disk opt in through this helper.
pub fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

/// Serialize an `Option<SecretString>` as its exposed value.
pub fn serialize_option_secret<S>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Token response issued by an authorization server (RFC 6749 section 5.1).
///
/// The store treats this as opaque: expiry is never interpreted here, and
/// refresh is the authorization flow's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: SecretString,
    pub token_type: String,
    /// Lifetime in seconds, as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret"
    )]
    pub refresh_token: Option<SecretString>,
}

/// Client registration record (RFC 7591) identifying us to an
/// authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClientInfo {
    pub client_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret"
    )]
    pub client_secret: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id_issued_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_expires_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grant_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let tokens = OAuthTokens {
            access_token: SecretString::new("super-secret".into()),
            token_type: "bearer".into(),
            expires_in: None,
            scope: None,
            refresh_token: None,
        };
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_tokens_serialize_omits_absent_fields() {
        let tokens = OAuthTokens {
            access_token: SecretString::new("abc".into()),
            token_type: "bearer".into(),
            expires_in: None,
            scope: None,
            refresh_token: None,
        };
        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"access_token": "abc", "token_type": "bearer"})
        );
    }

    #[test]
    fn test_client_info_round_trips_through_json() {
        let info = OAuthClientInfo {
            client_id: "client-1".into(),
            client_secret: Some(SecretString::new("hunter2".into())),
            client_id_issued_at: Some(1_700_000_000),
            client_secret_expires_at: None,
            redirect_uris: vec!["http://localhost:3030/callback".into()],
            token_endpoint_auth_method: Some("client_secret_post".into()),
            grant_types: vec!["authorization_code".into(), "refresh_token".into()],
            response_types: vec!["code".into()],
            client_name: Some("lattice".into()),
            scope: None,
        };

        let json = serde_json::to_string(&info).unwrap();
        let back: OAuthClientInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.client_id, info.client_id);
        assert_eq!(
            back.client_secret.as_ref().map(|s| s.expose_secret().clone()),
            Some("hunter2".to_string())
        );
        assert_eq!(back.redirect_uris, info.redirect_uris);
        assert_eq!(back.grant_types, info.grant_types);
        assert!(!json.contains("client_secret_expires_at"));
    }
}
