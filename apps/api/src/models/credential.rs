use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A marketplace token that passed the profile probe, plus the account ids
/// the bid proxy needs alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub user_id: String,
    pub console_user_id: String,
}

/// One entry of the harvested token list: either a bare token or a
/// `{cookie_name: token}` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CandidateToken {
    Plain(String),
    Keyed(serde_json::Map<String, Value>),
}

impl CandidateToken {
    pub fn token(&self) -> Option<&str> {
        let token = match self {
            CandidateToken::Plain(token) => Some(token.as_str()),
            CandidateToken::Keyed(map) => map.values().find_map(Value::as_str),
        };
        token.filter(|token| !token.is_empty())
    }
}

/// Reply of the backend tokens endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBundle {
    #[serde(default, alias = "oauthCookies", alias = "candidateTokens")]
    pub candidate_tokens: Vec<CandidateToken>,
    #[serde(default, alias = "user_uid", alias = "userId", deserialize_with = "id_string")]
    pub user_id: String,
    #[serde(
        default,
        alias = "console_user",
        alias = "consoleUserId",
        deserialize_with = "id_string"
    )]
    pub console_user_id: String,
}

impl TokenBundle {
    pub fn credential_for(&self, token: &str) -> Credential {
        Credential {
            token: token.to_string(),
            user_id: self.user_id.clone(),
            console_user_id: self.console_user_id.clone(),
        }
    }
}

/// Ids arrive as strings or numbers depending on the backend column type.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Reply of the backend cookies endpoint. Cookies are opaque and forwarded
/// unchanged to the bid proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieBundle {
    #[serde(default)]
    pub cookies: Vec<Value>,
}

pub const CSRF_COOKIE: &str = "XSRF-TOKEN";

impl CookieBundle {
    /// Finds the anti-forgery token among the forwarded cookies. Entries are
    /// either `{name, value}` objects or `{NAME: value}` maps.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookies.iter().find_map(|cookie| {
            let object = cookie.as_object()?;
            if object.get("name").and_then(Value::as_str) == Some(CSRF_COOKIE) {
                return object.get("value").and_then(Value::as_str).map(str::to_string);
            }
            object.get(CSRF_COOKIE).and_then(Value::as_str).map(str::to_string)
        })
    }
}

/// The freelancer's personal data as fetched during linking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_url: Option<String>,
    pub portrait_url: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub connects_balance: Option<i64>,
}

/// Payload posted to the profile-save endpoint after a successful link,
/// in the backend's own field names.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedProfile {
    #[serde(rename = "authToken")]
    pub auth_token: String,
    pub console_user: String,
    pub user_uid: String,
    #[serde(rename = "profileInfo")]
    pub profile_info: ProfileInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub profile_url: Option<String>,
    pub portrait: PortraitInfo,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub connects_balance: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortraitInfo {
    #[serde(rename = "portrait100")]
    pub portrait_100: Option<String>,
}

impl LinkedProfile {
    pub fn new(credential: &Credential, profile: &Profile) -> Self {
        Self {
            auth_token: credential.token.clone(),
            console_user: credential.console_user_id.clone(),
            user_uid: credential.user_id.clone(),
            profile_info: ProfileInfo {
                profile_url: profile.profile_url.clone(),
                portrait: PortraitInfo {
                    portrait_100: profile.portrait_url.clone(),
                },
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                title: profile.title.clone(),
                connects_balance: profile.connects_balance,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_bundle_from_backend_wire_names() {
        let bundle: TokenBundle = serde_json::from_value(json!({
            "oauthCookies": [{ "oauth2_global_js_token": "tok-1" }, "tok-2", { "empty": "" }],
            "user_uid": 42,
            "console_user": "console-7"
        }))
        .unwrap();

        let tokens: Vec<_> = bundle
            .candidate_tokens
            .iter()
            .map(CandidateToken::token)
            .collect();
        assert_eq!(tokens, vec![Some("tok-1"), Some("tok-2"), None]);
        assert_eq!(bundle.user_id, "42");
        assert_eq!(bundle.console_user_id, "console-7");
    }

    #[test]
    fn test_csrf_token_lookup() {
        let named = CookieBundle {
            cookies: vec![
                json!({ "name": "session", "value": "abc" }),
                json!({ "name": "XSRF-TOKEN", "value": "csrf-1" }),
            ],
        };
        assert_eq!(named.csrf_token().as_deref(), Some("csrf-1"));

        let keyed = CookieBundle {
            cookies: vec![json!({ "XSRF-TOKEN": "csrf-2" })],
        };
        assert_eq!(keyed.csrf_token().as_deref(), Some("csrf-2"));

        assert_eq!(CookieBundle::default().csrf_token(), None);
    }

    #[test]
    fn test_linked_profile_uses_backend_field_names() {
        let credential = Credential {
            token: "tok".to_string(),
            user_id: "uid".to_string(),
            console_user_id: "console".to_string(),
        };
        let profile = Profile {
            first_name: Some("Ada".to_string()),
            portrait_url: Some("https://img/p.png".to_string()),
            connects_balance: Some(80),
            ..Default::default()
        };
        let value = serde_json::to_value(LinkedProfile::new(&credential, &profile)).unwrap();

        assert_eq!(value["authToken"], "tok");
        assert_eq!(value["user_uid"], "uid");
        assert_eq!(value["console_user"], "console");
        assert_eq!(value["profileInfo"]["firstName"], "Ada");
        assert_eq!(value["profileInfo"]["portrait"]["portrait100"], "https://img/p.png");
        assert_eq!(value["profileInfo"]["connectsBalance"], 80);
    }
}
