use serde::{Deserialize, Serialize};

/// Birth data as the form page submits it. The relay endpoints forward
/// whatever JSON they receive, so this type documents the contract rather
/// than validating it; the compute upstream owns the real schema.
///
/// Unset optional fields serialize as explicit `null` instead of being
/// dropped, which is the shape the compute backend expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthQuery {
    #[serde(default = "default_calendar")]
    pub calendar: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Local clock time, `HH:MM`.
    pub time: String,
    pub gender: Gender,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// IANA timezone name, e.g. `Asia/Shanghai`.
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub use_dst: Option<bool>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

fn default_calendar() -> String {
    "gregorian".to_string()
}

/// Answer for `GET /api/session`, consumed by the form page's sign-in
/// widget.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_in_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unset_optionals_serialize_as_explicit_nulls() {
        let query = BirthQuery {
            calendar: default_calendar(),
            year: 2005,
            month: 3,
            day: 4,
            time: "02:12".to_string(),
            gender: Gender::Male,
            city: None,
            country: None,
            tz: None,
            use_dst: Some(false),
            lon: None,
            lat: None,
        };

        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(
            value,
            json!({
                "calendar": "gregorian",
                "year": 2005,
                "month": 3,
                "day": 4,
                "time": "02:12",
                "gender": "male",
                "city": null,
                "country": null,
                "tz": null,
                "use_dst": false,
                "lon": null,
                "lat": null,
            })
        );
    }

    #[test]
    fn test_minimal_payload_deserializes_with_defaults() {
        let query: BirthQuery = serde_json::from_value(json!({
            "year": 1990,
            "month": 12,
            "day": 31,
            "time": "23:59",
            "gender": "female",
        }))
        .unwrap();

        assert_eq!(query.calendar, "gregorian");
        assert_eq!(query.gender, Gender::Female);
        assert_eq!(query.city, None);
        assert_eq!(query.use_dst, None);
    }

    #[test]
    fn test_session_response_uses_camel_case_and_skips_absent_fields() {
        let anonymous = SessionResponse {
            signed_in: false,
            user_id: None,
            sign_in_url: Some("/sign-in".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&anonymous).unwrap(),
            json!({ "signedIn": false, "signInUrl": "/sign-in" })
        );

        let signed_in = SessionResponse {
            signed_in: true,
            user_id: Some("user_1".to_string()),
            sign_in_url: None,
        };

        assert_eq!(
            serde_json::to_value(&signed_in).unwrap(),
            json!({ "signedIn": true, "userId": "user_1" })
        );
    }
}
