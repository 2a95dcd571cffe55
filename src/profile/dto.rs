use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::profile::repo_types::ProfileUpdate;
use crate::watchlist::repo_types::{WatchHistoryEntry, WatchlistEntry};

/// The user document as returned to its owner. The password hash has no field here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_color: String,
    pub profile_image: Option<String>,
    pub private_watchlist: bool,
    pub watchlist: Vec<WatchlistEntry>,
    pub watch_history: Vec<WatchHistoryEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ProfileResponse {
    pub fn new(
        user: User,
        watchlist: Vec<WatchlistEntry>,
        watch_history: Vec<WatchHistoryEntry>,
    ) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_color: user.profile_color,
            profile_image: user.profile_image,
            private_watchlist: user.private_watchlist,
            watchlist,
            watch_history,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub profile_color: Option<String>,
    /// Absent: unchanged. `null` or blank: cleared.
    #[serde(default, deserialize_with = "present")]
    pub profile_image: Option<Option<String>>,
    pub private_watchlist: Option<bool>,
}

/// Distinguishes an explicit `null` from an omitted field.
fn present<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            name: r.name.map(|n| n.trim().to_string()),
            profile_color: r.profile_color.map(|c| c.trim().to_string()),
            profile_image: r.profile_image.map(|image| {
                image
                    .map(|i| i.trim().to_string())
                    .filter(|i| !i.is_empty())
            }),
            private_watchlist: r.private_watchlist,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ProfileUpdate {
        serde_json::from_str::<UpdateProfileRequest>(body).unwrap().into()
    }

    #[test]
    fn profile_image_absent_null_and_set_differ() {
        assert_eq!(parse(r#"{"name": "Ada"}"#).profile_image, None);
        assert_eq!(parse(r#"{"profileImage": null}"#).profile_image, Some(None));
        assert_eq!(parse(r#"{"profileImage": "  "}"#).profile_image, Some(None));
        assert_eq!(
            parse(r#"{"profileImage": " https://img/ada.png "}"#).profile_image,
            Some(Some("https://img/ada.png".to_string()))
        );
    }

    #[test]
    fn clearing_the_image_is_not_an_empty_update() {
        assert!(parse("{}").is_empty());
        assert!(!parse(r#"{"profileImage": null}"#).is_empty());
    }
}
