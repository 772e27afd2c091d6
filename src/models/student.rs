//! Student (library member) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::timestamp;

/// Soft lifecycle of a member; students are never deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
        }
    }
}

/// `student` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// `User.id` of this member
    pub user_id: String,
    /// `Admin.id` of the admin who registered the member
    #[serde(default)]
    pub admin_id: String,
    #[serde(default)]
    pub class: String,
    #[serde(default, alias = "prifilImage")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_borrowed_date: Option<DateTime<Utc>>,
    /// End of the current suspension, if any
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub ban: Option<DateTime<Utc>>,
}

/// Register member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMember {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 20))]
    pub class: String,
    #[validate(url)]
    pub profile_image_url: Option<String>,
}

/// Result of a registration
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredMember {
    pub user_id: String,
    pub student_id: String,
    pub name: String,
    pub class: String,
}

/// Member card shown to a student
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberCard {
    /// Printed member number, `<prefix>-<userId>`
    pub member_id: String,
    pub user_id: String,
    pub name: String,
    pub class: String,
    pub profile_image_url: Option<String>,
    pub status: StudentStatus,
    pub last_borrowed_date: Option<DateTime<Utc>>,
    pub banned_until: Option<DateTime<Utc>>,
    pub can_borrow: bool,
}

/// Row in an admin's member list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub student_id: String,
    pub user_id: String,
    pub name: String,
    pub class: String,
    pub profile_image_url: Option<String>,
    pub status: StudentStatus,
    pub last_borrowed_date: Option<DateTime<Utc>>,
    pub banned_until: Option<DateTime<Utc>>,
}

/// Change a member's lifecycle status
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberStatus {
    pub status: StudentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_legacy_student_documents() {
        let student: Student = serde_json::from_value(json!({
            "userId": "2415003",
            "adminId": "A1",
            "class": "8B",
            "prifilImage": "https://img.example/3.png",
            "lastBorrowedDate": "2024-01-15",
            "status": "active"
        }))
        .unwrap();

        assert_eq!(student.profile_image_url.as_deref(), Some("https://img.example/3.png"));
        assert_eq!(
            student.last_borrowed_date.map(|d| d.to_rfc3339()),
            Some("2024-01-15T00:00:00+00:00".to_string())
        );
        assert_eq!(student.ban, None);
    }

    #[test]
    fn registration_requires_the_basic_fields() {
        let request = RegisterMember {
            name: String::new(),
            username: "ab".to_string(),
            password: "123".to_string(),
            class: "7A".to_string(),
            profile_image_url: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("class"));
    }
}
