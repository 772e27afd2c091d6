//! Resolves caller claims to member records

use crate::{
    error::{AppError, AppResult},
    models::{Admin, CallerClaims, Role, Stored, Student, User},
    repository::Repository,
};

/// Role-specific record of a resolved caller
#[derive(Debug, Clone)]
pub enum MemberProfile {
    Admin(Stored<Admin>),
    Student(Stored<Student>),
    Headmaster,
}

/// A caller joined with its user record and role record
#[derive(Debug, Clone)]
pub struct ResolvedMember {
    pub user: Stored<User>,
    pub profile: MemberProfile,
}

impl ResolvedMember {
    pub fn role(&self) -> Role {
        match self.profile {
            MemberProfile::Admin(_) => Role::Admin,
            MemberProfile::Student(_) => Role::Student,
            MemberProfile::Headmaster => Role::Headmaster,
        }
    }

    pub fn require_admin(&self) -> AppResult<&Stored<Admin>> {
        match &self.profile {
            MemberProfile::Admin(admin) => Ok(admin),
            _ => Err(AppError::Forbidden(format!(
                "Operation requires an admin, caller is {}",
                self.role()
            ))),
        }
    }

    pub fn require_student(&self) -> AppResult<&Stored<Student>> {
        match &self.profile {
            MemberProfile::Student(student) => Ok(student),
            _ => Err(AppError::Forbidden(format!(
                "Operation requires a student, caller is {}",
                self.role()
            ))),
        }
    }

    /// Admins and headmasters
    pub fn require_staff(&self) -> AppResult<()> {
        if self.role().is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Operation requires library staff".to_string(),
            ))
        }
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    repository: Repository,
}

impl IdentityResolver {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve a caller. A missing user, admin or student record is `NotFound`,
    /// a role that disagrees with the stored user is `Forbidden`.
    pub async fn resolve(&self, caller: &CallerClaims) -> AppResult<ResolvedMember> {
        let user = self
            .repository
            .users
            .find_by_id(&caller.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", caller.id)))?;

        if user.role != caller.role {
            return Err(AppError::Forbidden(format!(
                "User {} does not hold role {}",
                caller.id, caller.role
            )));
        }

        let profile = match caller.role {
            Role::Admin => MemberProfile::Admin(
                self.repository
                    .admins
                    .find_by_user_id(&caller.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Admin record for user {} not found", caller.id))
                    })?,
            ),
            Role::Student => MemberProfile::Student(
                self.repository
                    .students
                    .find_by_user_id(&caller.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "Student record for user {} not found",
                            caller.id
                        ))
                    })?,
            ),
            Role::Headmaster => MemberProfile::Headmaster,
        };

        Ok(ResolvedMember { user, profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{date, Fixture};

    #[tokio::test]
    async fn resolves_admins_and_students() {
        let fx = Fixture::new(date(2024, 1, 1)).await;
        let admin = fx.admin("1001", "A1").await;
        let student = fx.student("2415001", "A1").await;

        let resolved = fx.services.identity.resolve(&admin).await.unwrap();
        assert_eq!(resolved.require_admin().unwrap().id, "A1");
        assert!(resolved.require_student().is_err());

        let resolved = fx.services.identity.resolve(&student).await.unwrap();
        assert_eq!(resolved.require_student().unwrap().user_id, "2415001");
        assert!(matches!(resolved.require_staff(), Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn missing_role_record_is_not_found() {
        let fx = Fixture::new(date(2024, 1, 1)).await;
        fx.user("1002", Role::Admin).await;

        let err = fx
            .services
            .identity
            .resolve(&CallerClaims::new("1002", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let fx = Fixture::new(date(2024, 1, 1)).await;
        let err = fx
            .services
            .identity
            .resolve(&CallerClaims::new("9999999", Role::Student))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn claimed_role_must_match_stored_role() {
        let fx = Fixture::new(date(2024, 1, 1)).await;
        fx.student("2415001", "A1").await;

        let err = fx
            .services
            .identity
            .resolve(&CallerClaims::new("2415001", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn headmasters_resolve_without_a_role_record() {
        let fx = Fixture::new(date(2024, 1, 1)).await;
        let headmaster = fx.user("1", Role::Headmaster).await;

        let resolved = fx.services.identity.resolve(&headmaster).await.unwrap();
        assert_eq!(resolved.role(), Role::Headmaster);
        assert!(resolved.require_staff().is_ok());
        assert!(resolved.require_admin().is_err());
    }
}
