//! Member registration and member records

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        student::UpdateMemberStatus, CallerClaims, MemberCard, MemberSummary, RegisterMember,
        RegisteredMember, Role, Stored, Student, StudentStatus, User,
    },
    repository::{students::StudentsRepository, users::UsersRepository, Repository},
    store::fields,
};

use super::{
    ban::BanPolicy,
    identity::IdentityResolver,
    sequence::{Namespace, NextId},
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    identity: IdentityResolver,
    next_id: Arc<dyn NextId>,
    clock: Arc<dyn Clock>,
    card_prefix: String,
}

impl MembersService {
    pub fn new(
        repository: Repository,
        identity: IdentityResolver,
        next_id: Arc<dyn NextId>,
        clock: Arc<dyn Clock>,
        config: &CirculationConfig,
    ) -> Self {
        Self {
            repository,
            identity,
            next_id,
            clock,
            card_prefix: config.member_card_prefix.clone(),
        }
    }

    /// Register a student under the calling admin
    pub async fn register_member(
        &self,
        caller: &CallerClaims,
        request: RegisterMember,
    ) -> AppResult<RegisteredMember> {
        request.validate()?;
        let member = self.identity.resolve(caller).await?;
        let admin = member.require_admin()?;

        let username = request.username.trim().to_string();
        if self.repository.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let user_id = self.next_id.next_id(Namespace::Member).await?;
        let user = User {
            id: user_id.clone(),
            name: request.name.trim().to_string(),
            username,
            password: hash_password(&request.password)?,
            role: Role::Student,
        };
        let student = Student {
            user_id: user_id.clone(),
            admin_id: admin.id.clone(),
            class: request.class.trim().to_string(),
            profile_image_url: request.profile_image_url,
            status: StudentStatus::Active,
            last_borrowed_date: None,
            ban: None,
        };

        let student_op = StudentsRepository::insert_op(&student)?;
        let student_id = student_op.id().to_string();
        self.repository
            .apply(vec![UsersRepository::insert_op(&user)?, student_op])
            .await?;

        tracing::info!(
            "Registered member {} ({}) in class {} by admin {}",
            user.id,
            user.username,
            student.class,
            admin.id
        );
        Ok(RegisteredMember {
            user_id,
            student_id,
            name: user.name,
            class: student.class,
        })
    }

    /// The calling student's card
    pub async fn get_member_card(&self, caller: &CallerClaims) -> AppResult<MemberCard> {
        let member = self.identity.resolve(caller).await?;
        let student = member.require_student()?;
        let now = self.clock.now();

        Ok(MemberCard {
            member_id: format!("{}-{}", self.card_prefix, student.user_id),
            user_id: student.user_id.clone(),
            name: member.user.name.clone(),
            class: student.class.clone(),
            profile_image_url: student.profile_image_url.clone(),
            status: student.status,
            last_borrowed_date: student.last_borrowed_date,
            banned_until: student.ban.filter(|until| *until > now),
            can_borrow: student.status == StudentStatus::Active
                && BanPolicy::may_borrow(student.ban, now),
        })
    }

    /// Students registered by the calling admin
    pub async fn list_members(&self, caller: &CallerClaims) -> AppResult<Vec<MemberSummary>> {
        let member = self.identity.resolve(caller).await?;
        let admin = member.require_admin()?;

        let names: HashMap<String, String> = self
            .repository
            .users
            .list_all()
            .await?
            .into_iter()
            .map(|u| (u.record.id, u.record.name))
            .collect();
        let now = self.clock.now();

        Ok(self
            .repository
            .students
            .list_by_admin(&admin.id)
            .await?
            .into_iter()
            .map(|student| {
                let name = names.get(&student.user_id).cloned().unwrap_or_default();
                summary(student, name, now)
            })
            .collect())
    }

    /// Activate or deactivate one of the calling admin's students
    pub async fn set_member_status(
        &self,
        caller: &CallerClaims,
        user_id: &str,
        request: UpdateMemberStatus,
    ) -> AppResult<MemberSummary> {
        let member = self.identity.resolve(caller).await?;
        let admin = member.require_admin()?;

        let mut student = self
            .repository
            .students
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", user_id)))?;
        if student.admin_id != admin.id {
            return Err(AppError::Forbidden(format!(
                "Member {} is managed by another admin",
                user_id
            )));
        }

        if student.status != request.status {
            self.repository
                .apply(vec![StudentsRepository::update_op(
                    &student,
                    fields(json!({ "status": request.status.as_str() })),
                )])
                .await?;
            tracing::info!(
                "Member {} is now {} (admin {})",
                user_id,
                request.status.as_str(),
                admin.id
            );
            student.record.status = request.status;
        }

        let name = self
            .repository
            .users
            .find_by_id(user_id)
            .await?
            .map(|u| u.record.name)
            .unwrap_or_default();
        Ok(summary(student, name, self.clock.now()))
    }
}

fn summary(student: Stored<Student>, name: String, now: DateTime<Utc>) -> MemberSummary {
    let Stored { id, record, .. } = student;
    MemberSummary {
        student_id: id,
        user_id: record.user_id,
        name,
        class: record.class,
        profile_image_url: record.profile_image_url,
        status: record.status,
        last_borrowed_date: record.last_borrowed_date,
        banned_until: record.ban.filter(|until| *until > now),
    }
}

/// Hash a password using Argon2
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
