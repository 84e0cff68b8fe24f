use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, QueryOrder, Set,
};
use serde::Deserialize;

use crate::entities::users;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUser {
    #[error("name must be between 1 and {} characters", MAX_NAME_LEN)]
    Name,
    #[error("email must be between 1 and {} characters", MAX_EMAIL_LEN)]
    Email,
}

fn check_name(name: &str) -> Result<(), InvalidUser> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(InvalidUser::Name);
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), InvalidUser> {
    let len = email.chars().count();
    if len == 0 || len > MAX_EMAIL_LEN {
        return Err(InvalidUser::Email);
    }
    Ok(())
}

/// Payload of a create request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), InvalidUser> {
        check_name(&self.name)?;
        check_email(&self.email)
    }
}

/// Payload of an update request. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserChanges {
    pub fn validate(&self) -> Result<(), InvalidUser> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        Ok(())
    }
}

/// Postgres keeps microseconds, so timestamps are cut there before they are
/// written and echoed back.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// `updated_at` must move forward even when two writes land in the same
/// microsecond.
fn next_update_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user: NewUser) -> Result<users::Model, DbErr> {
        let created_at = now();
        users::ActiveModel {
            name: Set(user.name),
            email: Set(user.email),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(self.conn).await
    }

    /// Returns `None` when no user has this id.
    pub async fn update(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let updated_at = next_update_stamp(user.updated_at);
        let mut active = user.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        active.updated_at = Set(updated_at);

        active.update(self.conn).await.map(Some)
    }

    /// Physically removes the row. Returns whether anything was deleted.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = users::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await
    }
}
