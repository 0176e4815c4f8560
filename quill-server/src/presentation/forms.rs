use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::auth_service::{ProfileInput, RegistrationInput};
use crate::application::post_service::PostInput;

const MAX_TITLE_LEN: usize = 256;
const MAX_USERNAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

/// Field-level validation errors, keyed by field name. Serialized into the
/// redisplayed form's context.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    fn ok_or<T>(self, value: T) -> Result<T, FormErrors> {
        if self.0.is_empty() { Ok(value) } else { Err(self) }
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub category_id: String,
    /// RFC 3339; empty or absent means "publish now" on create and "keep the
    /// current date" on update.
    #[serde(default)]
    pub pub_date: Option<String>,
    /// Checkbox; absent means "published" on create and "keep the current
    /// flag" on update.
    #[serde(default)]
    pub is_published: Option<String>,
}

fn parse_flag(errors: &mut FormErrors, field: &'static str, raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some("on" | "true" | "1") => Some(true),
        Some("off" | "false" | "0") => Some(false),
        Some(_) => {
            errors.add(field, "invalid value");
            None
        }
    }
}

pub fn validate_post(form: &PostForm) -> Result<PostInput, FormErrors> {
    let mut errors = FormErrors::default();

    let title = form.title.trim();
    if title.is_empty() {
        errors.add("title", "title is required");
    } else if title.len() > MAX_TITLE_LEN {
        errors.add("title", "title is too long");
    }

    if form.text.trim().is_empty() {
        errors.add("text", "text is required");
    }

    let category_id = match form.category_id.trim().parse::<Uuid>() {
        Ok(id) => id,
        Err(_) => {
            errors.add("category_id", "choose a category");
            Uuid::nil()
        }
    };

    let pub_date = match form.pub_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<DateTime<Utc>>() {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("pub_date", "invalid date");
                None
            }
        },
    };

    let is_published = parse_flag(&mut errors, "is_published", form.is_published.as_deref());

    errors.ok_or(PostInput {
        title: title.to_string(),
        text: form.text.trim().to_string(),
        category_id,
        pub_date,
        is_published,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

pub fn validate_comment(form: &CommentForm) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    if form.text.trim().is_empty() {
        errors.add("text", "text is required");
    }
    errors.ok_or(form.text.trim().to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
}

fn check_username(errors: &mut FormErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", "username is required");
    } else if username.len() > MAX_USERNAME_LEN {
        errors.add("username", "username is too long");
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        errors.add("username", "letters, digits and _ - . only");
    }
}

fn check_email(errors: &mut FormErrors, email: &str) {
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.add("email", "invalid email address");
    }
}

pub fn validate_profile(form: &ProfileForm) -> Result<ProfileInput, FormErrors> {
    let mut errors = FormErrors::default();
    let username = form.username.trim();
    let email = form.email.trim();
    check_username(&mut errors, username);
    check_email(&mut errors, email);

    errors.ok_or(ProfileInput {
        username: username.to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: email.to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_registration(form: &RegistrationForm) -> Result<RegistrationInput, FormErrors> {
    let mut errors = FormErrors::default();
    let username = form.username.trim();
    let email = form.email.trim();
    check_username(&mut errors, username);
    check_email(&mut errors, email);
    if form.password.len() < MIN_PASSWORD_LEN {
        errors.add("password", "password is too short");
    }

    errors.ok_or(RegistrationInput {
        username: username.to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: email.to_string(),
        password: form.password.clone(),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}
