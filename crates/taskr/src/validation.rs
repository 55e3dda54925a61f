/*
[INPUT]:  Raw form input (registration, login, task fields)
[OUTPUT]: Normalized values or a user-facing rejection message
[POS]:    Input layer - checks run before any request is sent
[UPDATE]: When form rules change
*/

use anyhow::{Result, bail};
use taskr_client::{NewTask, TaskEdit};

pub const MIN_PASSWORD_LEN: usize = 8;

pub const FILL_ALL_FIELDS: &str = "Please fill all fields";
pub const PASSWORD_NOT_MET: &str = "Password requirements not met";

/// Password rules, each reported separately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCheck {
    pub long_enough: bool,
    pub has_uppercase: bool,
    pub has_special: bool,
}

impl PasswordCheck {
    pub fn of(password: &str) -> Self {
        Self {
            long_enough: password.chars().count() >= MIN_PASSWORD_LEN,
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            // anything outside [A-Za-z0-9 ]
            has_special: password
                .chars()
                .any(|c| !c.is_ascii_alphanumeric() && c != ' '),
        }
    }

    pub fn is_met(&self) -> bool {
        self.long_enough && self.has_uppercase && self.has_special
    }

    /// Descriptions of the rules the password fails
    pub fn unmet(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.long_enough {
            missing.push("at least 8 characters");
        }
        if !self.has_uppercase {
            missing.push("an uppercase letter");
        }
        if !self.has_special {
            missing.push("a special character");
        }
        missing
    }
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<()> {
    if [username, email, password].iter().any(|field| field.trim().is_empty()) {
        bail!(FILL_ALL_FIELDS);
    }
    if !PasswordCheck::of(password).is_met() {
        bail!(PASSWORD_NOT_MET);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        bail!(FILL_ALL_FIELDS);
    }
    Ok(())
}

/// Trim fields; a blank title is rejected, a blank description dropped
pub fn normalize_new_task(task: NewTask) -> Result<NewTask> {
    Ok(NewTask {
        title: normalize_title(&task.title)?,
        description: normalize_description(task.description),
        due_date: normalize_description(task.due_date),
        ..task
    })
}

pub fn normalize_edit(edit: TaskEdit) -> Result<TaskEdit> {
    Ok(TaskEdit {
        title: normalize_title(&edit.title)?,
        description: normalize_description(edit.description),
        ..edit
    })
}

fn normalize_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        bail!("Task title cannot be empty");
    }
    Ok(title.to_string())
}

fn normalize_description(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
