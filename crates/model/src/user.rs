use alloc::boxed::Box;
use serde::{Deserialize, Serialize};

/// Registration form. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub email: Box<str>,
    pub password: Box<str>,
    pub name: Box<str>,
}

impl Registration {
    /// Returns the message describing the first rule the form breaks.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.email.contains('@') {
            return Err("Invalid email address");
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters");
        }
        if self.name.chars().count() < 2 {
            return Err("Name must be at least 2 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: Box<str>,
    pub password: Box<str>,
}

/// Public view of a registered user. The password hash never leaves the database crate.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: Box<str>,
    pub display_name: Box<str>,
}
