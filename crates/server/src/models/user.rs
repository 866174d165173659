//! User domain types.

use serde::Serialize;

use shoplite_core::{Email, UserId};

/// A registered user.
///
/// The password hash never leaves the repository layer; this type is safe
/// to serialize directly as a response body.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Login and register return this type directly; id and email must sit
    // at the top level of the body.
    #[test]
    fn test_user_serializes_flat() {
        let user = User {
            id: UserId::new(5),
            email: Email::parse("user@example.com").unwrap(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["email"], "user@example.com");
    }
}
