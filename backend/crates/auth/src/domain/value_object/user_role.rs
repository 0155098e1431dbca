use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Admin = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(UserRole::User),
            1 => Some(UserRole::Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::User));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(7), None);
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("user"), Some(UserRole::User));
        assert_eq!(UserRole::from_code("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("Admin"), None);
        assert_eq!(UserRole::from_code("super_admin"), None);
    }

    #[test]
    fn test_user_role_roundtrip() {
        for role in [UserRole::User, UserRole::Admin] {
            assert_eq!(UserRole::from_id(role.id()), Some(role));
            assert_eq!(UserRole::from_code(&role.to_string()), Some(role));
        }
    }

    #[test]
    fn test_default_is_user() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::Admin.is_admin());
    }
}
