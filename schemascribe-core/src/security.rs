//! Credential handling.
//!
//! Passwords are held in [`Zeroizing`] containers so they are wiped from
//! memory on drop, and are never printed by `Debug`.

use zeroize::Zeroizing;

/// Secure credential container that zeros memory on drop.
///
/// # Example
///
/// ```rust
/// use schemascribe_core::security::Credentials;
///
/// let creds = Credentials::new("reader".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "reader");
/// assert!(creds.has_password());
/// assert!(!format!("{creds:?}").contains("secret"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials.
    ///
    /// An empty password is treated as no password.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password.filter(|p| !p.is_empty())),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}
