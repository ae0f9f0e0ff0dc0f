//! Identity gate around the creative session.
//!
//! Sign-in is mocked. The [`IdentityProvider`] trait is the seam where a
//! real provider plugs in; nothing in the orchestration core depends on it.

use crate::{error::Result, session::Studio};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub avatar: String,
}

pub trait IdentityProvider {
    fn sign_in(&self) -> Result<User>;
}

/// Always signs in the same demo user.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider;

impl IdentityProvider for MockIdentityProvider {
    fn sign_in(&self) -> Result<User> {
        Ok(User {
            name: "Google User".to_string(),
            email: "user@example.com".to_string(),
            avatar: "https://lh3.googleusercontent.com/a/default-user".to_string(),
        })
    }
}

struct SignedIn {
    user: User,
    studio: Studio,
}

pub struct CreativeApp<P: IdentityProvider> {
    provider: P,
    active: Option<SignedIn>,
}

impl<P: IdentityProvider> CreativeApp<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            active: None,
        }
    }

    /// Signs in and opens a fresh session. Signing in again while signed in
    /// replaces the previous session.
    pub fn sign_in(&mut self) -> Result<&User> {
        let user = self.provider.sign_in()?;
        log::info!("👤 Signed in as {} <{}>", user.name, user.email);
        let active = self.active.insert(SignedIn {
            user,
            studio: Studio::new(),
        });
        Ok(&active.user)
    }

    /// Discards the user and the whole session, including any attachment.
    pub fn sign_out(&mut self) {
        if let Some(active) = self.active.take() {
            log::info!("👋 Signed out {}", active.user.email);
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.active.as_ref().map(|active| &active.user)
    }

    pub fn studio(&self) -> Option<&Studio> {
        self.active.as_ref().map(|active| &active.studio)
    }

    pub fn studio_mut(&mut self) -> Option<&mut Studio> {
        self.active.as_mut().map(|active| &mut active.studio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    struct Refusing;

    impl IdentityProvider for Refusing {
        fn sign_in(&self) -> Result<User> {
            Err(StudioError::Config("identity provider offline".into()))
        }
    }

    #[test]
    fn test_studio_only_exists_while_signed_in() {
        let mut app = CreativeApp::new(MockIdentityProvider);
        assert!(app.studio().is_none());

        let user = app.sign_in().unwrap().clone();
        assert_eq!(user.name, "Google User");
        assert_eq!(app.user(), Some(&user));
        assert!(app.studio().is_some());

        app.sign_out();
        assert!(app.user().is_none());
        assert!(app.studio_mut().is_none());
    }

    #[test]
    fn test_sign_out_discards_session_state() {
        let mut app = CreativeApp::new(MockIdentityProvider);
        app.sign_in().unwrap();
        let studio = app.studio_mut().unwrap();
        studio.set_prompt("cat");
        studio.attach(b"img".to_vec(), "image/png").unwrap();
        let previews = studio.previews().clone();
        assert_eq!(previews.live_count(), 1);

        app.sign_out();
        assert_eq!(previews.live_count(), 0);

        app.sign_in().unwrap();
        let studio = app.studio().unwrap();
        assert_eq!(studio.prompt(), "");
        assert!(studio.attachment().is_none());
    }

    #[test]
    fn test_failed_sign_in_leaves_app_signed_out() {
        let mut app = CreativeApp::new(Refusing);
        assert!(app.sign_in().is_err());
        assert!(app.studio().is_none());
    }
}
