use async_trait::async_trait;
use subtle::ConstantTimeEq;

/// Username/password check used by `POST /token`.
///
/// The gateway and token service only see this trait, so a real identity
/// store can replace [`DemoCredentials`] without touching either.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured username/password pair. Demo only.
pub struct DemoCredentials {
    username: String,
    password: String,
}

impl DemoCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for DemoCredentials {
    async fn authenticate(&self, username: &str, password: &str) -> bool {
        // Evaluate both comparisons so timing does not reveal which one failed.
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_accepts_only_configured_pair() {
        let creds = DemoCredentials::new("demo", "demo-password");
        assert!(creds.authenticate("demo", "demo-password").await);
        assert!(!creds.authenticate("demo", "wrong").await);
        assert!(!creds.authenticate("other", "demo-password").await);
        assert!(!creds.authenticate("", "").await);
        assert!(!creds.authenticate("DEMO", "demo-password").await);
    }

    #[tokio::test]
    async fn test_verifier_is_object_safe() {
        let verifier: Box<dyn CredentialVerifier> = Box::new(DemoCredentials::new("a", "b"));
        assert!(verifier.authenticate("a", "b").await);
    }
}
