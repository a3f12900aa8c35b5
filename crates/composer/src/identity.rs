//! Current-user lookup.

/// Supplies the identifier of the signed-in creator, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

/// Identity fixed at construction, e.g. from a CLI flag or config.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<String>,
}

impl StaticIdentity {
    pub fn new(user: Option<String>) -> Self {
        Self {
            user: user.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_is_anonymous() {
        assert_eq!(StaticIdentity::new(Some("  ".into())).current_user(), None);
        assert_eq!(
            StaticIdentity::new(Some("creator-1".into())).current_user(),
            Some("creator-1".to_string())
        );
        assert_eq!(StaticIdentity::anonymous().current_user(), None);
    }
}
