use std::sync::Arc;

/// Role carried by [`Viewer::system`].
pub const SYSTEM_USER_ROLE: &str = "__system_user__";

#[derive(Debug, Default)]
struct ViewerData {
    is_logged_in: bool,
    id: Option<String>,
    roles: Vec<String>,
    tokens: Vec<String>,
    pseudonym: Option<String>,
}

/// The identity (a user, script or job) an operation runs on behalf of.
///
/// Immutable once built; clones share the same data.
#[derive(Debug, Clone)]
pub struct Viewer {
    inner: Arc<ViewerData>,
}

impl Viewer {
    /// A viewer that has authenticated and carries the given id and roles.
    pub fn logged_in<I, S>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().logged_in(true).id(id).roles(roles).build()
    }

    /// Logged out, no id, no roles.
    pub fn anonymous() -> Self {
        Self::builder().build()
    }

    /// A non-human identity: logged in, no id, holds [`SYSTEM_USER_ROLE`].
    pub fn system() -> Self {
        Self::builder()
            .logged_in(true)
            .roles([SYSTEM_USER_ROLE])
            .build()
    }

    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.is_logged_in
    }

    pub fn id(&self) -> Option<&str> {
        self.inner.id.as_deref()
    }

    pub fn roles(&self) -> &[String] {
        &self.inner.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.inner.roles.iter().any(|r| r == role)
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.inner.tokens.iter().any(|t| t == token)
    }

    pub fn has_any_of_tokens(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|token| self.has_token(token))
    }

    pub fn pseudonym(&self) -> Option<&str> {
        self.inner.pseudonym.as_deref()
    }

    pub fn has_pseudonym(&self) -> bool {
        self.inner
            .pseudonym
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }

    pub fn is_system(&self) -> bool {
        self.has_role(SYSTEM_USER_ROLE)
    }
}

#[derive(Debug, Default)]
pub struct ViewerBuilder {
    data: ViewerData,
}

impl ViewerBuilder {
    pub fn logged_in(mut self, is_logged_in: bool) -> Self {
        self.data.is_logged_in = is_logged_in;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.data.id = Some(id.into());
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn pseudonym(mut self, pseudonym: impl Into<String>) -> Self {
        self.data.pseudonym = Some(pseudonym.into());
        self
    }

    pub fn build(self) -> Viewer {
        Viewer {
            inner: Arc::new(self.data),
        }
    }
}
