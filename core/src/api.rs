use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(ctx) = self else {
            return false;
        };

        ctx.is_valid()
    }
}

/// ProvideCredential is the trait used by signer to load the credential from the environment.
///
/// Loading is synchronous: signing never suspends, so a provider is expected
/// to answer from memory or from the process environment.
pub trait ProvideCredential: Debug + Send + Sync + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load the credential from current context.
    ///
    /// Returns `Ok(None)` when this provider has nothing to offer so that
    /// callers can fall through to another source.
    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
