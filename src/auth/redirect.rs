use tracing::warn;

pub const LOGIN_PATH: &str = "/auth/login";

/// Sends the user back to the login entry point once their session cannot be recovered.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

impl<F> LoginRedirect for F
where
    F: Fn() + Send + Sync,
{
    fn redirect_to_login(&self) {
        self()
    }
}

/// Default redirect for headless use: records the event and leaves navigation to the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        warn!(path = LOGIN_PATH, "session ended; re-authentication required");
    }
}
