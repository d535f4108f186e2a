use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;

const DOMAIN_SUFFIX: &str = ".temboolive.com";
const PORT: u16 = 80;

/// Settings of a choreo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoreoConfig {
    pub(crate) domain_suffix: Cow<'static, str>,
    pub(crate) port: u16,
    pub(crate) poll_interval: Duration,
    pub(crate) response_timeout: Option<Duration>,
    pub(crate) server: Option<SocketAddr>,
}

impl Default for ChoreoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoreoConfig {
    /// Creates a [`ChoreoConfig`] targeting the Temboo live servers.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            domain_suffix: Cow::Borrowed(DOMAIN_SUFFIX),
            port: PORT,
            poll_interval: Duration::from_millis(10),
            response_timeout: Some(Duration::from_secs(30)),
            server: None,
        }
    }

    /// Sets the suffix appended to the account name to obtain the server
    /// host name.
    #[must_use]
    #[inline]
    pub fn domain_suffix(mut self, domain_suffix: impl Into<Cow<'static, str>>) -> Self {
        self.domain_suffix = domain_suffix.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the delay between two checks for response data.
    #[must_use]
    pub const fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the maximum time to wait for the first response byte.
    #[must_use]
    pub const fn response_timeout(mut self, response_timeout: Duration) -> Self {
        self.response_timeout = Some(response_timeout);
        self
    }

    /// Waits for the response as long as the connection stays open.
    #[must_use]
    pub const fn no_response_timeout(mut self) -> Self {
        self.response_timeout = None;
        self
    }

    /// Sends every request to the given address instead of the account
    /// host.
    #[must_use]
    #[inline]
    pub fn server(mut self, server: impl Into<SocketAddr>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub(crate) fn host(&self, account: &str) -> String {
        format!("{account}{}", self.domain_suffix)
    }
}
