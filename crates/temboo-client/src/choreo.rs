use std::net::SocketAddr;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

use temboo::RequestBody;
use temboo::inputs::InputSet;
use temboo::outputs::OutputSet;
use temboo::preset::Preset;

use tracing::{debug, info, warn};

use crate::clock::{Clock, Uptime};
use crate::config::ChoreoConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::response::StatusPrefix;
use crate::session::{Request, Session};
use crate::transport::{Endpoint, Transport};

// A second attempt is only made after a clock correction.
const MAX_ATTEMPTS: usize = 2;

const STATUS_LINE: &[u8] = b"HTTP/1.1 ";
const TIME_HEADER: &[u8] = b"x-temboo-time:";
const HEADERS_END: &[u8] = b"\r\n\r\n";

const UNAUTHORIZED: u32 = 401;

/// A choreo runner.
///
/// A [`Choreo`] collects the account credentials, the choreo path and its
/// data, then runs the choreo over a [`Transport`]. Once a run completes,
/// the [`Choreo`] is the reader of the response: the stream starts with a
/// `HTTP_CODE` record carrying the HTTP status, followed by the response
/// body for successful runs, or the rest of the response otherwise. A
/// rejected run whose headers carry no server time continues at the body.
pub struct Choreo<'c, T, U, D> {
    transport: T,
    clock: &'c Clock<U>,
    delay: D,
    config: ChoreoConfig,
    account_name: String,
    app_key_name: String,
    app_key: String,
    path: String,
    inputs: InputSet,
    outputs: OutputSet,
    preset: Preset,
    http_code: u16,
    prefix: StatusPrefix,
}

impl<'c, T, U, D> Choreo<'c, T, U, D>
where
    T: Transport,
    U: Uptime,
    D: DelayNs,
{
    /// Creates a [`Choreo`] with the default [`ChoreoConfig`].
    #[must_use]
    #[inline]
    pub fn new(transport: T, clock: &'c Clock<U>, delay: D) -> Self {
        Self::with_config(transport, clock, delay, ChoreoConfig::new())
    }

    /// Creates a [`Choreo`] with the given [`ChoreoConfig`].
    #[must_use]
    pub fn with_config(transport: T, clock: &'c Clock<U>, delay: D, config: ChoreoConfig) -> Self {
        Self {
            transport,
            clock,
            delay,
            config,
            account_name: String::new(),
            app_key_name: String::new(),
            app_key: String::new(),
            path: String::new(),
            inputs: InputSet::new(),
            outputs: OutputSet::new(),
            preset: Preset::new(),
            http_code: 0,
            prefix: StatusPrefix::consumed(),
        }
    }

    /// Sets the Temboo account name.
    pub fn set_account_name(&mut self, account_name: impl Into<String>) {
        self.account_name = account_name.into();
    }

    /// Sets the application key name.
    pub fn set_app_key_name(&mut self, app_key_name: impl Into<String>) {
        self.app_key_name = app_key_name.into();
    }

    /// Sets the application key value.
    pub fn set_app_key(&mut self, app_key: impl Into<String>) {
        self.app_key = app_key.into();
    }

    /// Sets the choreo path, for example
    /// `/Library/Yahoo/Weather/GetWeatherByAddress`.
    pub fn set_choreo(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Sets the preset.
    pub fn set_preset(&mut self, name: impl Into<String>) {
        self.preset.set(name);
    }

    /// Sets the stored credential to run the choreo with.
    ///
    /// Same as [`Choreo::set_preset`].
    pub fn set_credential(&mut self, name: impl Into<String>) {
        self.set_preset(name);
    }

    /// Sets the saved inputs to run the choreo with.
    ///
    /// Same as [`Choreo::set_preset`].
    pub fn set_saved_inputs(&mut self, name: impl Into<String>) {
        self.set_preset(name);
    }

    /// Sets the profile to run the choreo with.
    ///
    /// Same as [`Choreo::set_preset`].
    pub fn set_profile(&mut self, name: impl Into<String>) {
        self.set_preset(name);
    }

    /// Adds a choreo input, replacing the value of an existing input with
    /// the same name.
    pub fn add_input(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inputs.add(name, value);
    }

    /// Adds an output filter, replacing an existing filter with the same
    /// name.
    pub fn add_output_filter(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        variable: impl Into<String>,
    ) {
        self.outputs.add(name, path, variable);
    }

    /// Returns the choreo inputs.
    #[must_use]
    #[inline]
    pub const fn inputs(&self) -> &InputSet {
        &self.inputs
    }

    /// Returns the output filters.
    #[must_use]
    #[inline]
    pub const fn outputs(&self) -> &OutputSet {
        &self.outputs
    }

    /// Returns the HTTP status of the last run.
    ///
    /// It is `0` when no status has been received.
    #[must_use]
    #[inline]
    pub const fn http_code(&self) -> u16 {
        self.http_code
    }

    /// Runs the choreo.
    ///
    /// The request is sent to the account host, or to the server set in the
    /// [`ChoreoConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error when a mandatory setting is missing, in which case
    /// nothing is sent, or an [`ErrorKind::Http`] error when the exchange
    /// fails or the status is not successful.
    pub fn run(&mut self) -> Result<()> {
        self.check()?;
        let endpoint = self.config.server.map_or_else(
            || Endpoint::Host(self.config.host(&self.account_name), self.config.port),
            Endpoint::Address,
        );
        self.execute(&endpoint)
    }

    /// Runs the choreo against the given server.
    ///
    /// # Errors
    ///
    /// Same as [`Choreo::run`].
    pub fn run_with_server(&mut self, server: SocketAddr) -> Result<()> {
        self.check()?;
        self.execute(&Endpoint::Address(server))
    }

    /// Returns the number of response bytes which can be read without
    /// waiting.
    pub fn available(&mut self) -> usize {
        self.prefix.remaining() + self.transport.available()
    }

    /// Reads a response byte.
    pub fn read(&mut self) -> Option<u8> {
        self.prefix.read().or_else(|| self.transport.read())
    }

    /// Returns the next response byte without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        self.prefix.peek().or_else(|| self.transport.peek())
    }

    /// Closes the connection.
    pub fn close(&mut self) {
        self.prefix = StatusPrefix::consumed();
        self.transport.stop();
    }

    fn check(&self) -> Result<()> {
        let settings = [
            (&self.account_name, ErrorKind::AccountMissing, "account name"),
            (&self.path, ErrorKind::ChoreoMissing, "choreo path"),
            (&self.app_key_name, ErrorKind::AppKeyNameMissing, "app key name"),
            (&self.app_key, ErrorKind::AppKeyMissing, "app key"),
        ];

        match settings.iter().find(|(value, _, _)| value.is_empty()) {
            Some((_, kind, name)) => Err(Error::new(*kind, format!("No {name} has been set"))),
            None => Ok(()),
        }
    }

    fn execute(&mut self, endpoint: &Endpoint) -> Result<()> {
        self.http_code = 0;
        self.prefix = StatusPrefix::consumed();

        let request = Request {
            account: &self.account_name,
            app_key_name: &self.app_key_name,
            app_key: &self.app_key,
            choreo: &self.path,
            body: RequestBody::new(&self.inputs, &self.outputs, &self.preset),
        };

        let mut code = 0;
        for attempt in 0..MAX_ATTEMPTS {
            info!("Running choreo `{}`, attempt {}", self.path, attempt + 1);
            Session::new(&mut self.transport, self.clock).execute(endpoint, &request)?;

            wait_response(&mut self.transport, &mut self.delay, &self.config)?;
            if !self.transport.find(STATUS_LINE) {
                self.transport.stop();
                return Err(Error::new(ErrorKind::Http, "No HTTP status line received"));
            }
            code = self.transport.parse_int().filter(|code| *code < 600).unwrap_or(0);
            debug!("Received HTTP status {code}");

            if code == UNAUTHORIZED
                && attempt == 0
                && self.transport.find_until(TIME_HEADER, HEADERS_END)
                && let Some(time) = self.transport.parse_int()
            {
                warn!("Request rejected, retrying with server time {time}");
                self.clock.set_time(time);
                while self.transport.read().is_some() {}
                self.transport.stop();
                continue;
            }
            break;
        }

        // Always below 600.
        self.http_code = code as u16;
        self.prefix = StatusPrefix::armed(self.http_code);

        if !(200..300).contains(&code) {
            return Err(Error::new(
                ErrorKind::Http,
                format!("Choreo `{}` failed with HTTP status {code}", self.path),
            ));
        }
        if !self.transport.find(HEADERS_END) {
            return Err(Error::new(ErrorKind::Http, "Response headers are incomplete"));
        }

        info!("Choreo `{}` completed", self.path);
        Ok(())
    }
}

// Waits for the first response byte.
fn wait_response<T, D>(transport: &mut T, delay: &mut D, config: &ChoreoConfig) -> Result<()>
where
    T: Transport,
    D: DelayNs,
{
    let interval = config.poll_interval.max(Duration::from_millis(1));
    let interval_ms = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);

    let mut waited = Duration::ZERO;
    while transport.available() == 0 {
        if !transport.connected() {
            transport.stop();
            return Err(Error::new(
                ErrorKind::Http,
                "Connection closed before a response was received",
            ));
        }
        if let Some(timeout) = config.response_timeout
            && waited >= timeout
        {
            transport.stop();
            return Err(Error::new(
                ErrorKind::Http,
                format!("No response received within {timeout:?}"),
            ));
        }
        delay.delay_ms(interval_ms);
        waited += interval;
    }
    Ok(())
}

/// Reads the response stream.
///
/// When no byte arrives in time while the connection is still open, the
/// read fails with [`std::io::ErrorKind::TimedOut`] and can be retried.
/// `Ok(0)` is only returned once the response is over.
impl<T, U, D> std::io::Read for Choreo<'_, T, U, D>
where
    T: Transport,
    U: Uptime,
    D: DelayNs,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        let Some(byte) = Choreo::read(self) else {
            if self.transport.connected() {
                return Err(std::io::ErrorKind::TimedOut.into());
            }
            return Ok(0);
        };
        *first = byte;

        let mut filled = 1;
        for slot in rest {
            if self.available() == 0 {
                break;
            }
            let Some(byte) = Choreo::read(self) else {
                break;
            };
            *slot = byte;
            filled += 1;
        }
        Ok(filled)
    }
}
