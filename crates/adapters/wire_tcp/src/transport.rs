//! One-connection-per-request TCP transport.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use icv6_app::ports::LightingController;
use icv6_domain::error::Icv6Error;
use icv6_domain::lighting::{DeviceMode, Intensity, Program};

use crate::codec::{Command, DeviceSerial, Frame, REPLY_GROUP, REQUEST_GROUP, encode_frame};
use crate::config::WireConfig;
use crate::error::{FrameError, PayloadError, WireError};
use crate::payload;
use crate::scanner::FrameScanner;

const READ_CHUNK: usize = 4096;

/// [`LightingController`] speaking the framed dialect over TCP.
///
/// Holds no connection: each operation connects, exchanges one request and
/// its reply, and drops the socket. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct TcpController {
    addr: String,
    serial: DeviceSerial,
    timeout: Duration,
}

impl TcpController {
    #[must_use]
    pub fn new(addr: impl Into<String>, serial: DeviceSerial, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            serial,
            timeout,
        }
    }

    /// Build a controller from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidDeviceId`] if the configured serial is
    /// not 11 ASCII characters.
    pub fn from_config(config: &WireConfig) -> Result<Self, FrameError> {
        let serial = DeviceSerial::new(&config.device_id)?;
        Ok(Self::new(config.addr(), serial, config.timeout()))
    }

    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send `args` for `command` and wait for the matching reply.
    ///
    /// Connect, write and read share one timeout budget.
    async fn request(&self, command: Command, args: &[u8]) -> Result<Frame, WireError> {
        let request = encode_frame(&self.serial, REQUEST_GROUP, command.id(), args)?;
        tracing::debug!(command = command.name(), addr = %self.addr, "sending request");

        let frame = tokio::time::timeout(self.timeout, self.exchange(command, &request))
            .await
            .map_err(|_| WireError::Timeout {
                command: command.name(),
                timeout: self.timeout,
            })??;

        if frame.device_id != self.serial.as_str() {
            tracing::debug!(device_id = %frame.device_id, "reply carries a different serial");
        }
        Ok(frame)
    }

    async fn exchange(&self, command: Command, request: &[u8]) -> Result<Frame, WireError> {
        let mut stream =
            TcpStream::connect(&self.addr)
                .await
                .map_err(|source| WireError::Connect {
                    addr: self.addr.clone(),
                    source,
                })?;
        stream.write_all(request).await.map_err(WireError::Write)?;
        read_expected(&mut stream, REPLY_GROUP, command.id()).await
    }
}

/// Read from `reader` until a frame with the given group and id arrives.
///
/// Keep-alives, noise, undecodable candidates and unrelated frames are
/// skipped.
///
/// # Errors
///
/// Returns [`WireError::Closed`] if the stream ends first, or
/// [`WireError::Read`] on an IO failure.
pub async fn read_expected<R>(reader: &mut R, cmd_group: u8, cmd_id: u8) -> Result<Frame, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut scanner = FrameScanner::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut chunk).await.map_err(WireError::Read)?;
        if read == 0 {
            return Err(WireError::Closed);
        }
        scanner.push(&chunk[..read]);

        while let Some(candidate) = scanner.next_frame() {
            match candidate {
                Ok(frame) if frame.cmd_group == cmd_group && frame.cmd_id == cmd_id => {
                    return Ok(frame);
                }
                Ok(frame) => tracing::debug!(
                    cmd_group = frame.cmd_group,
                    cmd_id = frame.cmd_id,
                    "ignoring unrelated frame"
                ),
                Err(err) => tracing::warn!(error = %err, "dropping undecodable frame"),
            }
        }
    }
}

fn payload_error(command: Command) -> impl FnOnce(PayloadError) -> WireError {
    move |source| WireError::Payload {
        command: command.name(),
        source,
    }
}

impl LightingController for TcpController {
    fn query_mode(&self) -> impl Future<Output = Result<DeviceMode, Icv6Error>> + Send {
        async move {
            let command = Command::QueryMode;
            let frame = self.request(command, &[]).await?;
            Ok(payload::decode_mode(&frame.args).map_err(payload_error(command))?)
        }
    }

    fn set_mode(&self, mode: DeviceMode) -> impl Future<Output = Result<(), Icv6Error>> + Send {
        async move {
            self.request(Command::SetMode, &payload::encode_mode(mode))
                .await?;
            Ok(())
        }
    }

    fn query_intensity(&self) -> impl Future<Output = Result<Intensity, Icv6Error>> + Send {
        async move {
            let command = Command::QueryIntensity;
            let frame = self.request(command, &[]).await?;
            Ok(payload::decode_intensity(&frame.args).map_err(payload_error(command))?)
        }
    }

    fn set_intensity(
        &self,
        intensity: Intensity,
    ) -> impl Future<Output = Result<(), Icv6Error>> + Send {
        async move {
            self.request(Command::SetIntensity, &payload::encode_intensity(intensity))
                .await?;
            Ok(())
        }
    }

    fn set_preview_intensity(
        &self,
        intensity: Intensity,
    ) -> impl Future<Output = Result<(), Icv6Error>> + Send {
        async move {
            self.request(
                Command::PreviewIntensity,
                &payload::encode_intensity(intensity),
            )
            .await?;
            Ok(())
        }
    }

    fn query_program(&self) -> impl Future<Output = Result<Program, Icv6Error>> + Send {
        async move {
            let command = Command::QueryProgram;
            let frame = self.request(command, &[]).await?;
            Ok(payload::decode_program(&frame.args).map_err(payload_error(command))?)
        }
    }

    fn set_program(
        &self,
        program: &Program,
    ) -> impl Future<Output = Result<u8, Icv6Error>> + Send {
        let command = Command::SetProgram;
        let args = payload::encode_program(program).map_err(payload_error(command));
        async move {
            let frame = self.request(command, &args?).await?;
            Ok(payload::decode_ack(&frame.args))
        }
    }
}
