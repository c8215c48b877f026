use std::fmt;
use std::io;

use limero_frame::FrameError;
use limero_value::ValueError;

// Exit codes follow the sysexits-style layout used across our tools.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::BrokenPipe => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn value_error(context: &str, err: ValueError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn hex_error(context: &str, err: hex::FromHexError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_errors_are_invalid_data() {
        let err = value_error("parse failed", ValueError::UnexpectedEnd { offset: 3 });
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("parse failed: "));
    }

    #[test]
    fn frame_errors_map_by_kind() {
        let checksum = frame_error(
            "frame",
            FrameError::Checksum {
                expected: 1,
                actual: 2,
            },
        );
        assert_eq!(checksum.code, DATA_INVALID);

        let closed = frame_error("frame", FrameError::ConnectionClosed);
        assert_eq!(closed.code, FAILURE);

        let io = frame_error(
            "frame",
            FrameError::Io(io::Error::from(io::ErrorKind::Other)),
        );
        assert_eq!(io.code, INTERNAL);
    }

    #[test]
    fn missing_file_is_failure() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, FAILURE);
        assert_eq!(err.to_string(), format!("read: {}", io::Error::from(io::ErrorKind::NotFound)));
    }
}
