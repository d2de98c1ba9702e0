// Fbxmon - Freebox telemetry exporter for Graphite and InfluxDB
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use hyper::StatusCode;
use std::error::Error;
use std::fmt::{self, Formatter};

/// Potential kinds of errors that can be encountered talking to the Freebox API
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy)]
pub enum ErrorKind {
    Credentials,
    Registration,
    Authentication,
    Request,
    Response,
}

/// Error registering with, authenticating to, or reading from the Freebox API
#[derive(Debug)]
pub enum FreeboxError {
    /// Non-200 HTTP status along with the path requested and the response body
    Status(ErrorKind, StatusCode, String, String),
    /// The API answered with `success: false` and an error code and message
    Api(ErrorKind, String, String),
    KindMsg(ErrorKind, &'static str),
    KindMsgCause(ErrorKind, &'static str, Box<dyn Error + Send + Sync>),
}

impl FreeboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FreeboxError::Status(kind, _, _, _) => *kind,
            FreeboxError::Api(kind, _, _) => *kind,
            FreeboxError::KindMsg(kind, _) => *kind,
            FreeboxError::KindMsgCause(kind, _, _) => *kind,
        }
    }

    /// Wrap this error as the cause of a new error of a different kind.
    pub(crate) fn rekind(self, kind: ErrorKind, msg: &'static str) -> Self {
        FreeboxError::KindMsgCause(kind, msg, Box::new(self))
    }
}

impl fmt::Display for FreeboxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FreeboxError::Status(_, status, path, body) => {
                write!(f, "unexpected status {} for {}: {}", status, path, body)
            }
            FreeboxError::Api(_, code, msg) => write!(f, "api error {}: {}", code, msg),
            FreeboxError::KindMsg(_, msg) => f.write_str(msg),
            FreeboxError::KindMsgCause(_, msg, ref e) => write!(f, "{}: {}", msg, e),
        }
    }
}

impl Error for FreeboxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FreeboxError::KindMsgCause(_, _, ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ErrorKind, FreeboxError};
    use hyper::StatusCode;
    use std::error::Error;

    #[test]
    fn test_rekind_keeps_cause() {
        let inner = FreeboxError::Status(
            ErrorKind::Request,
            StatusCode::FORBIDDEN,
            "/api/v3/login/session/".to_owned(),
            "denied".to_owned(),
        );
        let outer = inner.rekind(ErrorKind::Authentication, "unable to open session");

        assert_eq!(ErrorKind::Authentication, outer.kind());
        assert!(outer.source().is_some());
        assert_eq!(
            "unable to open session: unexpected status 403 Forbidden for /api/v3/login/session/: denied",
            outer.to_string()
        );
    }
}
