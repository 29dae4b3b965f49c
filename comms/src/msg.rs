use std::fmt::{self, Display};

use crate::{
    Deserialize, Serialize,
    error::{ParseErr, Result},
};

pub type JobId = u16;
pub type PartId = u16;
pub type RoundId = u32;

const GACK: &str = "GACK";
const AACK: &str = "AACK";
const RESULT: &str = "RESULT";
const DELIM: char = ',';

/// The application layer message of the aggregation protocol.
///
/// Every message travels as a flat list of ascii fields separated by commas. Control
/// messages carry a literal marker in their first field, contributions carry none and
/// are recognised by position alone: `job,part,round`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Msg {
    /// `<job>,<part>,<round>`, sent by a worker to its relay.
    Contribution {
        job: JobId,
        part: PartId,
        round: RoundId,
    },
    /// `GACK,<round>`, sent by the relay back to the contributing worker.
    RoundAck { round: RoundId },
    /// `AACK,<part>,<round>`, broadcast by the coordinator.
    ///
    /// `part` is whatever the coordinator found in the second field of the record it
    /// accepted, for a combined result that is the job id.
    CompletionAck { part: PartId, round: RoundId },
    /// `RESULT,<job>,<round>`, sent by the relay once every part of a round arrived.
    CombinedResult { job: JobId, round: RoundId },
}

impl Msg {
    /// A short name of the message variant, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Contribution { .. } => "contribution",
            Msg::RoundAck { .. } => "round_ack",
            Msg::CompletionAck { .. } => "completion_ack",
            Msg::CombinedResult { .. } => "combined_result",
        }
    }

    /// Encodes this message into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize(&mut buf);
        buf
    }

    fn parse_id<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T> {
        // `FromStr` for integers accepts a leading '+', the wire format doesn't.
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseErr::InvalidId {
                field,
                value: value.to_string(),
            });
        }

        value.parse().map_err(|_| ParseErr::InvalidId {
            field,
            value: value.to_string(),
        })
    }

    fn expect_fields(kind: &'static str, fields: &[&str], expected: usize) -> Result<()> {
        if fields.len() != expected {
            return Err(ParseErr::FieldCount {
                kind,
                expected,
                got: fields.len(),
            });
        }

        Ok(())
    }
}

impl Display for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Msg::Contribution { job, part, round } => write!(f, "{job},{part},{round}"),
            Msg::RoundAck { round } => write!(f, "{GACK},{round}"),
            Msg::CompletionAck { part, round } => write!(f, "{AACK},{part},{round}"),
            Msg::CombinedResult { job, round } => write!(f, "{RESULT},{job},{round}"),
        }
    }
}

impl Serialize for Msg {
    fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.to_string().as_bytes());
    }
}

impl Deserialize for Msg {
    fn deserialize(buf: &[u8]) -> Result<Self> {
        if !buf.is_ascii() {
            return Err(ParseErr::NotAscii);
        }

        let text = str::from_utf8(buf).map_err(|_| ParseErr::NotAscii)?;

        // Peers written against C strings ship the terminating NUL too.
        let text = text.trim_end_matches(|c: char| c == '\0' || c.is_ascii_whitespace());
        if text.is_empty() {
            return Err(ParseErr::Empty);
        }

        let fields: Vec<&str> = text.split(DELIM).collect();

        match fields[0] {
            GACK => {
                Self::expect_fields("round_ack", &fields, 2)?;
                Ok(Msg::RoundAck {
                    round: Self::parse_id("round", fields[1])?,
                })
            }
            AACK => {
                Self::expect_fields("completion_ack", &fields, 3)?;
                Ok(Msg::CompletionAck {
                    part: Self::parse_id("part", fields[1])?,
                    round: Self::parse_id("round", fields[2])?,
                })
            }
            RESULT => {
                Self::expect_fields("combined_result", &fields, 3)?;
                Ok(Msg::CombinedResult {
                    job: Self::parse_id("job", fields[1])?,
                    round: Self::parse_id("round", fields[2])?,
                })
            }
            _ => {
                Self::expect_fields("contribution", &fields, 3)?;
                Ok(Msg::Contribution {
                    job: Self::parse_id("job", fields[0])?,
                    part: Self::parse_id("part", fields[1])?,
                    round: Self::parse_id("round", fields[2])?,
                })
            }
        }
    }
}
