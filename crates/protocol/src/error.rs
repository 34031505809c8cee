use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProtocolError {
    #[snafu(display("failed to decode inbound payload on `{stage}`: {source}"))]
    DecodeInbound {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to encode outbound request on `{stage}`: {source}"))]
    EncodeRequest {
        stage: &'static str,
        source: serde_json::Error,
    },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
