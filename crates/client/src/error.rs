use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("failed to connect to {url} on `{stage}`: {source}"))]
    Connect {
        stage: &'static str,
        url: String,
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[snafu(display("failed to read terminal input on `{stage}`: {source}"))]
    ReadInput {
        stage: &'static str,
        source: std::io::Error,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;
