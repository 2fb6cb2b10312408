use aws_smithy_types::error::display::DisplayErrorContext;
use cairn_rs_protocol::{RemoteError, RemoteService};

/// Map an SDK or builder error to a remote error, keeping the full source chain.
pub(crate) fn remote<E>(service: RemoteService, err: E) -> RemoteError
where
    E: std::error::Error,
{
    RemoteError::new(service, DisplayErrorContext(&err).to_string())
}
