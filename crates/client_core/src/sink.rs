use tracing::error;

use crate::error::GatewayError;

/// Receives every failed gateway call together with a short static operation label.
pub trait ErrorSink: Send + Sync {
    fn report(&self, operation: &'static str, error: &GatewayError);
}

pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, operation: &'static str, err: &GatewayError) {
        error!(operation, error = %err, status = ?err.status(), "gateway call failed");
    }
}
