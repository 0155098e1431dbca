//! Deadlines for store and provider round trips.

use std::future::Future;
use std::time::Duration;

use platform::task::bounded;

use crate::error::AuthResult;

/// Await a dependency call, turning a missed deadline into `ServiceUnavailable`.
pub(crate) async fn within<F, T>(limit: Duration, fut: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    bounded(limit, fut).await?
}
