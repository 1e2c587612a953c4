//! Minimum visible busy time.

use std::future::Future;
use std::time::Duration;

/// Run `operation` and resolve no earlier than `floor` after the call.
///
/// The timer starts with the operation and runs alongside it, so the
/// total time is `max(floor, operation)`. The floor also applies when the
/// operation fails.
///
/// # Examples
///
/// ```
/// use atelier_workflow::with_min_duration;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = with_min_duration(Duration::from_millis(5), async { 42 }).await;
/// assert_eq!(value, 42);
/// # }
/// ```
pub async fn with_min_duration<F: Future>(floor: Duration, operation: F) -> F::Output {
    let (output, ()) = tokio::join!(operation, tokio::time::sleep(floor));
    output
}
