//! Fault isolation for async work.
//!
//! A panic inside an isolated future is caught at the boundary and turned
//! into a [`Fault`], so one broken request cannot take down the task that
//! serves it. Values the future owned are dropped during unwinding, which
//! runs their `Drop` impls (open spans end there).

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected fault: {message}")]
pub struct Fault {
    pub message: String,
}

impl Fault {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        Self { message }
    }
}

/// Await `future`, converting a panic into `Err(Fault)`.
pub async fn isolate<F>(future: F) -> Result<F::Output, Fault>
where
    F: Future,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(Fault::from_panic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_value_through() {
        assert_eq!(isolate(async { 5 }).await, Ok(5));
    }

    #[tokio::test]
    async fn test_catches_panics() {
        let fault = isolate(async {
            panic!("store exploded");
        })
        .await
        .unwrap_err();
        assert_eq!(fault.message, "store exploded");

        let id = 7;
        let fault = isolate(async move {
            if id == 7 {
                panic!("bad id {id}");
            }
        })
        .await
        .unwrap_err();
        assert_eq!(fault.message, "bad id 7");
    }
}
