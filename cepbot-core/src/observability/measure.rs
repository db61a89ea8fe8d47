use std::{fmt::Display, future::Future};

use serde_json::Value;

use super::{Context, timer::TimerRegistry};

/// Time `operation` under `name`.
///
/// The result is handed back untouched. Failures are only observed: the end
/// record gets `error: true` and the error's message, and that same error
/// value is returned to the caller.
pub async fn measure<T, E, Fut>(
    timers: &TimerRegistry,
    name: &str,
    extra: Context,
    operation: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let token = timers.start(name);

    match operation.await {
        Ok(value) => {
            timers.finish(&token, &extra);
            Ok(value)
        }
        Err(err) => {
            let mut failed = extra;
            failed.insert("error".to_owned(), Value::Bool(true));
            failed.insert("errorMessage".to_owned(), Value::String(err.to_string()));
            timers.finish(&token, &failed);
            Err(err)
        }
    }
}
