use crate::error::Error;
use crate::result::{AsyncResult, LazyResult};
use crate::runtime::executor::Executor;
use crate::runtime::task::resume_on;

use std::sync::Arc;

/// Waits until every result in `results` has completed.
///
/// The returned lazy result yields the same results, in order, each still
/// holding its outcome. Once the last one completes, the awaiting
/// computation continues on `executor`. An empty collection completes
/// immediately without rescheduling.
///
/// Fails synchronously with [`Error::InvalidArgument`] if any result is
/// empty.
///
/// # Examples
///
/// ```rust,ignore
/// let all = when_all(pool.clone(), vec![pool.submit(|| 1)?, pool.submit(|| 2)?])?;
/// let results = all.get()?;
/// ```
pub fn when_all<T>(
    executor: Arc<dyn Executor>,
    results: Vec<AsyncResult<T>>,
) -> Result<LazyResult<Vec<AsyncResult<T>>>, Error>
where
    T: Send + 'static,
{
    if results.iter().any(AsyncResult::is_empty) {
        return Err(Error::invalid_argument(
            "when_all",
            "one of the results is empty",
        ));
    }

    if results.is_empty() {
        return Ok(LazyResult::new(async { Ok(Vec::new()) }));
    }

    Ok(LazyResult::new(async move {
        let mut results = results;

        for result in results.iter_mut() {
            result.resolve().await?;
        }

        resume_on(&*executor).await?;
        Ok(results)
    }))
}
