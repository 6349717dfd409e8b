use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::error::Result;
use crate::types::Generation;

/// Polls a generation job until it reaches a terminal status.
///
/// `fetch` is called once per attempt and should return the current state of
/// the job. Between attempts the task sleeps for exactly `interval`. There is
/// no attempt limit; wrap the call in [`tokio::time::timeout`] to bound it.
/// The first failed fetch ends polling with that error.
pub async fn poll_until_terminal<T, F, Fut>(
    id: &str,
    interval: Duration,
    mut fetch: F,
) -> Result<Generation<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Generation<T>>>,
{
    loop {
        let generation = fetch().await?;
        debug!(id, status = ?generation.status, "generation status");
        if generation.status.is_terminal() {
            return Ok(generation);
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XenoError;
    use crate::types::{JobStatus, VideoData};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn generation(status: JobStatus) -> Generation<VideoData> {
        Generation {
            id: "gen_1".to_string(),
            status,
            created: None,
            data: None,
            model: "veo-3.1".to_string(),
            error: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed() {
        let interval = Duration::from_millis(2000);
        let statuses = Arc::new(Mutex::new(VecDeque::from(vec![
            JobStatus::Pending,
            JobStatus::Pending,
            JobStatus::Completed,
        ])));
        let fetch_times = Arc::new(Mutex::new(Vec::new()));

        let start = Instant::now();
        let result = poll_until_terminal("gen_1", interval, || {
            let statuses = statuses.clone();
            let fetch_times = fetch_times.clone();
            async move {
                fetch_times.lock().unwrap().push(Instant::now());
                let status = statuses.lock().unwrap().pop_front().unwrap();
                Ok(generation(status))
            }
        })
        .await
        .unwrap();

        assert_eq!(result.status, JobStatus::Completed);
        let fetch_times = fetch_times.lock().unwrap();
        assert_eq!(fetch_times.len(), 3);
        assert_eq!(fetch_times[0] - start, Duration::ZERO);
        for pair in fetch_times.windows(2) {
            let waited = pair[1] - pair[0];
            assert!(waited >= interval, "waited {:?}", waited);
            assert!(waited < interval + Duration::from_millis(5), "waited {:?}", waited);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_is_terminal() {
        let mut calls = 0;
        let result = poll_until_terminal("gen_1", Duration::from_secs(1), || {
            calls += 1;
            let status = if calls < 2 {
                JobStatus::Processing
            } else {
                JobStatus::Failed
            };
            async move { Ok(generation(status)) }
        })
        .await
        .unwrap();

        assert_eq!(result.status, JobStatus::Failed);
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_keeps_polling() {
        let mut calls = 0;
        let result = poll_until_terminal("gen_1", Duration::from_secs(1), || {
            calls += 1;
            let status = if calls < 3 {
                JobStatus::Unknown
            } else {
                JobStatus::Completed
            };
            async move { Ok(generation(status)) }
        })
        .await
        .unwrap();

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_stops_polling() {
        let mut calls = 0;
        let result: Result<Generation<VideoData>> =
            poll_until_terminal("gen_1", Duration::from_secs(1), || {
                calls += 1;
                let outcome = if calls == 1 {
                    Ok(generation(JobStatus::Pending))
                } else {
                    Err(XenoError::Timeout(Duration::from_secs(60)))
                };
                async move { outcome }
            })
            .await;

        assert!(matches!(result, Err(XenoError::Timeout(_))));
        assert_eq!(calls, 2);
    }
}
