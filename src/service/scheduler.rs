//! Periodic scrapes
//!
//! Each configured schedule submits its request to the scrape queue.

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use super::queue::ScrapeQueue;
use crate::config::ScheduledScrape;

/// Start the scheduler, or return `None` when nothing is scheduled
pub async fn start_scheduler(
    queue: ScrapeQueue,
    schedules: &[ScheduledScrape],
) -> anyhow::Result<Option<JobScheduler>> {
    if schedules.is_empty() {
        return Ok(None);
    }

    let scheduler = JobScheduler::new().await?;

    for schedule in schedules {
        let queue = queue.clone();
        let request = schedule.request.clone();
        let job = Job::new_async(schedule.cron.as_str(), move |_uuid, _l| {
            let queue = queue.clone();
            let request = request.clone();
            Box::pin(async move {
                info!("Running scheduled scrape for {} {}", request.language, request.video_type);
                queue.submit(request);
            })
        })?;
        scheduler.add(job).await?;
        info!("Scheduled scrape '{}'", schedule.cron);
    }

    scheduler.start().await?;
    Ok(Some(scheduler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ScrapeRequest, ScrapeSummary, Scraper};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopScraper;

    #[async_trait]
    impl Scraper for NoopScraper {
        async fn run(&self, _request: ScrapeRequest) -> anyhow::Result<ScrapeSummary> {
            Ok(ScrapeSummary::default())
        }
    }

    #[tokio::test]
    async fn test_no_schedules() {
        let queue = ScrapeQueue::spawn(Arc::new(NoopScraper), 1, 1);
        assert!(start_scheduler(queue, &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_cron_is_rejected() {
        let queue = ScrapeQueue::spawn(Arc::new(NoopScraper), 1, 1);
        let schedules = vec![ScheduledScrape {
            cron: "not a cron line".to_string(),
            request: ScrapeRequest::default(),
        }];
        assert!(start_scheduler(queue, &schedules).await.is_err());
    }
}
