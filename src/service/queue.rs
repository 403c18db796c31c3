//! Background scrape queue
//!
//! Requests are accepted immediately and carried out by a worker task; a
//! semaphore bounds how many scrapes run at the same time.

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::scraper::{ScrapeRequest, Scraper};

/// Handle for submitting scrape requests
#[derive(Clone)]
pub struct ScrapeQueue {
    sender: mpsc::Sender<ScrapeRequest>,
}

impl ScrapeQueue {
    /// Create the queue and start its worker
    pub fn spawn(scraper: Arc<dyn Scraper>, capacity: usize, max_concurrent: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        let worker = QueueWorker {
            scraper,
            receiver,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        };
        tokio::spawn(worker.run());

        Self { sender }
    }

    /// Queue a request without waiting. Returns false if it was dropped.
    pub fn submit(&self, request: ScrapeRequest) -> bool {
        match self.sender.try_send(request) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(request)) => {
                warn!("Scrape queue is full, dropping request {:?}", request);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Scrape queue worker has stopped");
                false
            }
        }
    }
}

struct QueueWorker {
    scraper: Arc<dyn Scraper>,
    receiver: mpsc::Receiver<ScrapeRequest>,
    permits: Arc<Semaphore>,
}

impl QueueWorker {
    async fn run(mut self) {
        while let Some(request) = self.receiver.recv().await {
            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                break;
            };

            let scraper = self.scraper.clone();
            tokio::spawn(async move {
                let _permit = permit;
                execute(scraper, request).await;
            });
        }

        info!("Scrape queue stopped");
    }
}

async fn execute(scraper: Arc<dyn Scraper>, request: ScrapeRequest) {
    let job_id = Uuid::new_v4();
    info!(
        "Scrape job {} started: language={} video_type={} pages={} start_page={} home={}",
        job_id,
        request.language,
        request.video_type,
        request.pages,
        request.start_page,
        request.is_scrape_home
    );

    match scraper.run(request).await {
        Ok(summary) => info!(
            "Scrape job {} finished: {} pages, {} topics, {} movies, {} new streams, {} failed",
            job_id, summary.pages, summary.topics, summary.movies, summary.streams, summary.failed
        ),
        Err(e) => error!("Scrape job {} failed: {:#}", job_id, e),
    }
}
