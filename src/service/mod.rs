//! Business logic services

mod catalog;
mod queue;
mod scheduler;
mod scraper;

pub use catalog::CatalogService;
pub use queue::ScrapeQueue;
pub use scheduler::start_scheduler;
pub use scraper::{ScrapeRequest, ScrapeSummary, Scraper, TamilBlastersScraper};
