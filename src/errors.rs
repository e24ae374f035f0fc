use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream returned {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("dishes upsert failed: {0}")]
    Dishes(#[source] rusqlite::Error),
    // earlier chunks stay committed
    #[error("offers upsert failed after {committed} rows: {source}")]
    Offers {
        committed: usize,
        #[source]
        source: rusqlite::Error,
    },
    #[error("rating insert failed: {0}")]
    Rating(#[source] rusqlite::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("upstream sent malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("could not determine {0} from upstream URL")]
    UnknownMeta(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("dish_id, meal, offer_date, and numeric rating are required")]
    MissingFields,
    #[error("rating must be a whole number between 1 and 5")]
    RatingOutOfRange,
    #[error("unknown hall: {0}")]
    UnknownHall(String),
    #[error("unknown meal: {0}")]
    UnknownMeal(String),
    #[error("date must be YYYY-MM-DD, got {0}")]
    InvalidDate(String),
}
