pub mod extractor;
pub mod fetcher;

pub use extractor::ReadabilityExtractor;
pub use fetcher::{HttpFetcher, USER_AGENT};

pub mod prelude {
    pub use super::extractor::ReadabilityExtractor;
    pub use super::fetcher::HttpFetcher;
    pub use tf_core::{ArticleExtractor, Error, PageFetcher, Result};
}
