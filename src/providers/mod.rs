pub mod bucket;
pub mod korea_exim;
pub mod normalize;
pub mod util;

pub use bucket::BucketSource;
pub use korea_exim::KoreaEximSource;
pub use normalize::normalize;
