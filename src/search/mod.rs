pub mod elastic;
pub mod format;
pub mod geocode;
pub mod normalize;
pub mod render;
pub mod service;
pub mod template;
pub mod traits;
pub mod types;

pub use elastic::ElasticClient;
pub use geocode::GoogleGeocoder;
pub use normalize::ParameterNormalizer;
pub use render::{render, ClauseKind, RenderOptions, RenderedQuery};
pub use service::PropertySearchService;
pub use traits::{Geocoder, SearchBackend};
pub use types::{CanonicalParameters, SearchIntent};
