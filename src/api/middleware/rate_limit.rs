//! Per-IP rate limiting using a token bucket.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

type IpGovernorLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for public reads.
///
/// # Limits
///
/// - **Rate**: 5 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. The key is
/// the socket peer address, so the server must be started with connect info.
pub fn layer() -> IpGovernorLayer {
    build(5, 100)
}

/// Stricter limiter for authenticated writes.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
pub fn secure_layer() -> IpGovernorLayer {
    build(1, 10)
}

fn build(per_second: u64, burst_size: u32) -> IpGovernorLayer {
    let mut builder = GovernorConfigBuilder::default();
    builder.per_second(per_second).burst_size(burst_size);

    let config = builder
        .finish()
        .expect("rate limit period and burst are non-zero");

    GovernorLayer::new(Arc::new(config))
}
