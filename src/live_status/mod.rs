pub mod endpoints;
pub mod livestream_alert;
pub mod reconciler;

pub use endpoints::{BackbeatStatusEndpoint, LivestreamObservation, StatusEndpoint, TikTokLiveEndpoint};
pub use livestream_alert::{AlertMarkerFile, LivestreamAlert};
pub use reconciler::LiveStatusReconciler;
