pub mod clock;
pub mod live_status;
pub mod presenter;

pub use clock::ClockUpdater;
pub use live_status::LiveIntent;
pub use presenter::{LiveChannelPresenter, LivePresenter};
