pub mod geo;
pub mod routing;
pub mod animation;
pub mod viewport;
pub mod dispatch;
#[cfg(feature = "rest-directory")]
pub mod directory;
pub mod tracker;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
