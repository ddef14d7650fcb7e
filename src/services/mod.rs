pub mod chromium_locator;
pub mod delay;
pub mod existing;
pub mod failure_writer;
pub mod locator;
pub mod persister;

pub use chromium_locator::ChromiumLocator;
pub use delay::{next_delay, DelayScheduler};
pub use existing::artifact_exists;
pub use failure_writer::FailureWriter;
pub use locator::ImageLocator;
pub use persister::{ensure_dir, extension_for_mime, ImagePersister};
