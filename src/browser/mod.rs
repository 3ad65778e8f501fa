pub mod chromium;
pub mod mock_page;

mod page;
pub use chromium::ChromiumDriver;
pub use mock_page::{MockDriver, MockPage};
pub use page::{Driver, Page, Session, WaitFor};
