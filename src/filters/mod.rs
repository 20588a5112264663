//! Page-level filter values: the cascading selection and the date range,
//! as read from the dashboard URL and written back on submit.

mod navigation;
mod query;
mod selection;

pub use navigation::submit_url;
pub use query::{DateFilter, PageQuery};
pub use selection::Selection;
