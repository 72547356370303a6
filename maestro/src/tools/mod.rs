//! Built-in tools.

mod visit_webpage;
mod web_search;

pub use visit_webpage::{VisitWebpage, VisitWebpageArgs};
pub use web_search::{SearchHit, WebSearch, WebSearchArgs};
