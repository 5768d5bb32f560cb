// Dashboard: the interactive page, the analysis handler behind it, and the
// typed sections the page renders.

pub mod handlers;
pub mod pipeline;
pub mod sections;
