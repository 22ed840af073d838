// Pagination: the height oracle and its scratch container, run supersession, the greedy
// paginator, and the preview sessions that drive it.

pub mod handlers;
pub mod oracle;
pub mod paginator;
pub mod run;
pub mod session;

