// CourseSync - Smart Deadline & Workload Balancer
// Library exports

// Domain
pub mod extract;
pub mod model;

// Model access
pub mod agent;
pub mod providers;
pub mod scrape;

// Documents in and out
pub mod calendar;
pub mod pdf;

// Bookkeeping and delivery
pub mod notify;
pub mod state;

// Front ends
pub mod cli;
pub mod server;

// Support
pub mod config;
pub mod errors;
