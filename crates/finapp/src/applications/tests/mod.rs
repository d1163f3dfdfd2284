mod common;
mod detail;
mod routing;
mod submission;
