pub mod dates;
pub mod fetch;
pub mod output;
pub mod providers;
pub mod report;
