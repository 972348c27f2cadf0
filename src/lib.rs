pub mod browser;
pub mod config;
pub mod domain;
pub mod output;
pub mod scraper;

#[cfg(test)]
mod tests;
