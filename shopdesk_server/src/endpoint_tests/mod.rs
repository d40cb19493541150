mod analytics;
mod helpers;
mod orders;
