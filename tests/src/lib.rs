#![cfg(test)]

mod sensing;
#[cfg(unix)]
mod utils;
