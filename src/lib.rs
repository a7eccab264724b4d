#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

pub mod arg_utils;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod path_utils;
pub mod runner;
pub mod steps;

use config::ENV_LANG;

pub fn init_locale() {
    let requested = std::env::var(ENV_LANG)
        .ok()
        .or_else(|| std::env::var("LANG").ok());
    rust_i18n::set_locale(locale_for(requested.as_deref()));
}

fn locale_for(requested: Option<&str>) -> &'static str {
    match requested {
        Some(lang) if lang.to_ascii_lowercase().starts_with("zh") => "zh-CN",
        _ => "en",
    }
}
