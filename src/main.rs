#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

use ns3_setup::cli;
use ns3_setup::error::SetupError;
use ns3_setup::init_locale;

fn main() {
    init_locale();

    let code = match cli::run() {
        Ok(code) => code,
        Err(e) => {
            let (message, code) = e
                .downcast_ref::<SetupError>()
                .map(|err| (err.display_localized(), err.exit_code()))
                .unwrap_or_else(|| (format!("{e:#}"), 1));
            eprintln!("{}", t!("messages.error", error = message));
            code
        }
    };
    std::process::exit(code);
}
