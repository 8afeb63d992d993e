// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
                                 _   _
  _ __   __ _ _ __ ___ _ __ | |_| | ___ _ __  ___
 | '_ \ / _` | '__/ _ \ '_ \| __| |/ _ \ '_ \/ __|
 | |_) | (_| | | |  __/ | | | |_| |  __/ | | \__ \
 | .__/ \__,_|_|  \___|_| |_|\__|_|\___|_| |_|___/
 |_|

    Snap a photo, get a parent-friendly explanation
"#;
    println!("{}", banner);
}
