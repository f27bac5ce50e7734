use nu_ansi_term::Color::{Cyan, Green, Yellow};

/// Print a progress line on the console.
pub fn info(message: &str) {
    println!("{}", Cyan.bold().paint(message));
}

/// Print the outcome of a successful command on the console.
pub fn success(message: &str) {
    println!("{}", Green.bold().paint(message));
}

/// Print a warning and the detail which explains it on the console.
pub fn warn(message: &str, detail: &str) {
    eprintln!(
        "{} \n {} ",
        Yellow.bold().paint(message),
        Yellow.italic().paint(detail)
    );
}
